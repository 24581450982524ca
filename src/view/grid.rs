use crate::model::{Company, Severity};
use crate::store::{CompanyStore, LoadStatus};

use super::html::{escape_html, icon_html};

pub const EMPTY_MESSAGE: &str =
    "No companies yet. Add one or load sample data to get started.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridView {
    Cards(String),
    Empty(String),
    Failed(String),
}

pub fn render_grid(store: &CompanyStore) -> GridView {
    if store.is_empty() {
        return match store.status() {
            LoadStatus::Failed(message) => GridView::Failed(format!(
                r#"<p class="empty-state error">{}</p>"#,
                escape_html(message)
            )),
            _ => GridView::Empty(format!(r#"<p class="empty-state">{EMPTY_MESSAGE}</p>"#)),
        };
    }
    let cards = store
        .companies()
        .iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n");
    GridView::Cards(cards)
}

pub fn risk_dots(company: &Company) -> Vec<&Severity> {
    let mut dots: Vec<&Severity> = company.all_risks().map(|r| &r.severity).collect();
    dots.sort_by_key(|s| s.rank());
    dots
}

pub fn render_card(company: &Company) -> String {
    let dots: String = risk_dots(company)
        .into_iter()
        .map(|s| format!(r#"<span class="risk-dot {}"></span>"#, s.css_class()))
        .collect();
    format!(
        r#"<div class="company-card" data-company-id="{id}">
  <div class="company-icon">{icon}</div>
  <h3>{name}</h3>
  <span class="category">{category}</span>
  <div class="risk-indicator">{dots}</div>
</div>"#,
        id = escape_html(&company.id),
        icon = icon_html(company),
        name = escape_html(&company.name),
        category = escape_html(&company.category),
        dots = dots,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Risk;

    fn risk(severity: Severity) -> Risk {
        Risk::new("t", "d", severity)
    }

    #[test]
    fn dots_merge_all_policies_in_severity_order() {
        let company = Company {
            id: "1".to_string(),
            name: "Acme".to_string(),
            terms_risks: Some(vec![risk(Severity::Low), risk(Severity::High)]),
            cookie_risks: Some(vec![risk(Severity::Medium)]),
            privacy_risks: Some(vec![risk(Severity::High)]),
            ..Default::default()
        };
        let order: Vec<_> = risk_dots(&company).iter().map(|s| s.css_class()).collect();
        assert_eq!(order, vec!["high", "high", "medium", "low"]);
    }

    #[test]
    fn dots_are_not_capped() {
        let company = Company {
            id: "1".to_string(),
            name: "Acme".to_string(),
            terms_risks: Some((0..50).map(|_| risk(Severity::High)).collect()),
            ..Default::default()
        };
        let card = render_card(&company);
        assert_eq!(card.matches(r#"class="risk-dot high""#).count(), 50);
    }

    #[test]
    fn empty_and_failed_states_differ() {
        let empty = render_grid(&CompanyStore::from_companies(vec![]));
        let mut failed = CompanyStore::new();
        failed.mark_failed(crate::store::LOAD_FAILED_MESSAGE);
        match (empty, render_grid(&failed)) {
            (GridView::Empty(a), GridView::Failed(b)) => {
                assert!(a.contains(EMPTY_MESSAGE));
                assert!(b.contains("Error loading companies"));
                assert_ne!(a, b);
            }
            other => panic!("unexpected views {other:?}"),
        }
    }

    #[test]
    fn card_escapes_names() {
        let company = Company {
            id: "1".to_string(),
            name: "<b>Evil</b>".to_string(),
            ..Default::default()
        };
        assert!(render_card(&company).contains("&lt;b&gt;Evil&lt;/b&gt;"));
    }
}
