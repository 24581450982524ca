use crate::markdown::{render_or_escape, MarkdownRenderer};
use crate::model::{Company, PolicyKind, Risk};

use super::html::{escape_html, icon_html, severity_badge};

pub const NOT_ANALYZED_MESSAGE: &str =
    "No risks analyzed yet. Click \"Analyze with AI\" to identify privacy risks.";
pub const NO_SUMMARY_MESSAGE: &str =
    "No summary available. Click \"Analyze with AI\" to generate one.";

pub const ANALYZING_HTML: &str = r#"<div class="analyzing"><div class="spinner"></div><span>AI is analyzing the document...</span></div>"#;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabView {
    pub kind: PolicyKind,
    pub has_document: bool,
    pub badge: usize,
    pub empty_html: String,
    pub summary_html: String,
    pub risks_html: String,
    pub raw_text_html: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailView {
    pub header_html: String,
    pub tabs: Vec<TabView>,
}

impl DetailView {
    pub fn tab(&self, kind: PolicyKind) -> &TabView {
        &self.tabs[kind.index()]
    }
}

pub fn render_detail(company: &Company, markdown: Option<&dyn MarkdownRenderer>) -> DetailView {
    DetailView {
        header_html: render_header(company),
        tabs: PolicyKind::ALL
            .into_iter()
            .map(|kind| render_tab(company, kind, markdown))
            .collect(),
    }
}

pub fn render_header(company: &Company) -> String {
    let updated = company
        .last_updated
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!(r#"<span class="last-updated">Updated {}</span>"#, escape_html(s)))
        .unwrap_or_default();
    format!(
        r#"<div class="company-icon">{}</div><div><h2>{}</h2><span class="category">{}</span>{}</div>"#,
        icon_html(company),
        escape_html(&company.name),
        escape_html(&company.category),
        updated
    )
}

pub fn render_tab(
    company: &Company,
    kind: PolicyKind,
    markdown: Option<&dyn MarkdownRenderer>,
) -> TabView {
    let risks = company.risks(kind);
    let document = company.document(kind);
    let empty_html = format!(
        r#"<div class="policy-empty"><p>{}</p></div>"#,
        escape_html(&missing_document_message(kind))
    );

    let (summary_html, raw_text_html) = match document {
        Some(text) => {
            let summary = match company.summary(kind) {
                Some(summary) => format!(
                    r#"<div class="summary markdown">{}</div>"#,
                    render_or_escape(markdown, summary)
                ),
                None => format!(r#"<p class="summary">{}</p>"#, escape_html(NO_SUMMARY_MESSAGE)),
            };
            let raw = format!(r#"<pre class="raw-text">{}</pre>"#, escape_html(text));
            (summary, raw)
        }
        None => (String::new(), String::new()),
    };

    TabView {
        kind,
        has_document: document.is_some(),
        badge: risks.len(),
        empty_html,
        summary_html,
        risks_html: render_risk_list(company, kind),
        raw_text_html,
    }
}

pub fn missing_document_message(kind: PolicyKind) -> String {
    format!("No {} available for this company.", kind.label())
}

pub fn empty_risks_message(company: &Company, kind: PolicyKind) -> String {
    if !company.has_document(kind) {
        missing_document_message(kind)
    } else if company.summary(kind).is_none() {
        NOT_ANALYZED_MESSAGE.to_string()
    } else {
        format!(
            "No significant risks were identified in this {}.",
            kind.label()
        )
    }
}

pub fn render_risk_list(company: &Company, kind: PolicyKind) -> String {
    let risks = company.risks(kind);
    if risks.is_empty() {
        return format!(
            r#"<p class="no-risks">{}</p>"#,
            escape_html(&empty_risks_message(company, kind))
        );
    }
    risks.iter().map(render_risk).collect::<Vec<_>>().join("\n")
}

pub fn render_risk(risk: &Risk) -> String {
    format!(
        r#"<div class="risk-item {}"><h4>{} {}</h4><p>{}</p></div>"#,
        risk.severity.css_class(),
        escape_html(&risk.title),
        severity_badge(&risk.severity),
        escape_html(&risk.description)
    )
}

pub fn analysis_failed_html(message: &str) -> String {
    format!(
        r#"<p class="no-risks error">{}</p>"#,
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn company() -> Company {
        Company {
            id: "1".to_string(),
            name: "Acme".to_string(),
            category: "social".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn three_distinct_empty_messages() {
        let missing = company();
        let unanalyzed = Company {
            cookie_text: Some("We use cookies.".to_string()),
            ..company()
        };
        let clean = Company {
            cookie_text: Some("We use cookies.".to_string()),
            cookie_summary: Some("Benign.".to_string()),
            cookie_risks: Some(vec![]),
            ..company()
        };
        let a = empty_risks_message(&missing, PolicyKind::Cookie);
        let b = empty_risks_message(&unanalyzed, PolicyKind::Cookie);
        let c = empty_risks_message(&clean, PolicyKind::Cookie);
        assert_eq!(a, "No Cookie Policy available for this company.");
        assert_eq!(b, NOT_ANALYZED_MESSAGE);
        assert!(c.contains("No significant risks"));
    }

    #[test]
    fn tab_without_document_has_no_summary_or_raw_text() {
        let view = render_tab(&company(), PolicyKind::Privacy, None);
        assert!(!view.has_document);
        assert!(view.summary_html.is_empty());
        assert!(view.raw_text_html.is_empty());
        assert!(view.empty_html.contains("Privacy Policy"));
    }

    #[test]
    fn summary_uses_markdown_when_available() {
        let analyzed = Company {
            terms_text: Some("terms".to_string()),
            terms_summary: Some("**bold**".to_string()),
            terms_risks: Some(vec![Risk::new("Sells data", "d", Severity::High)]),
            ..company()
        };
        let md = crate::markdown::CommonMark::default();
        let with = render_tab(&analyzed, PolicyKind::Terms, Some(&md));
        assert!(with.summary_html.contains("<strong>bold</strong>"));
        let without = render_tab(&analyzed, PolicyKind::Terms, None);
        assert!(without.summary_html.contains("**bold**"));
        assert_eq!(with.badge, 1);
        assert!(with.risks_html.contains(r#"<span class="severity-badge high">high</span>"#));
    }
}
