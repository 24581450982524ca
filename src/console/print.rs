use colored::{ColoredString, Colorize};

use crate::analytics::Analytics;
use crate::chat::ChatEntry;
use crate::model::{ChatRole, Company, PolicyKind, Severity};
use crate::store::{CompanyStore, LoadStatus};
use crate::view::{detail, grid};

fn paint(severity: &Severity, text: &str) -> ColoredString {
    match severity {
        Severity::High => text.red(),
        Severity::Medium => text.yellow(),
        Severity::Low => text.green(),
        Severity::Other(_) => text.dimmed(),
    }
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<12}: {}", label, value);
}

pub fn print_grid(store: &CompanyStore) {
    match store.status() {
        LoadStatus::Failed(message) => {
            println!("{}", message.red());
            return;
        }
        _ if store.is_empty() => {
            println!("{}", grid::EMPTY_MESSAGE);
            return;
        }
        _ => {}
    }
    for company in store.companies() {
        let dots: String = grid::risk_dots(company)
            .into_iter()
            .map(|s| paint(s, "●").to_string())
            .collect();
        println!(
            "{:>4}  {:<28} {:<16} {}",
            company.id.bold(),
            company.name,
            company.category.dimmed(),
            dots
        );
    }
}

pub fn print_company(company: &Company, kind: PolicyKind, raw: bool) {
    println!("{} {}", company.name.bold(), format!("({})", company.category).dimmed());
    if let Some(updated) = company.last_updated.as_deref() {
        format_kv_line("Updated", updated);
    }
    for k in PolicyKind::ALL {
        let marker = if k == kind { ">" } else { " " };
        println!("{marker} {} [{}]", k.tab_label(), company.risks(k).len());
    }
    println!();

    if !company.has_document(kind) {
        println!("{}", detail::missing_document_message(kind).dimmed());
        return;
    }
    match company.summary(kind) {
        Some(summary) => println!("{summary}\n"),
        None => println!("{}\n", detail::NO_SUMMARY_MESSAGE.dimmed()),
    }
    let risks = company.risks(kind);
    if risks.is_empty() {
        println!("{}", detail::empty_risks_message(company, kind));
    }
    for risk in risks {
        println!(
            "[{}] {}",
            paint(&risk.severity, &risk.severity.as_str().to_uppercase()),
            risk.title.bold()
        );
        println!("    {}", risk.description);
    }
    if raw {
        if let Some(text) = company.document(kind) {
            println!("\n{}\n{text}", "Full text".bold());
        }
    }
}

pub fn print_analytics(analytics: &Analytics, top_n: usize) {
    if analytics.is_empty() {
        println!("{}", crate::view::dashboard::EMPTY_MESSAGE);
        return;
    }
    format_kv_line("Companies", &analytics.total_companies.to_string());
    format_kv_line("Total risks", &analytics.total_risks.to_string());
    println!(
        ":: {:<12}: {} / {} / {}",
        "Severity",
        analytics.severity.high.to_string().red(),
        analytics.severity.medium.to_string().yellow(),
        analytics.severity.low.to_string().green()
    );
    for kind in PolicyKind::ALL {
        format_kv_line(kind.tab_label(), &analytics.by_policy.get(kind).to_string());
    }

    println!("\n{}", "Top companies".bold());
    for c in analytics.top_companies(top_n) {
        println!(
            "  {:<28} {:>4}  ({} / {} / {})",
            c.name, c.total, c.counts.high, c.counts.medium, c.counts.low
        );
    }

    println!("\n{}", "Average risks by category".bold());
    for c in &analytics.by_category {
        println!(
            "  {:<20} {:>6.1}  ({} companies)",
            c.category, c.average, c.companies
        );
    }
}

pub fn print_chat_entry(entry: &ChatEntry) {
    match entry.message.role {
        ChatRole::User => println!("{} {}", "you ::".bold().blue(), entry.message.content),
        ChatRole::Assistant if entry.failed => {
            println!("{} {}", "assistant ::".bold().red(), entry.message.content)
        }
        ChatRole::Assistant => {
            println!("{} {}", "assistant ::".bold().green(), entry.message.content);
            if !entry.sources.is_empty() {
                let chips: Vec<String> = entry
                    .sources
                    .iter()
                    .map(|s| format!("{} (#{})", s.chip_label(), s.company_id))
                    .collect();
                println!("{} {}", "sources ::".dimmed(), chips.join(", "));
            }
        }
    }
}
