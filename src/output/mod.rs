pub mod report;

use serde::Serialize;

use crate::analytics::Analytics;
use crate::markdown::MarkdownRenderer;
use crate::model::{Company, PolicyKind, Risk};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct PolicyRecord {
    pub policy: &'static str,
    pub available: bool,
    pub summary: Option<String>,
    pub risks: Vec<Risk>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub last_updated: Option<String>,
    pub total_risks: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub policies: Vec<PolicyRecord>,
}

pub fn build_records(companies: &[Company]) -> Vec<CompanyRecord> {
    companies
        .iter()
        .map(|c| {
            let counts = c.severity_counts();
            CompanyRecord {
                id: c.id.clone(),
                name: c.name.clone(),
                category: c.category.clone(),
                last_updated: c.last_updated.clone(),
                total_risks: counts.total(),
                high: counts.high,
                medium: counts.medium,
                low: counts.low,
                policies: PolicyKind::ALL
                    .iter()
                    .map(|&kind| PolicyRecord {
                        policy: kind.slug(),
                        available: c.has_document(kind),
                        summary: c.summary(kind).map(str::to_string),
                        risks: c.risks(kind).to_vec(),
                    })
                    .collect(),
            }
        })
        .collect()
}

pub fn render_text(records: &[CompanyRecord], analytics: &Analytics) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&format!(
        "{} companies, {} risks ({} high, {} medium, {} low)\n\n",
        analytics.total_companies,
        analytics.total_risks,
        analytics.severity.high,
        analytics.severity.medium,
        analytics.severity.low
    ));
    for r in records {
        out.push_str(&format!(
            "{} [{}] {} risks\n",
            r.name, r.category, r.total_risks
        ));
        for p in r.policies.iter().filter(|p| !p.risks.is_empty()) {
            for risk in &p.risks {
                out.push_str(&format!(
                    "  {:<8} {:<8} {}\n",
                    p.policy,
                    risk.severity.as_str(),
                    risk.title
                ));
            }
        }
    }
    out.into_bytes()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    companies: &'a [CompanyRecord],
    analytics: &'a Analytics,
}

pub fn render_json(records: &[CompanyRecord], analytics: &Analytics) -> Vec<u8> {
    serde_json::to_vec_pretty(&JsonReport {
        companies: records,
        analytics,
    })
    .unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(
    companies: &[Company],
    analytics: &Analytics,
    charts: &[(&'static str, &serde_json::Value)],
    markdown: Option<&dyn MarkdownRenderer>,
) -> Vec<u8> {
    report::render_html(companies, analytics, charts, markdown)
}
