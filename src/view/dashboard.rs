use crate::analytics::Analytics;
use crate::charts::ChartSlot;
use crate::model::PolicyKind;

use super::html::escape_html;

pub const EMPTY_MESSAGE: &str = "No companies to analyze yet. Add companies to see analytics.";

fn stat_card(label: &str, value: usize, class: &str) -> String {
    format!(
        r#"<div class="stat-card {class}"><span class="stat-value">{value}</span><span class="stat-label">{}</span></div>"#,
        escape_html(label)
    )
}

pub fn render_stats(analytics: &Analytics) -> String {
    let mut cards = vec![
        stat_card("Companies", analytics.total_companies, "companies"),
        stat_card("Total Risks", analytics.total_risks, "total"),
        stat_card("High", analytics.severity.high, "high"),
        stat_card("Medium", analytics.severity.medium, "medium"),
        stat_card("Low", analytics.severity.low, "low"),
    ];
    for kind in PolicyKind::ALL {
        cards.push(stat_card(
            kind.label(),
            analytics.by_policy.get(kind),
            kind.slug(),
        ));
    }
    cards.join("\n")
}

pub fn render_canvases() -> String {
    ChartSlot::ALL
        .iter()
        .map(|slot| {
            format!(
                r#"<div class="chart-container"><canvas id="{}"></canvas></div>"#,
                slot.canvas_id()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_empty() -> String {
    format!(r#"<p class="empty-state">{EMPTY_MESSAGE}</p>"#)
}
