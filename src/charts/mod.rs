use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::analytics::Analytics;
use crate::model::PolicyKind;

pub const HIGH_COLOR: &str = "#f44336";
pub const MEDIUM_COLOR: &str = "#ff9800";
pub const LOW_COLOR: &str = "#4caf50";
const POLICY_COLORS: [&str; 3] = ["#3f51b5", "#9c27b0", "#009688"];
const CATEGORY_COLOR: &str = "#607d8b";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ChartSlot {
    Severity,
    TopCompanies,
    PolicyTypes,
    SeverityByCompany,
    CategoryAverage,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 5] = [
        ChartSlot::Severity,
        ChartSlot::TopCompanies,
        ChartSlot::PolicyTypes,
        ChartSlot::SeverityByCompany,
        ChartSlot::CategoryAverage,
    ];

    pub fn canvas_id(self) -> &'static str {
        match self {
            Self::Severity => "severityChart",
            Self::TopCompanies => "topCompaniesChart",
            Self::PolicyTypes => "policyTypeChart",
            Self::SeverityByCompany => "severityByCompanyChart",
            Self::CategoryAverage => "categoryChart",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Doughnut,
    Bar,
    StackedBar,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub colors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub slot: ChartSlot,
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

fn dataset(label: &str, data: Vec<f64>, colors: &[&str]) -> Dataset {
    Dataset {
        label: label.to_string(),
        data,
        colors: colors.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn build_chart_specs(analytics: &Analytics, top_n: usize) -> Vec<ChartSpec> {
    let top = analytics.top_companies(top_n);
    let top_labels: Vec<String> = top.iter().map(|c| c.name.clone()).collect();

    vec![
        ChartSpec {
            slot: ChartSlot::Severity,
            kind: ChartKind::Doughnut,
            title: "Risks by Severity".to_string(),
            labels: vec!["High".into(), "Medium".into(), "Low".into()],
            datasets: vec![dataset(
                "Risks",
                vec![
                    analytics.severity.high as f64,
                    analytics.severity.medium as f64,
                    analytics.severity.low as f64,
                ],
                &[HIGH_COLOR, MEDIUM_COLOR, LOW_COLOR],
            )],
        },
        ChartSpec {
            slot: ChartSlot::TopCompanies,
            kind: ChartKind::Bar,
            title: format!("Top {} Companies by Risk Count", top.len()),
            labels: top_labels.clone(),
            datasets: vec![dataset(
                "Total risks",
                top.iter().map(|c| c.total as f64).collect(),
                &[HIGH_COLOR],
            )],
        },
        ChartSpec {
            slot: ChartSlot::PolicyTypes,
            kind: ChartKind::Doughnut,
            title: "Risks by Policy Type".to_string(),
            labels: PolicyKind::ALL
                .iter()
                .map(|k| k.label().to_string())
                .collect(),
            datasets: vec![dataset(
                "Risks",
                PolicyKind::ALL
                    .iter()
                    .map(|k| analytics.by_policy.get(*k) as f64)
                    .collect(),
                &POLICY_COLORS,
            )],
        },
        ChartSpec {
            slot: ChartSlot::SeverityByCompany,
            kind: ChartKind::StackedBar,
            title: "Severity Breakdown by Company".to_string(),
            labels: top_labels,
            datasets: vec![
                dataset(
                    "High",
                    top.iter().map(|c| c.counts.high as f64).collect(),
                    &[HIGH_COLOR],
                ),
                dataset(
                    "Medium",
                    top.iter().map(|c| c.counts.medium as f64).collect(),
                    &[MEDIUM_COLOR],
                ),
                dataset(
                    "Low",
                    top.iter().map(|c| c.counts.low as f64).collect(),
                    &[LOW_COLOR],
                ),
            ],
        },
        ChartSpec {
            slot: ChartSlot::CategoryAverage,
            kind: ChartKind::Bar,
            title: "Average Risks by Category".to_string(),
            labels: analytics
                .by_category
                .iter()
                .map(|c| c.category.clone())
                .collect(),
            datasets: vec![dataset(
                "Average risks",
                analytics
                    .by_category
                    .iter()
                    .map(|c| (c.average * 10.0).round() / 10.0)
                    .collect(),
                &[CATEGORY_COLOR],
            )],
        },
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartHandle(u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("canvas '{canvas}' is already in use by another chart")]
    CanvasInUse { canvas: &'static str },

    #[error("chart handle {0:?} is not attached to any canvas")]
    UnknownHandle(ChartHandle),
}

pub trait ChartBackend {
    fn create(&mut self, spec: &ChartSpec) -> Result<ChartHandle, ChartError>;
    fn destroy(&mut self, handle: ChartHandle) -> Result<(), ChartError>;
}

#[derive(Debug, Default)]
pub struct ChartJs {
    next_id: u64,
    live: BTreeMap<ChartSlot, (ChartHandle, Value)>,
}

impl ChartJs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn configs(&self) -> Vec<(&'static str, &Value)> {
        self.live
            .iter()
            .map(|(slot, (_, config))| (slot.canvas_id(), config))
            .collect()
    }
}

fn chartjs_config(spec: &ChartSpec) -> Value {
    let chart_type = match spec.kind {
        ChartKind::Doughnut => "doughnut",
        ChartKind::Bar | ChartKind::StackedBar => "bar",
    };
    let datasets: Vec<Value> = spec
        .datasets
        .iter()
        .map(|d| {
            let color: Value = if d.colors.len() == 1 {
                json!(d.colors[0])
            } else {
                json!(d.colors)
            };
            json!({ "label": d.label, "data": d.data, "backgroundColor": color })
        })
        .collect();
    let mut options = json!({
        "responsive": true,
        "plugins": { "title": { "display": true, "text": spec.title } }
    });
    if spec.kind == ChartKind::StackedBar {
        options["scales"] = json!({ "x": { "stacked": true }, "y": { "stacked": true } });
    }
    json!({
        "type": chart_type,
        "data": { "labels": spec.labels, "datasets": datasets },
        "options": options
    })
}

impl ChartBackend for ChartJs {
    fn create(&mut self, spec: &ChartSpec) -> Result<ChartHandle, ChartError> {
        if self.live.contains_key(&spec.slot) {
            return Err(ChartError::CanvasInUse {
                canvas: spec.slot.canvas_id(),
            });
        }
        self.next_id += 1;
        let handle = ChartHandle(self.next_id);
        self.live.insert(spec.slot, (handle, chartjs_config(spec)));
        Ok(handle)
    }

    fn destroy(&mut self, handle: ChartHandle) -> Result<(), ChartError> {
        let slot = self
            .live
            .iter()
            .find(|(_, (h, _))| *h == handle)
            .map(|(slot, _)| *slot)
            .ok_or(ChartError::UnknownHandle(handle))?;
        self.live.remove(&slot);
        Ok(())
    }
}
