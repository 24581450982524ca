pub mod chat;
pub mod dashboard;
pub mod detail;
pub mod grid;
pub mod html;

use std::collections::{HashMap, VecDeque};

use crate::model::PolicyKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Grid,
    Loading,
    EmptyState,
    Notice,
    Modal,
    ModalHeader,
    TabPane(PolicyKind),
    TabBadge(PolicyKind),
    PolicyEmpty(PolicyKind),
    Summary(PolicyKind),
    RiskList(PolicyKind),
    RawText(PolicyKind),
    ChatTranscript,
    ChatFilter,
    Dashboard,
    DashboardStats,
    DashboardEmpty,
    DashboardCharts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Seed,
    SeedRealData,
    AnalyzeAll,
    AddCompany,
    Delete,
    Analyze(PolicyKind),
    ViewText(PolicyKind),
    Upload(PolicyKind),
    ChatSend,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub visible: bool,
    pub label: String,
}

pub trait Surface {
    fn set_html(&mut self, slot: Slot, html: String);
    fn set_visible(&mut self, slot: Slot, visible: bool);
    fn set_control(&mut self, control: Control, enabled: bool, label: &str);
    fn show_control(&mut self, control: Control, visible: bool);
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct MemorySurface {
    html: HashMap<Slot, String>,
    visible: HashMap<Slot, bool>,
    controls: HashMap<Control, ControlState>,
    control_history: Vec<(Control, bool, String)>,
    writes: Vec<Slot>,
    alerts: Vec<String>,
    confirmations: Vec<String>,
    answers: VecDeque<bool>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self, slot: Slot) -> Option<&str> {
        self.html.get(&slot).map(|s| s.as_str())
    }

    pub fn is_visible(&self, slot: Slot) -> bool {
        self.visible.get(&slot).copied().unwrap_or(false)
    }

    pub fn control(&self, control: Control) -> Option<&ControlState> {
        self.controls.get(&control)
    }

    pub fn control_history(&self) -> &[(Control, bool, String)] {
        &self.control_history
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn confirmations(&self) -> &[String] {
        &self.confirmations
    }

    pub fn answer_next_confirm(&mut self, answer: bool) {
        self.answers.push_back(answer);
    }

    pub fn take_writes(&mut self) -> Vec<Slot> {
        std::mem::take(&mut self.writes)
    }
}

impl Surface for MemorySurface {
    fn set_html(&mut self, slot: Slot, html: String) {
        self.writes.push(slot);
        self.html.insert(slot, html);
    }

    fn set_visible(&mut self, slot: Slot, visible: bool) {
        self.visible.insert(slot, visible);
    }

    fn set_control(&mut self, control: Control, enabled: bool, label: &str) {
        self.control_history
            .push((control, enabled, label.to_string()));
        let entry = self.controls.entry(control).or_insert(ControlState {
            enabled,
            visible: true,
            label: String::new(),
        });
        entry.enabled = enabled;
        entry.label = label.to_string();
    }

    fn show_control(&mut self, control: Control, visible: bool) {
        let entry = self.controls.entry(control).or_insert(ControlState {
            enabled: true,
            visible,
            label: String::new(),
        });
        entry.visible = visible;
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirmations.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}
