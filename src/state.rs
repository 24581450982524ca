use crate::charts::{ChartHandle, ChartSlot};
use crate::chat::ChatSession;
use crate::model::PolicyKind;
use crate::store::CompanyStore;

// Raw-text toggles are per tab and start collapsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModalState {
    pub open: bool,
    pub selected: Option<String>,
    pub active_tab: Option<PolicyKind>,
    raw_expanded: [bool; 3],
}

impl ModalState {
    pub fn open(&mut self, id: &str) {
        self.open = true;
        self.selected = Some(id.to_string());
        self.active_tab = Some(PolicyKind::Terms);
        self.raw_expanded = [false; 3];
    }

    pub fn close(&mut self) {
        self.open = false;
        self.selected = None;
    }

    pub fn active_tab(&self) -> PolicyKind {
        self.active_tab.unwrap_or(PolicyKind::Terms)
    }

    pub fn is_raw_expanded(&self, kind: PolicyKind) -> bool {
        self.raw_expanded[kind.index()]
    }

    pub fn toggle_raw(&mut self, kind: PolicyKind) -> bool {
        let slot = &mut self.raw_expanded[kind.index()];
        *slot = !*slot;
        *slot
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DashboardState {
    #[default]
    Closed,
    Rendering,
    Rendered {
        charts: Vec<(ChartSlot, ChartHandle)>,
    },
}

impl DashboardState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn chart_handles(&self) -> &[(ChartSlot, ChartHandle)] {
        match self {
            Self::Rendered { charts } => charts,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub store: CompanyStore,
    pub modal: ModalState,
    pub chat: ChatSession,
    pub dashboard: DashboardState,
}

impl AppState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            chat: ChatSession::new(history_limit),
            ..Default::default()
        }
    }

    pub fn selected_company(&self) -> Option<&crate::model::Company> {
        self.modal
            .selected
            .as_deref()
            .and_then(|id| self.store.get(id))
    }
}
