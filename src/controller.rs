use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::analytics::{self, DEFAULT_TOP_COMPANIES};
use crate::charts::{build_chart_specs, ChartBackend};
use crate::chat::DEFAULT_HISTORY_LIMIT;
use crate::client::wire::error_lines;
use crate::client::{AnalyzeAllReport, ApiError, Backend, SeedReport};
use crate::forms::{self, AddCompanyForm, DocumentField, FormError};
use crate::markdown::MarkdownRenderer;
use crate::model::{Company, PolicyKind};
use crate::state::{AppState, DashboardState};
use crate::view::{self, grid::GridView, Control, Slot, Surface};

pub const ADD_FAILED: &str = "Error adding company. Please try again.";
pub const DELETE_FAILED: &str = "Error deleting company. Please try again.";
pub const ANALYZE_FAILED: &str = "Analysis failed. Please try again.";
pub const UPLOAD_FAILED: &str = "Error uploading document. Please try again.";
pub const SEED_FAILED: &str = "Error loading sample data. Please try again.";
pub const ANALYZE_ALL_FAILED: &str = "Error analyzing companies. Please try again.";
pub const CHAT_FAILED: &str = "Please try again.";

#[derive(Clone, Debug)]
pub struct Options {
    pub history_limit: usize,
    pub top_companies: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            top_companies: DEFAULT_TOP_COMPANIES,
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unknown company: {id}")]
    UnknownCompany { id: String },
}

fn idle_label(control: Control) -> &'static str {
    match control {
        Control::Seed => "Load Sample Data",
        Control::SeedRealData => "Load Real Data",
        Control::AnalyzeAll => "Analyze All",
        Control::AddCompany => "Add & Analyze",
        Control::Delete => "Delete",
        Control::Analyze(_) => "Analyze with AI",
        Control::ViewText(_) => "View Full Text",
        Control::Upload(_) => "Upload",
        Control::ChatSend => "Send",
    }
}

fn view_text_label(expanded: bool) -> &'static str {
    if expanded {
        "Hide Full Text"
    } else {
        "View Full Text"
    }
}

pub struct Controller<B, S, C>
where
    B: Backend,
    S: Surface,
    C: ChartBackend,
{
    backend: B,
    surface: S,
    charts: C,
    markdown: Option<Box<dyn MarkdownRenderer>>,
    state: AppState,
    options: Options,
}

impl<B, S, C> Controller<B, S, C>
where
    B: Backend,
    S: Surface,
    C: ChartBackend,
{
    pub fn new(backend: B, surface: S, charts: C, options: Options) -> Self {
        Self {
            state: AppState::new(options.history_limit),
            backend,
            surface,
            charts,
            markdown: None,
            options,
        }
    }

    pub fn with_markdown(mut self, renderer: Box<dyn MarkdownRenderer>) -> Self {
        self.markdown = Some(renderer);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn charts(&self) -> &C {
        &self.charts
    }

    pub fn markdown(&self) -> Option<&dyn MarkdownRenderer> {
        self.markdown.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    fn busy(&mut self, control: Control, label: &str) {
        self.surface.set_control(control, false, label);
    }

    fn idle(&mut self, control: Control) {
        self.surface.set_control(control, true, idle_label(control));
    }

    pub async fn load_companies(&mut self) -> Result<usize, ApiError> {
        self.surface.set_visible(Slot::Loading, true);
        let result = self.state.store.load(&self.backend).await;
        self.surface.set_visible(Slot::Loading, false);

        match &result {
            Ok(count) => {
                info!(count, "companies loaded");
                self.surface.set_visible(Slot::Notice, false);
            }
            Err(e) => {
                error!(error = %e, "error loading companies");
                self.surface.set_html(
                    Slot::Notice,
                    format!(
                        r#"<p class="notice error">{}</p>"#,
                        view::html::escape_html(&e.user_message(
                            crate::store::LOAD_FAILED_MESSAGE
                        ))
                    ),
                );
                self.surface.set_visible(Slot::Notice, true);
            }
        }
        self.render_grid();
        self.refresh_dashboard();
        result
    }

    pub fn render_grid(&mut self) {
        match view::grid::render_grid(&self.state.store) {
            GridView::Cards(html) => {
                self.surface.set_html(Slot::Grid, html);
                self.surface.set_visible(Slot::Grid, true);
                self.surface.set_visible(Slot::EmptyState, false);
            }
            GridView::Empty(html) | GridView::Failed(html) => {
                self.surface.set_html(Slot::Grid, String::new());
                self.surface.set_html(Slot::EmptyState, html);
                self.surface.set_visible(Slot::Grid, false);
                self.surface.set_visible(Slot::EmptyState, true);
            }
        }
    }

    pub fn open_company(&mut self, id: &str) -> bool {
        if self.state.store.get(id).is_none() {
            warn!(id, "cannot open unknown company");
            return false;
        }
        self.state.modal.open(id);
        self.render_modal();
        self.surface.set_visible(Slot::Modal, true);
        true
    }

    pub fn close_modal(&mut self) {
        self.state.modal.close();
        self.surface.set_visible(Slot::Modal, false);
    }

    fn render_modal(&mut self) {
        let Some(company) = self.state.selected_company() else {
            return;
        };
        let detail = view::detail::render_detail(company, self.markdown.as_deref());
        let active = self.state.modal.active_tab();

        self.surface.set_html(Slot::ModalHeader, detail.header_html);
        for tab in detail.tabs {
            let kind = tab.kind;
            let expanded = self.state.modal.is_raw_expanded(kind);
            self.surface.set_html(Slot::TabBadge(kind), tab.badge.to_string());
            self.surface.set_html(Slot::PolicyEmpty(kind), tab.empty_html);
            self.surface.set_html(Slot::Summary(kind), tab.summary_html);
            self.surface.set_html(Slot::RiskList(kind), tab.risks_html);
            self.surface.set_html(Slot::RawText(kind), tab.raw_text_html);
            self.surface.set_visible(Slot::PolicyEmpty(kind), !tab.has_document);
            self.surface
                .set_visible(Slot::RawText(kind), tab.has_document && expanded);
            self.surface.show_control(Control::Analyze(kind), tab.has_document);
            self.surface.show_control(Control::ViewText(kind), tab.has_document);
            self.surface
                .set_control(Control::ViewText(kind), true, view_text_label(expanded));
            self.surface.set_visible(Slot::TabPane(kind), kind == active);
        }
    }

    pub fn switch_tab(&mut self, kind: PolicyKind) {
        self.state.modal.active_tab = Some(kind);
        for other in PolicyKind::ALL {
            self.surface.set_visible(Slot::TabPane(other), other == kind);
        }
    }

    pub fn toggle_raw_text(&mut self, kind: PolicyKind) -> bool {
        let expanded = self.state.modal.toggle_raw(kind);
        self.surface.set_visible(Slot::RawText(kind), expanded);
        self.surface.set_control(
            Control::ViewText(kind),
            true,
            view_text_label(expanded),
        );
        expanded
    }

    fn is_showing(&self, id: &str) -> bool {
        self.state.modal.open && self.state.modal.selected.as_deref() == Some(id)
    }

    fn company_changed(&mut self, id: &str) {
        self.render_grid();
        if self.is_showing(id) {
            self.render_modal();
        }
        self.refresh_dashboard();
    }

    pub async fn add_company(&mut self, form: &AddCompanyForm) -> Result<Company, ActionError> {
        let request = match form.build_request() {
            Ok(request) => request,
            Err(e) => {
                self.surface.alert(&e.to_string());
                return Err(e.into());
            }
        };
        let auto = request.is_auto_fetch();
        self.busy(
            Control::AddCompany,
            if auto {
                "Fetching & Analyzing..."
            } else {
                "Analyzing..."
            },
        );
        let result = if auto {
            self.backend.auto_create_company(&request).await
        } else {
            self.backend.create_company(&request).await
        };
        self.idle(Control::AddCompany);

        match result {
            Ok(company) => {
                info!(id = %company.id, name = %company.name, "company added");
                // Inserts are only visible after a reload; a failed reload reports itself.
                let _ = self.load_companies().await;
                self.open_company(&company.id);
                Ok(company)
            }
            Err(e) => {
                error!(error = %e, "error adding company");
                self.surface.alert(&e.user_message(ADD_FAILED));
                Err(e.into())
            }
        }
    }

    pub async fn delete_company(&mut self, id: &str) -> Result<bool, ActionError> {
        let name = match self.state.store.get(id) {
            Some(company) => company.name.clone(),
            None => return Err(ActionError::UnknownCompany { id: id.to_string() }),
        };
        if !self
            .surface
            .confirm(&format!("Are you sure you want to delete {name}?"))
        {
            debug!(id, "delete cancelled");
            return Ok(false);
        }

        self.busy(Control::Delete, "Deleting...");
        let result = self.backend.delete_company(id).await;
        self.idle(Control::Delete);

        match result {
            Ok(()) => {
                info!(id, "company deleted");
                self.state.store.remove(id);
                if self.state.modal.selected.as_deref() == Some(id) {
                    self.close_modal();
                }
                if self.state.chat.company_filter() == Some(id) {
                    self.set_chat_filter(None);
                }
                self.company_changed(id);
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, "error deleting company");
                self.surface.alert(&e.user_message(DELETE_FAILED));
                Err(e.into())
            }
        }
    }

    pub async fn analyze(&mut self, id: &str, kind: PolicyKind) -> Result<Company, ActionError> {
        let company = self
            .state
            .store
            .get(id)
            .ok_or_else(|| ActionError::UnknownCompany { id: id.to_string() })?;
        if !company.has_document(kind) {
            let e = FormError::NoDocument { label: kind.label() };
            self.surface.alert(&e.to_string());
            return Err(e.into());
        }

        let showing = self.is_showing(id);
        self.busy(Control::Analyze(kind), "Analyzing...");
        if showing {
            self.surface.set_html(
                Slot::RiskList(kind),
                view::detail::ANALYZING_HTML.to_string(),
            );
        }
        let result = self.backend.analyze(id, kind).await;
        self.idle(Control::Analyze(kind));

        match result {
            Ok(updated) => {
                info!(id, policy = %kind, risks = updated.risks(kind).len(), "analysis complete");
                self.state.store.upsert(updated.clone());
                self.company_changed(id);
                Ok(updated)
            }
            Err(e) => {
                error!(error = %e, policy = %kind, "error analyzing company");
                let message = e.user_message(ANALYZE_FAILED);
                if self.is_showing(id) {
                    self.surface.set_html(
                        Slot::RiskList(kind),
                        view::detail::analysis_failed_html(&message),
                    );
                } else {
                    self.surface.alert(&message);
                }
                Err(e.into())
            }
        }
    }

    pub async fn upload_document(
        &mut self,
        id: &str,
        kind: PolicyKind,
        field: &DocumentField,
    ) -> Result<Company, ActionError> {
        if self.state.store.get(id).is_none() {
            return Err(ActionError::UnknownCompany { id: id.to_string() });
        }
        let input = match forms::build_upload(kind, field) {
            Ok(input) => input,
            Err(e) => {
                self.surface.alert(&e.to_string());
                return Err(e.into());
            }
        };

        self.busy(Control::Upload(kind), "Uploading...");
        let result = self.backend.upload_document(id, kind, &input).await;
        self.idle(Control::Upload(kind));

        match result {
            Ok(updated) => {
                info!(id, policy = %kind, "document uploaded");
                self.state.store.upsert(updated.clone());
                self.company_changed(id);
                Ok(updated)
            }
            Err(e) => {
                error!(error = %e, policy = %kind, "error uploading document");
                self.surface.alert(&e.user_message(UPLOAD_FAILED));
                Err(e.into())
            }
        }
    }

    pub async fn seed(&mut self, real_data: bool) -> Result<SeedReport, ActionError> {
        let control = if real_data {
            Control::SeedRealData
        } else {
            Control::Seed
        };
        self.busy(control, "Loading...");
        let result = self.backend.seed(real_data).await;
        self.idle(control);

        match result {
            Ok(report) => {
                info!(created = report.companies_created, "database seeded");
                let _ = self.load_companies().await;
                let mut message = format!("Created {} companies.", report.companies_created);
                append_errors(&mut message, &error_lines(&report.errors));
                self.surface.alert(&message);
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "error seeding database");
                self.surface.alert(&e.user_message(SEED_FAILED));
                Err(e.into())
            }
        }
    }

    pub async fn analyze_all(&mut self) -> Result<AnalyzeAllReport, ActionError> {
        self.busy(Control::AnalyzeAll, "Analyzing...");
        let result = self.backend.analyze_all().await;
        self.idle(Control::AnalyzeAll);

        match result {
            Ok(report) => {
                info!(analyzed = report.companies_analyzed, "bulk analysis complete");
                let _ = self.load_companies().await;
                let mut message = format!("Analyzed {} companies.", report.companies_analyzed);
                append_errors(&mut message, &error_lines(&report.errors));
                self.surface.alert(&message);
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "error analyzing all companies");
                self.surface.alert(&e.user_message(ANALYZE_ALL_FAILED));
                Err(e.into())
            }
        }
    }

    pub fn render_chat(&mut self) {
        let html = view::chat::render_transcript(&self.state.chat, self.markdown.as_deref());
        self.surface.set_html(Slot::ChatTranscript, html);
    }

    pub fn set_chat_filter(&mut self, company_id: Option<String>) {
        self.state.chat.set_company_filter(company_id);
        let company = self
            .state
            .chat
            .company_filter()
            .and_then(|id| self.state.store.get(id));
        let html = view::chat::render_filter(company);
        self.surface.set_html(Slot::ChatFilter, html);
    }

    pub async fn send_chat(&mut self, question: &str) -> bool {
        let Some(request) = self.state.chat.begin(question) else {
            return false;
        };
        self.render_chat();
        self.busy(Control::ChatSend, "...");
        let result = self.backend.chat(&request).await;
        self.idle(Control::ChatSend);

        match result {
            Ok(reply) => {
                debug!(
                    sources = reply.sources.as_ref().map(|s| s.len()).unwrap_or(0),
                    "chat reply received"
                );
                self.state.chat.resolve(reply);
            }
            Err(e) => {
                error!(error = %e, "chat request failed");
                self.state.chat.fail(&e.user_message(CHAT_FAILED));
            }
        }
        self.render_chat();
        true
    }

    pub fn open_source(&mut self, company_id: &str) -> bool {
        self.open_company(company_id)
    }

    pub fn clear_chat(&mut self) {
        self.state.chat.clear();
        self.render_chat();
    }

    pub fn open_dashboard(&mut self) {
        self.surface.set_visible(Slot::Dashboard, true);
        self.render_dashboard();
    }

    pub fn refresh_dashboard(&mut self) {
        if self.state.dashboard.is_open() {
            self.render_dashboard();
        }
    }

    pub fn close_dashboard(&mut self) {
        self.destroy_charts();
        self.state.dashboard = DashboardState::Closed;
        self.surface.set_visible(Slot::Dashboard, false);
    }

    fn destroy_charts(&mut self) {
        let previous = std::mem::take(&mut self.state.dashboard);
        for (slot, handle) in previous.chart_handles() {
            if let Err(e) = self.charts.destroy(*handle) {
                warn!(error = %e, canvas = slot.canvas_id(), "chart already gone");
            }
        }
    }

    fn render_dashboard(&mut self) {
        self.destroy_charts();
        self.state.dashboard = DashboardState::Rendering;

        let analytics = analytics::aggregate(self.state.store.companies());
        self.surface
            .set_html(Slot::DashboardStats, view::dashboard::render_stats(&analytics));

        if analytics.is_empty() {
            self.surface
                .set_html(Slot::DashboardEmpty, view::dashboard::render_empty());
            self.surface.set_visible(Slot::DashboardEmpty, true);
            self.surface.set_visible(Slot::DashboardCharts, false);
            self.state.dashboard = DashboardState::Rendered { charts: Vec::new() };
            return;
        }

        self.surface.set_visible(Slot::DashboardEmpty, false);
        self.surface
            .set_html(Slot::DashboardCharts, view::dashboard::render_canvases());
        self.surface.set_visible(Slot::DashboardCharts, true);

        let mut charts = Vec::new();
        for spec in build_chart_specs(&analytics, self.options.top_companies) {
            match self.charts.create(&spec) {
                Ok(handle) => charts.push((spec.slot, handle)),
                Err(e) => error!(error = %e, canvas = spec.slot.canvas_id(), "failed to render chart"),
            }
        }
        self.state.dashboard = DashboardState::Rendered { charts };
    }
}

fn append_errors(message: &mut String, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    message.push_str(&format!("\n{} errors:", errors.len()));
    for e in errors {
        message.push_str("\n- ");
        message.push_str(e);
    }
}
