use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::charts::ChartJs;
use crate::client::{
    AnalyzeAllReport, ApiError, Backend, ChatReply, ChatRequest, CreateCompanyRequest,
    DocumentInput, SeedReport,
};
use crate::controller::{Controller, Options, ADD_FAILED};
use crate::forms::{AddCompanyForm, DocumentField};
use crate::model::{ChatSource, Company, PolicyKind, Risk, Severity};
use crate::state::DashboardState;
use crate::view::{detail, grid, Control, MemorySurface, Slot};

#[derive(Default)]
struct FakeBackend {
    companies: Mutex<Vec<Company>>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    detail: Mutex<Option<String>>,
    chats: Mutex<Vec<ChatRequest>>,
    next_id: Mutex<u32>,
}

impl FakeBackend {
    fn with(companies: Vec<Company>) -> Self {
        Self {
            companies: Mutex::new(companies),
            next_id: Mutex::new(100),
            ..Default::default()
        }
    }

    fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    fn fail_with_detail(&self, operation: &'static str, detail: &str) {
        self.fail(operation);
        *self.detail.lock().unwrap() = Some(detail.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn chats(&self) -> Vec<ChatRequest> {
        self.chats.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.clone());
        if self.failing.lock().unwrap().contains(operation) {
            return Err(ApiError::Rejected {
                path: call,
                status: 500,
                detail: self.detail.lock().unwrap().clone(),
            });
        }
        Ok(())
    }

    fn find(&self, id: &str) -> Result<Company, ApiError> {
        self.companies
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(ApiError::Rejected {
                path: format!("/api/companies/{id}"),
                status: 404,
                detail: Some("Company not found".to_string()),
            })
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut Company)) -> Result<Company, ApiError> {
        let mut companies = self.companies.lock().unwrap();
        let company = companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ApiError::Rejected {
                path: format!("/api/companies/{id}"),
                status: 404,
                detail: None,
            })?;
        f(company);
        Ok(company.clone())
    }

    fn insert(&self, request: &CreateCompanyRequest) -> Company {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let text = |key: &str| {
            request
                .documents
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let company = Company {
            id: next.to_string(),
            name: request.company_name.clone(),
            category: request.category.clone(),
            terms_text: text("terms_text").or(Some("fetched terms".to_string())),
            cookie_text: text("cookie_text"),
            privacy_text: text("privacy_text"),
            terms_risks: Some(vec![Risk::new("Arbitration", "Class action waiver", Severity::High)]),
            ..Default::default()
        };
        self.companies.lock().unwrap().push(company.clone());
        company
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.record("list", "GET /api/companies".to_string())?;
        Ok(self.companies.lock().unwrap().clone())
    }

    async fn get_company(&self, id: &str) -> Result<Company, ApiError> {
        self.record("get", format!("GET /api/companies/{id}"))?;
        self.find(id)
    }

    async fn create_company(&self, request: &CreateCompanyRequest) -> Result<Company, ApiError> {
        self.record("create", "POST /api/companies".to_string())?;
        Ok(self.insert(request))
    }

    async fn auto_create_company(
        &self,
        request: &CreateCompanyRequest,
    ) -> Result<Company, ApiError> {
        self.record("create", "POST /api/companies/auto-create".to_string())?;
        Ok(self.insert(request))
    }

    async fn delete_company(&self, id: &str) -> Result<(), ApiError> {
        self.record("delete", format!("DELETE /api/companies/{id}"))?;
        self.companies.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn analyze(&self, id: &str, kind: PolicyKind) -> Result<Company, ApiError> {
        self.record(
            "analyze",
            format!("POST /api/companies/{id}/{}", kind.analyze_segment()),
        )?;
        self.update(id, |c| {
            let risks = Some(vec![
                Risk::new("Data sale", "Sells data to brokers", Severity::High),
                Risk::new("Retention", "Keeps data for 10 years", Severity::Medium),
            ]);
            let summary = Some("Analyzed.".to_string());
            match kind {
                PolicyKind::Terms => {
                    c.terms_risks = risks;
                    c.terms_summary = summary;
                }
                PolicyKind::Cookie => {
                    c.cookie_risks = risks;
                    c.cookie_summary = summary;
                }
                PolicyKind::Privacy => {
                    c.privacy_risks = risks;
                    c.privacy_summary = summary;
                }
            }
        })
    }

    async fn upload_document(
        &self,
        id: &str,
        kind: PolicyKind,
        input: &DocumentInput,
    ) -> Result<Company, ApiError> {
        self.record("upload", format!("POST /api/companies/{id}/{}", kind.slug()))?;
        let text = match input {
            DocumentInput::Text(text) => text.clone(),
            DocumentInput::Url(url) => format!("fetched from {url}"),
            DocumentInput::AutoFetch => String::new(),
        };
        self.update(id, |c| match kind {
            PolicyKind::Cookie => c.cookie_text = Some(text),
            PolicyKind::Privacy => c.privacy_text = Some(text),
            PolicyKind::Terms => {}
        })
    }

    async fn seed(&self, real_data: bool) -> Result<SeedReport, ApiError> {
        let path = if real_data {
            "/api/seed-with-real-data"
        } else {
            "/api/seed"
        };
        self.record("seed", format!("POST {path}"))?;
        for name in ["Facebook", "TikTok"] {
            self.insert(&CreateCompanyRequest::new(name, "social"));
        }
        Ok(SeedReport {
            companies_created: 2,
            errors: vec![serde_json::json!("Instagram: fetch timed out")],
        })
    }

    async fn analyze_all(&self) -> Result<AnalyzeAllReport, ApiError> {
        self.record("analyze_all", "POST /api/analyze-all".to_string())?;
        let count = self.companies.lock().unwrap().len();
        Ok(AnalyzeAllReport {
            companies_analyzed: count,
            errors: Vec::new(),
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.chats.lock().unwrap().push(request.clone());
        self.record("chat", "POST /api/chat".to_string())?;
        Ok(ChatReply {
            response: format!("**Answer** to {}", request.question),
            sources: Some(vec![ChatSource {
                company_id: "1".to_string(),
                company_name: "Signal".to_string(),
                policy_type: Some("privacy".to_string()),
                policy_label: Some("Privacy Policy".to_string()),
            }]),
        })
    }
}

type TestController = Controller<FakeBackend, MemorySurface, ChartJs>;

fn signal() -> Company {
    Company {
        id: "1".to_string(),
        name: "Signal".to_string(),
        category: "messaging".to_string(),
        terms_text: Some("Signal terms".to_string()),
        terms_summary: Some("Short and fair.".to_string()),
        terms_risks: Some(vec![Risk::new("Jurisdiction", "US law", Severity::Low)]),
        privacy_text: Some("Signal privacy".to_string()),
        ..Default::default()
    }
}

fn tiktok() -> Company {
    Company {
        id: "2".to_string(),
        name: "TikTok".to_string(),
        category: "social".to_string(),
        // Legacy record: only the old summary/risks pair.
        summary: Some("Collects a lot.".to_string()),
        risks: Some(vec![
            Risk::new("Biometrics", "Face data", Severity::High),
            Risk::new("Tracking", "Cross-app", Severity::Medium),
            Risk::new("Ads", "Profiling", Severity::Low),
        ]),
        terms_text: Some("TikTok terms".to_string()),
        ..Default::default()
    }
}

async fn loaded(companies: Vec<Company>) -> TestController {
    let mut controller = Controller::new(
        FakeBackend::with(companies),
        MemorySurface::new(),
        ChartJs::new(),
        Options::default(),
    );
    controller.load_companies().await.unwrap();
    controller
}

fn last_control(controller: &TestController, control: Control) -> (bool, String) {
    controller
        .surface()
        .control_history()
        .iter()
        .rev()
        .find(|(c, _, _)| *c == control)
        .map(|(_, enabled, label)| (*enabled, label.clone()))
        .unwrap()
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let mut controller = loaded(vec![signal(), tiktok()]).await;
    controller.surface_mut().answer_next_confirm(false);

    assert!(!controller.delete_company("1").await.unwrap());
    assert_eq!(
        controller.surface().confirmations(),
        ["Are you sure you want to delete Signal?"]
    );
    assert_eq!(controller.backend_calls(), ["GET /api/companies"]);
    assert_eq!(controller.state().store.len(), 2);
}

#[tokio::test]
async fn accepted_delete_sends_one_request_and_drops_the_company() {
    let mut controller = loaded(vec![signal(), tiktok()]).await;
    controller.open_company("1");
    controller.surface_mut().answer_next_confirm(true);

    assert!(controller.delete_company("1").await.unwrap());
    let deletes: Vec<_> = controller
        .backend_calls()
        .into_iter()
        .filter(|c| c.starts_with("DELETE"))
        .collect();
    assert_eq!(deletes, ["DELETE /api/companies/1"]);
    assert!(controller.state().store.get("1").is_none());
    assert!(!controller.state().modal.open);
    assert!(!controller
        .surface()
        .html(Slot::Grid)
        .unwrap()
        .contains(r#"data-company-id="1""#));
}

#[tokio::test]
async fn failed_delete_keeps_the_company_and_alerts() {
    let mut controller = loaded(vec![signal()]).await;
    controller.backend().fail("delete");
    controller.surface_mut().answer_next_confirm(true);

    assert!(controller.delete_company("1").await.is_err());
    assert!(controller.state().store.get("1").is_some());
    assert_eq!(
        controller.surface().alerts(),
        ["Error deleting company. Please try again."]
    );
    assert_eq!(last_control(&controller, Control::Delete).0, true);
}

#[tokio::test]
async fn reopening_the_modal_collapses_raw_text() {
    let mut controller = loaded(vec![signal()]).await;
    controller.open_company("1");
    controller.switch_tab(PolicyKind::Privacy);
    assert!(controller.toggle_raw_text(PolicyKind::Privacy));
    assert!(controller.surface().is_visible(Slot::RawText(PolicyKind::Privacy)));

    controller.close_modal();
    controller.open_company("1");

    assert!(!controller.state().modal.is_raw_expanded(PolicyKind::Privacy));
    assert!(!controller.surface().is_visible(Slot::RawText(PolicyKind::Privacy)));
    assert_eq!(
        last_control(&controller, Control::ViewText(PolicyKind::Privacy)),
        (true, "View Full Text".to_string())
    );
    assert!(controller.surface().is_visible(Slot::TabPane(PolicyKind::Terms)));
    assert!(!controller.surface().is_visible(Slot::TabPane(PolicyKind::Privacy)));
}

#[tokio::test]
async fn tabs_without_a_document_hide_their_actions() {
    let mut controller = loaded(vec![signal()]).await;
    controller.open_company("1");
    let surface = controller.surface();

    assert!(surface.is_visible(Slot::PolicyEmpty(PolicyKind::Cookie)));
    assert_eq!(
        surface.html(Slot::PolicyEmpty(PolicyKind::Cookie)).map(|h| h.contains("No Cookie Policy available for this company.")),
        Some(true)
    );
    assert!(!surface.control(Control::Analyze(PolicyKind::Cookie)).unwrap().visible);
    assert!(surface.control(Control::Analyze(PolicyKind::Terms)).unwrap().visible);
    assert_eq!(surface.html(Slot::TabBadge(PolicyKind::Terms)), Some("1"));
}

#[tokio::test]
async fn legacy_records_show_their_risks_under_terms() {
    let mut controller = loaded(vec![tiktok()]).await;
    controller.open_company("2");
    let risks = controller
        .surface()
        .html(Slot::RiskList(PolicyKind::Terms))
        .unwrap();
    assert!(risks.contains("Biometrics"));
    assert_eq!(
        controller.surface().html(Slot::TabBadge(PolicyKind::Terms)),
        Some("3")
    );
}

#[tokio::test]
async fn chat_history_is_capped_at_ten_entries() {
    let mut controller = loaded(vec![signal()]).await;
    for i in 1..=8 {
        assert!(controller.send_chat(&format!("q{i}")).await);
    }

    let chats = controller.backend().chats();
    let last = chats.last().unwrap();
    assert_eq!(last.question, "q8");
    assert_eq!(last.history.len(), 10);
    assert_eq!(last.history[0].content, "q3");
    assert_eq!(last.history[9].content, "**Answer** to q7");
    assert_eq!(chats[0].history.len(), 0);
}

#[tokio::test]
async fn blank_chat_questions_are_ignored() {
    let mut controller = loaded(vec![]).await;
    assert!(!controller.send_chat("   ").await);
    assert!(controller.backend().chats().is_empty());
}

#[tokio::test]
async fn chat_failure_keeps_the_question_and_explains() {
    let mut controller = loaded(vec![signal()]).await;
    controller.backend().fail("chat");

    assert!(controller.send_chat("Does Signal sell data?").await);
    let entries = controller.state().chat.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message.content, "Does Signal sell data?");
    assert!(entries[1].failed);
    assert!(entries[1]
        .message
        .content
        .starts_with("Sorry, I encountered an error: "));
    assert!(!controller.state().chat.is_typing());
    assert_eq!(last_control(&controller, Control::ChatSend), (true, "Send".to_string()));
}

#[tokio::test]
async fn chat_filter_is_sent_with_the_question() {
    let mut controller = loaded(vec![signal()]).await;
    controller.set_chat_filter(Some("1".to_string()));
    assert!(controller
        .surface()
        .html(Slot::ChatFilter)
        .unwrap()
        .contains("Signal"));

    controller.send_chat("Any arbitration clause?").await;
    assert_eq!(
        controller.backend().chats()[0].company_id.as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn source_chip_opens_the_company() {
    let mut controller = loaded(vec![signal(), tiktok()]).await;
    controller.send_chat("Who is the most private?").await;

    let transcript = controller.surface().html(Slot::ChatTranscript).unwrap();
    assert!(transcript.contains(r#"data-company-id="1""#));
    assert!(transcript.contains("Signal · Privacy Policy"));

    let calls_before = controller.backend_calls().len();
    assert!(controller.open_source("1"));
    assert_eq!(controller.state().modal.selected.as_deref(), Some("1"));
    assert!(controller.surface().is_visible(Slot::Modal));
    assert_eq!(controller.backend_calls().len(), calls_before);
}

#[tokio::test]
async fn dashboard_can_be_closed_and_reopened() {
    let mut controller = loaded(vec![signal(), tiktok()]).await;
    controller.open_dashboard();
    assert_eq!(controller.charts().live_count(), 5);
    assert_eq!(controller.state().dashboard.chart_handles().len(), 5);

    controller.close_dashboard();
    assert_eq!(controller.charts().live_count(), 0);
    assert_eq!(controller.state().dashboard, DashboardState::Closed);

    controller.open_dashboard();
    assert_eq!(controller.charts().live_count(), 5);
    assert_eq!(controller.state().dashboard.chart_handles().len(), 5);
}

#[tokio::test]
async fn open_dashboard_refreshes_after_analysis() {
    let mut controller = loaded(vec![signal(), tiktok()]).await;
    controller.open_dashboard();
    controller.analyze("1", PolicyKind::Privacy).await.unwrap();

    assert_eq!(controller.charts().live_count(), 5);
    let stats = controller.surface().html(Slot::DashboardStats).unwrap();
    assert!(stats.contains(r#"<span class="stat-value">6</span><span class="stat-label">Total Risks</span>"#));
}

#[tokio::test]
async fn empty_dashboard_draws_no_charts() {
    let mut controller = loaded(vec![]).await;
    controller.open_dashboard();
    assert_eq!(controller.charts().live_count(), 0);
    assert!(controller.surface().is_visible(Slot::DashboardEmpty));
    assert!(!controller.surface().is_visible(Slot::DashboardCharts));
}

#[tokio::test]
async fn empty_and_failed_loads_look_different() {
    let controller = loaded(vec![]).await;
    let empty = controller.surface().html(Slot::EmptyState).unwrap().to_string();
    assert!(empty.contains(grid::EMPTY_MESSAGE));

    let mut failing = Controller::new(
        FakeBackend::with(vec![]),
        MemorySurface::new(),
        ChartJs::new(),
        Options::default(),
    );
    failing.backend().fail("list");
    assert!(failing.load_companies().await.is_err());
    let failed = failing.surface().html(Slot::EmptyState).unwrap();
    assert!(failed.contains("Error loading companies. Please try again."));
    assert_ne!(empty, failed);
    assert!(!failing.surface().is_visible(Slot::Loading));
}

#[tokio::test]
async fn grid_shows_one_dot_per_risk_high_first() {
    let controller = loaded(vec![tiktok()]).await;
    let html = controller.surface().html(Slot::Grid).unwrap();
    let high = html.find("risk-dot high").unwrap();
    let medium = html.find("risk-dot medium").unwrap();
    let low = html.find("risk-dot low").unwrap();
    assert!(high < medium && medium < low);
    assert_eq!(html.matches("risk-dot").count(), 3);
}

#[tokio::test]
async fn failed_analysis_restores_the_button_and_reports_inline() {
    let mut controller = loaded(vec![signal()]).await;
    controller.open_company("1");
    controller.backend().fail("analyze");

    assert!(controller.analyze("1", PolicyKind::Terms).await.is_err());
    let history: Vec<_> = controller
        .surface()
        .control_history()
        .iter()
        .filter(|(c, _, _)| *c == Control::Analyze(PolicyKind::Terms))
        .cloned()
        .collect();
    assert_eq!(
        history,
        [
            (Control::Analyze(PolicyKind::Terms), false, "Analyzing...".to_string()),
            (Control::Analyze(PolicyKind::Terms), true, "Analyze with AI".to_string()),
        ]
    );
    let risks = controller
        .surface()
        .html(Slot::RiskList(PolicyKind::Terms))
        .unwrap();
    assert!(risks.contains("Analysis failed. Please try again."));
    assert!(!risks.contains(detail::ANALYZING_HTML));
}

#[tokio::test]
async fn successful_analysis_updates_grid_and_modal() {
    let mut controller = loaded(vec![signal()]).await;
    controller.open_company("1");

    let updated = controller.analyze("1", PolicyKind::Privacy).await.unwrap();
    assert_eq!(updated.risks(PolicyKind::Privacy).len(), 2);
    assert_eq!(
        controller.state().store.get("1").unwrap().total_risks(),
        3
    );
    assert_eq!(
        controller.surface().html(Slot::TabBadge(PolicyKind::Privacy)),
        Some("2")
    );
    assert_eq!(
        controller.surface().html(Slot::Grid).unwrap().matches("risk-dot").count(),
        3
    );
}

#[tokio::test]
async fn analysing_a_missing_document_sends_nothing() {
    let mut controller = loaded(vec![signal()]).await;
    assert!(controller.analyze("1", PolicyKind::Cookie).await.is_err());
    assert_eq!(controller.backend_calls(), ["GET /api/companies"]);
    assert_eq!(
        controller.surface().alerts(),
        ["This company has no Cookie Policy to analyze."]
    );
}

#[tokio::test]
async fn invalid_add_form_sends_nothing() {
    let mut controller = loaded(vec![]).await;
    let form = AddCompanyForm {
        name: "Acme".to_string(),
        category: "retail".to_string(),
        terms: DocumentField::url("  "),
        ..Default::default()
    };
    assert!(controller.add_company(&form).await.is_err());
    assert_eq!(controller.backend_calls(), ["GET /api/companies"]);
    assert_eq!(
        controller.surface().alerts(),
        ["Please enter the Terms & Conditions URL."]
    );
}

#[tokio::test]
async fn auto_fetch_add_uses_auto_create_and_opens_the_company() {
    let mut controller = loaded(vec![]).await;
    let form = AddCompanyForm {
        name: "Acme".to_string(),
        category: "retail".to_string(),
        terms: DocumentField::auto_fetch(),
        ..Default::default()
    };

    let company = controller.add_company(&form).await.unwrap();
    assert!(controller
        .backend_calls()
        .contains(&"POST /api/companies/auto-create".to_string()));
    assert_eq!(
        controller.surface().control_history()[0],
        (Control::AddCompany, false, "Fetching & Analyzing...".to_string())
    );
    assert_eq!(
        last_control(&controller, Control::AddCompany),
        (true, "Add & Analyze".to_string())
    );
    assert_eq!(controller.state().store.len(), 1);
    assert_eq!(controller.state().modal.selected.as_deref(), Some(company.id.as_str()));
}

#[tokio::test]
async fn failed_add_shows_backend_detail_verbatim() {
    let mut controller = loaded(vec![]).await;
    controller
        .backend()
        .fail_with_detail("create", "Could not find terms for Acme");
    let form = AddCompanyForm {
        name: "Acme".to_string(),
        category: "retail".to_string(),
        terms: DocumentField::auto_fetch(),
        ..Default::default()
    };

    assert!(controller.add_company(&form).await.is_err());
    assert_eq!(controller.surface().alerts(), ["Could not find terms for Acme"]);
    assert_ne!(controller.surface().alerts()[0], ADD_FAILED);
    assert_eq!(last_control(&controller, Control::AddCompany).0, true);
}

#[tokio::test]
async fn upload_attaches_the_policy() {
    let mut controller = loaded(vec![signal()]).await;
    controller.open_company("1");

    controller
        .upload_document("1", PolicyKind::Cookie, &DocumentField::text("We use cookies."))
        .await
        .unwrap();
    assert!(controller.state().store.get("1").unwrap().has_document(PolicyKind::Cookie));
    assert!(!controller.surface().is_visible(Slot::PolicyEmpty(PolicyKind::Cookie)));
    assert!(controller
        .backend_calls()
        .contains(&"POST /api/companies/1/cookie".to_string()));
}

#[tokio::test]
async fn seeding_reloads_and_reports_errors() {
    let mut controller = loaded(vec![]).await;
    let report = controller.seed(false).await.unwrap();

    assert_eq!(report.companies_created, 2);
    assert_eq!(controller.state().store.len(), 2);
    assert_eq!(
        controller.surface().alerts(),
        ["Created 2 companies.\n1 errors:\n- Instagram: fetch timed out"]
    );
    assert_eq!(
        last_control(&controller, Control::Seed),
        (true, "Load Sample Data".to_string())
    );
}

#[tokio::test]
async fn analyze_all_restores_its_label() {
    let mut controller = loaded(vec![signal(), tiktok()]).await;
    controller.analyze_all().await.unwrap();
    assert_eq!(controller.surface().alerts(), ["Analyzed 2 companies."]);
    assert_eq!(
        last_control(&controller, Control::AnalyzeAll),
        (true, "Analyze All".to_string())
    );
}

impl TestController {
    fn backend_calls(&self) -> Vec<String> {
        self.backend().calls()
    }
}

#[tokio::test]
async fn deleting_the_last_company_after_a_failed_reload_shows_the_empty_state() {
    let mut controller = loaded(vec![signal()]).await;
    controller.backend().fail("list");
    assert!(controller.load_companies().await.is_err());
    assert_eq!(controller.state().store.len(), 1);

    controller.surface_mut().answer_next_confirm(true);
    assert!(controller.delete_company("1").await.unwrap());

    let empty = controller.surface().html(Slot::EmptyState).unwrap();
    assert!(empty.contains(grid::EMPTY_MESSAGE));
    assert!(!empty.contains("Error loading companies"));
}
