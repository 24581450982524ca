use tracing::{debug, warn};

use crate::client::{ApiError, Backend};
use crate::model::Company;

pub const LOAD_FAILED_MESSAGE: &str = "Error loading companies. Please try again.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loaded,
    Failed(String),
}

#[derive(Clone, Debug, Default)]
pub struct CompanyStore {
    companies: Vec<Company>,
    status: LoadStatus,
}

impl CompanyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_companies(companies: Vec<Company>) -> Self {
        Self {
            companies,
            status: LoadStatus::Loaded,
        }
    }

    pub async fn load<B>(&mut self, backend: &B) -> Result<usize, ApiError>
    where
        B: Backend + ?Sized,
    {
        match backend.list_companies().await {
            Ok(companies) => {
                debug!(count = companies.len(), "company list loaded");
                self.replace(companies);
                Ok(self.companies.len())
            }
            Err(e) => {
                warn!(error = %e, "keeping last loaded company list");
                self.mark_failed(&e.user_message(LOAD_FAILED_MESSAGE));
                Err(e)
            }
        }
    }

    pub fn replace(&mut self, companies: Vec<Company>) {
        self.companies = companies;
        self.status = LoadStatus::Loaded;
    }

    pub(crate) fn mark_failed(&mut self, message: &str) {
        self.status = LoadStatus::Failed(message.to_string());
    }

    // Unknown ids are ignored; inserts need a reload.
    pub fn upsert(&mut self, record: Company) -> bool {
        match self.companies.iter_mut().find(|c| c.id == record.id) {
            Some(slot) => {
                *slot = record;
                self.clear_failure();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Company> {
        let index = self.companies.iter().position(|c| c.id == id)?;
        self.clear_failure();
        Some(self.companies.remove(index))
    }

    // A confirmed write supersedes an earlier failed reload.
    fn clear_failure(&mut self) {
        if matches!(self.status, LoadStatus::Failed(_)) {
            self.status = LoadStatus::Loaded;
        }
    }

    pub fn get(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}
