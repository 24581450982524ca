use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{ChatMessage, ChatSource, PolicyKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentInput {
    Text(String),
    Url(String),
    AutoFetch,
}

impl DocumentInput {
    pub fn write_into(&self, kind: PolicyKind, body: &mut Map<String, Value>) {
        match self {
            Self::Text(text) => {
                body.insert(format!("{}_text", kind.slug()), Value::String(text.clone()));
            }
            Self::Url(url) => {
                body.insert(format!("{}_url", kind.slug()), Value::String(url.clone()));
            }
            Self::AutoFetch => {
                body.insert("auto_fetch".to_string(), Value::Bool(true));
            }
        }
    }

    pub fn is_auto_fetch(&self) -> bool {
        matches!(self, Self::AutoFetch)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateCompanyRequest {
    pub company_name: String,
    pub category: String,
    #[serde(flatten)]
    pub documents: Map<String, Value>,
}

impl CreateCompanyRequest {
    pub fn new(company_name: &str, category: &str) -> Self {
        Self {
            company_name: company_name.to_string(),
            category: category.to_string(),
            documents: Map::new(),
        }
    }

    pub fn with_document(mut self, kind: PolicyKind, input: &DocumentInput) -> Self {
        input.write_into(kind, &mut self.documents);
        self
    }

    pub fn is_auto_fetch(&self) -> bool {
        self.documents
            .get("auto_fetch")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SeedReport {
    #[serde(default)]
    pub companies_created: usize,
    #[serde(default)]
    pub errors: Vec<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AnalyzeAllReport {
    #[serde(default)]
    pub companies_analyzed: usize,
    #[serde(default)]
    pub errors: Vec<Value>,
}

pub fn error_lines(errors: &[Value]) -> Vec<String> {
    errors
        .iter()
        .map(|e| match e {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub history: Vec<ChatMessage>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub sources: Option<Vec<ChatSource>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

pub fn parse_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}
