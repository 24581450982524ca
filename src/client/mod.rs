pub mod wire;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::model::{Company, PolicyKind};
pub use wire::{
    AnalyzeAllReport, ChatReply, ChatRequest, CreateCompanyRequest, DocumentInput, SeedReport,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("{path} returned HTTP {status}{}", detail_suffix(.detail))]
    Rejected {
        path: String,
        status: u16,
        detail: Option<String>,
    },

    #[error("{operation} is not supported for the {kind} policy")]
    Unsupported {
        operation: &'static str,
        kind: PolicyKind,
    },

    #[error("failed to encode request body: {message}")]
    Encode { message: String },

    #[error("invalid API url: {url}")]
    InvalidBaseUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ApiError {
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_companies(&self) -> Result<Vec<Company>, ApiError>;
    async fn get_company(&self, id: &str) -> Result<Company, ApiError>;
    async fn create_company(&self, request: &CreateCompanyRequest) -> Result<Company, ApiError>;
    async fn auto_create_company(
        &self,
        request: &CreateCompanyRequest,
    ) -> Result<Company, ApiError>;
    async fn delete_company(&self, id: &str) -> Result<(), ApiError>;
    async fn analyze(&self, id: &str, kind: PolicyKind) -> Result<Company, ApiError>;
    async fn upload_document(
        &self,
        id: &str,
        kind: PolicyKind,
        input: &DocumentInput,
    ) -> Result<Company, ApiError>;
    async fn seed(&self, real_data: bool) -> Result<SeedReport, ApiError>;
    async fn analyze_all(&self) -> Result<AnalyzeAllReport, ApiError>;
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;
}

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub api_url: String,
    // `None` leaves requests unbounded.
    pub timeout_seconds: Option<u64>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpBackend {
    pub fn new(options: &ClientOptions) -> Result<Self, ApiError> {
        let base_url =
            reqwest::Url::parse(options.api_url.trim()).map_err(|_| ApiError::InvalidBaseUrl {
                url: options.api_url.clone(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: options.api_url.clone(),
            });
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "termslens/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(seconds) = options.timeout_seconds.filter(|s| *s > 0) {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::HttpClientBuild { source: e })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<(String, reqwest::Response), ApiError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        debug!(%method, %path, "sending request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| ApiError::Network {
            path: path.clone(),
            source: e,
        })?;
        Ok((path, response))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        segments: &[&str],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let (path, response) = self.send(method, segments, body).await?;
        read_json(&path, response).await
    }
}

fn json_body<T: Serialize>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode {
        message: e.to_string(),
    })
}

async fn read_body(path: &str, response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| ApiError::Network {
        path: path.to_string(),
        source: e,
    })?;
    if !status.is_success() {
        return Err(ApiError::Rejected {
            path: path.to_string(),
            status: status.as_u16(),
            detail: wire::parse_detail(&body),
        });
    }
    Ok(body)
}

async fn read_json<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let body = read_body(path, response).await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn upload_body(kind: PolicyKind, input: &DocumentInput) -> Map<String, Value> {
    let mut body = Map::new();
    input.write_into(kind, &mut body);
    body
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.send_json(reqwest::Method::GET, &["api", "companies"], None)
            .await
    }

    async fn get_company(&self, id: &str) -> Result<Company, ApiError> {
        self.send_json(reqwest::Method::GET, &["api", "companies", id], None)
            .await
    }

    async fn create_company(&self, request: &CreateCompanyRequest) -> Result<Company, ApiError> {
        self.send_json(reqwest::Method::POST, &["api", "companies"], Some(json_body(request)?))
            .await
    }

    async fn auto_create_company(
        &self,
        request: &CreateCompanyRequest,
    ) -> Result<Company, ApiError> {
        self.send_json(
            reqwest::Method::POST,
            &["api", "companies", "auto-create"],
            Some(json_body(request)?),
        )
        .await
    }

    async fn delete_company(&self, id: &str) -> Result<(), ApiError> {
        let (path, response) = self
            .send(reqwest::Method::DELETE, &["api", "companies", id], None)
            .await?;
        read_body(&path, response).await.map(|_| ())
    }

    async fn analyze(&self, id: &str, kind: PolicyKind) -> Result<Company, ApiError> {
        self.send_json(
            reqwest::Method::POST,
            &["api", "companies", id, kind.analyze_segment()],
            None,
        )
        .await
    }

    async fn upload_document(
        &self,
        id: &str,
        kind: PolicyKind,
        input: &DocumentInput,
    ) -> Result<Company, ApiError> {
        let segment = kind.upload_segment().ok_or(ApiError::Unsupported {
            operation: "document upload",
            kind,
        })?;
        if input.is_auto_fetch() {
            return Err(ApiError::Unsupported {
                operation: "auto-fetch upload",
                kind,
            });
        }
        let body = Value::Object(upload_body(kind, input));
        self.send_json(
            reqwest::Method::POST,
            &["api", "companies", id, segment],
            Some(body),
        )
        .await
    }

    async fn seed(&self, real_data: bool) -> Result<SeedReport, ApiError> {
        let route = if real_data {
            "seed-with-real-data"
        } else {
            "seed"
        };
        self.send_json(reqwest::Method::POST, &["api", route], None)
            .await
    }

    async fn analyze_all(&self) -> Result<AnalyzeAllReport, ApiError> {
        self.send_json(reqwest::Method::POST, &["api", "analyze-all"], None)
            .await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.send_json(reqwest::Method::POST, &["api", "chat"], Some(json_body(request)?))
            .await
    }
}
