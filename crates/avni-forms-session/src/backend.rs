//! The Avni server as seen by the form designer
//!
//! [`FormsBackend`] is the seam the session talks through. [`HttpFormsBackend`]
//! is the implementation used against a real server.

use crate::ClientConfig;
use async_trait::async_trait;
use avni_forms_diagnostics::{AVF0300, AVF0301, AVF0302, ErrorCode, FormsError};
use indexmap::IndexMap;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Header the server reads the user's token from
pub const AUTH_TOKEN_HEADER: &str = "AUTH-TOKEN";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response; `body` is the raw response text
    #[error("server responded with status {status}")]
    Server { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Network(_) => AVF0300,
            Self::Server { .. } => AVF0301,
            Self::Decode(_) => AVF0302,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn to_forms_error(&self) -> FormsError {
        let message = match self {
            Self::Server { status, body } if !body.is_empty() => {
                format!("server responded with status {}: {}", status, body)
            }
            _ => self.to_string(),
        };
        FormsError::backend(self.code(), message, self.status())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// An identifier source a form element can draw ids from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentifierSource {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTypeSummary {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    /// Whether subjects of this type are groups of other subjects
    #[serde(default)]
    pub group: Option<bool>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterTypeSummary {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Subject types, encounter types and the rest of the organisation setup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalModules {
    #[serde(default)]
    pub subject_types: Vec<SubjectTypeSummary>,
    #[serde(default)]
    pub encounter_types: Vec<EncounterTypeSummary>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl OperationalModules {
    pub fn group_subject_types(&self) -> Vec<SubjectTypeSummary> {
        self.subject_types
            .iter()
            .filter(|st| st.group == Some(true))
            .cloned()
            .collect()
    }
}

/// Server operations the form designer needs
#[async_trait]
pub trait FormsBackend: Send + Sync {
    /// The form with the given uuid, as exported by the server
    async fn fetch_form(&self, uuid: &str) -> Result<Value, BackendError>;

    /// Create or update a form
    async fn save_form(&self, form: &Value) -> Result<(), BackendError>;

    async fn identifier_sources(&self) -> Result<Vec<IdentifierSource>, BackendError>;

    async fn operational_modules(&self) -> Result<OperationalModules, BackendError>;
}

/// [`FormsBackend`] over the server's REST endpoints
#[derive(Debug, Clone)]
pub struct HttpFormsBackend {
    base_url: String,
    auth_token: Option<String>,
    client: Client,
}

impl HttpFormsBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
            client: Client::new(),
        }
    }

    /// Backend for the configured server, honouring its timeout and token
    pub fn from_config(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            auth_token: config.auth_token.clone(),
            ..Self::new(config.server_url.clone())
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header(AUTH_TOKEN_HEADER, token),
            None => request,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        debug!("GET {}{}", self.base_url, path);
        self.authorized(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        debug!("POST {}{}", self.base_url, path);
        self.authorized(self.client.post(format!("{}{}", self.base_url, path)))
    }
}

/// Turn a non-2xx response into [`BackendError::Server`] carrying its body
async fn success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Server {
        status: status.as_u16(),
        body,
    })
}

async fn json(response: Response) -> Result<Value, BackendError> {
    let response = success(response).await?;
    Ok(response.json().await?)
}

#[async_trait]
impl FormsBackend for HttpFormsBackend {
    async fn fetch_form(&self, uuid: &str) -> Result<Value, BackendError> {
        let response = self
            .get("/forms/export")
            .query(&[("formUUID", uuid)])
            .send()
            .await?;
        json(response).await
    }

    async fn save_form(&self, form: &Value) -> Result<(), BackendError> {
        let response = self.post("/forms").json(form).send().await?;
        success(response).await?;
        Ok(())
    }

    async fn identifier_sources(&self) -> Result<Vec<IdentifierSource>, BackendError> {
        let body = json(self.get("/web/identifierSource").send().await?).await?;
        match body.pointer("/_embedded/identifierSource") {
            Some(sources) => serde_json::from_value(sources.clone())
                .map_err(|e| BackendError::Decode(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    async fn operational_modules(&self) -> Result<OperationalModules, BackendError> {
        let body = json(self.get("/web/operationalModules/").send().await?).await?;
        serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}
