// Persistence gateway: load/save the application state as one JSON document.
//
// The remote endpoint is a dumb blob host: GET returns the stored document
// (or `{}` when nothing has been saved), POST of the full document replies
// `{"status": "success"}` or `{"error": "..."}`. Interpretation of the
// document's contents belongs to `ApplicationState::from_document`.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::roster::state::ApplicationState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("state store returned HTTP {status}")]
    Status { status: u16 },

    #[error("state store rejected the document: {message}")]
    Rejected { message: String },

    #[error("state store returned an unreadable document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Load/save of the full application state document.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the stored document. An empty store yields `{}`.
    async fn load(&self) -> Result<Value, StoreError>;

    /// Overwrite the stored document with the full state.
    async fn save(&self, state: &ApplicationState) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Store client for the spreadsheet-backed web endpoint.
pub struct HttpStateStore {
    http: reqwest::Client,
    url: String,
}

impl HttpStateStore {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for the state store")?;
        Ok(Self { http, url })
    }
}

#[async_trait]
impl StateStore for HttpStateStore {
    async fn load(&self) -> Result<Value, StoreError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        debug!("Loaded state document ({} bytes)", body.len());
        Ok(serde_json::from_str(&body)?)
    }

    async fn save(&self, state: &ApplicationState) -> Result<(), StoreError> {
        let response = self.http.post(&self.url).json(state).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
            });
        }
        let body: Value = response.json().await?;
        interpret_save_response(&body)
    }
}

/// Raw shape of the endpoint's save reply.
#[derive(Debug, Deserialize)]
struct SaveResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// The endpoint reports failures in a 200 body, so the reply has to be
/// inspected rather than trusting the HTTP status alone.
fn interpret_save_response(body: &Value) -> Result<(), StoreError> {
    let reply: SaveResponse = serde_json::from_value(body.clone())?;
    if let Some(message) = reply.error {
        return Err(StoreError::Rejected { message });
    }
    match reply.status.as_deref() {
        Some("success") | None => Ok(()),
        Some(other) => Err(StoreError::Rejected {
            message: format!("unexpected status `{other}`"),
        }),
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// Store that keeps the document in memory. Used by tests and when no
/// remote endpoint is configured; state does not survive a restart.
#[derive(Default)]
pub struct MemoryStateStore {
    document: Mutex<Option<Value>>,
    fail_saves: Mutex<bool>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the stored document.
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            fail_saves: Mutex::new(false),
        }
    }

    /// Make subsequent saves fail, for exercising the persistence-error path.
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock().expect("store mutex poisoned") = fail;
    }

    /// The last saved document, if any.
    pub fn document(&self) -> Option<Value> {
        self.document.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Value, StoreError> {
        Ok(self
            .document
            .lock()
            .expect("store mutex poisoned")
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    async fn save(&self, state: &ApplicationState) -> Result<(), StoreError> {
        if *self.fail_saves.lock().expect("store mutex poisoned") {
            return Err(StoreError::Rejected {
                message: "simulated save failure".to_string(),
            });
        }
        let document = serde_json::to_value(state)?;
        *self.document.lock().expect("store mutex poisoned") = Some(document);
        Ok(())
    }
}
