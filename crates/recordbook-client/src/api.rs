//! HTTP client for the recordbook API.
//!
//! Every call returns a typed result; non-2xx responses are decoded from the
//! server's JSON error body into a [`ClientError`] so callers can tell
//! validation and conflict failures apart from everything else.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use recordbook_shared::{
    CountResponse, ErrorBody, ErrorKind, FieldError, ListQuery, NewRecord, Record, RecordPage,
    RecordPatch,
};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the input; one entry per failed field.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The email is already used by another record.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Any other non-2xx response.
    #[error("Server responded {status}: {message}")]
    Server { status: u16, message: String },

    /// Connection, timeout or body decoding failure.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<RecordPage> {
        let resp = self.http.get(self.url("/records")).query(query).send().await?;
        decode(resp).await
    }

    pub async fn create(&self, input: &NewRecord) -> Result<Record> {
        let resp = self.http.post(self.url("/records")).json(input).send().await?;
        decode(resp).await
    }

    pub async fn get(&self, id: i64) -> Result<Record> {
        let resp = self.http.get(self.url(&format!("/records/{id}"))).send().await?;
        decode(resp).await
    }

    pub async fn update(&self, id: i64, patch: &RecordPatch) -> Result<Record> {
        let resp = self
            .http
            .patch(self.url(&format!("/records/{id}")))
            .json(patch)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/records/{id}")))
            .send()
            .await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(error_from(resp).await)
    }

    pub async fn count(&self) -> Result<u64> {
        let resp = self.http.get(self.url("/records/count")).send().await?;
        let body: CountResponse = decode(resp).await?;
        Ok(body.total)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    if resp.status().is_success() {
        return Ok(resp.json().await?);
    }
    Err(error_from(resp).await)
}

async fn error_from(resp: Response) -> ClientError {
    let status = resp.status();
    let text = match resp.text().await {
        Ok(text) => text,
        Err(e) => return ClientError::Http(e),
    };
    classify(status, &text)
}

/// Map a status code and raw error body onto [`ClientError`].
fn classify(status: StatusCode, text: &str) -> ClientError {
    let Ok(body) = serde_json::from_str::<ErrorBody>(text) else {
        return ClientError::Server {
            status: status.as_u16(),
            message: if text.is_empty() {
                status.to_string()
            } else {
                text.to_string()
            },
        };
    };

    match body.kind {
        ErrorKind::Validation => {
            let fields = if body.fields.is_empty() {
                vec![FieldError::new("body", body.error)]
            } else {
                body.fields
            };
            ClientError::Validation(fields)
        }
        ErrorKind::Conflict => ClientError::Conflict(body.error),
        ErrorKind::NotFound => ClientError::NotFound(body.error),
        ErrorKind::BadRequest | ErrorKind::Internal => ClientError::Server {
            status: status.as_u16(),
            message: body.error,
        },
    }
}
