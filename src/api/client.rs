//! Document store HTTP client
//!
//! Thin request/response wrapper over the document store. Unlike the
//! realtime transport it retries: transport failures and 5xx responses are
//! retried with exponential backoff plus jitter, up to the configured number
//! of retries. 4xx responses are returned straight away.

use crate::api::types::{CommentList, DocumentRecord, NewDocument};
use crate::offline::RetryPolicy;
use crate::shared::{AppConfig, Comment, DocumentId};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by `DocumentApi`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status for `Status` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the document store
#[derive(Debug, Clone)]
pub struct DocumentApi {
    client: Client,
    base: Url,
    retry: RetryPolicy,
}

impl DocumentApi {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let base = config
            .api_url()
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base,
            retry: config.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Every stored document
    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        let url = self.endpoint("conversations/")?;
        self.get_json(url).await
    }

    pub async fn get_document(&self, id: &DocumentId) -> Result<DocumentRecord, ApiError> {
        let url = self.endpoint(&format!("conversations/{}/", id))?;
        self.get_json(url).await
    }

    /// Create a document and return its id
    pub async fn create_document(&self, document: &NewDocument) -> Result<DocumentId, ApiError> {
        let url = self.endpoint("conversations/")?;
        let response = self
            .send_with_retry(|| self.client.post(url.clone()).json(document))
            .await?;
        let body: Value = decode(response).await?;
        created_id(&body)
    }

    /// Store `content` as a new shared document
    pub async fn share_document(
        &self,
        content: Value,
        title: Option<String>,
    ) -> Result<DocumentId, ApiError> {
        self.create_document(&NewDocument::shared(content, title)).await
    }

    /// Comments on a document, oldest first
    pub async fn fetch_comments(&self, id: &DocumentId) -> Result<Vec<Comment>, ApiError> {
        let url = self.endpoint(&format!("documents/{}/comments/", id))?;
        let list: CommentList = self.get_json(url).await?;
        Ok(list.into_vec())
    }

    /// Content of one saved version
    pub async fn get_version_content(
        &self,
        id: &DocumentId,
        version_number: u32,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&format!(
            "conversations/{}/versions/{}/content/",
            id, version_number
        ))?;
        let mut body: Value = self.get_json(url).await?;
        if let Some(content) = body.get_mut("content") {
            return Ok(content.take());
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self
            .send_with_retry(|| self.client.get(url.clone()))
            .await?;
        decode(response).await
    }

    async fn send_with_retry<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        loop {
            let failure = match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let url = response.url().clone();
                    let body = response.text().await.unwrap_or_default();
                    if !status.is_server_error() || !self.retry.should_retry(retries) {
                        return Err(ApiError::Status {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    format!("{} returned {}", url, status)
                }
                Err(e) => {
                    if e.is_builder() || !self.retry.should_retry(retries) {
                        return Err(e.into());
                    }
                    e.to_string()
                }
            };

            retries += 1;
            let delay = self.retry.delay_for(retries);
            tracing::warn!(
                "[Api] {}; retry {}/{} in {:?}",
                failure,
                retries,
                self.retry.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

fn created_id(body: &Value) -> Result<DocumentId, ApiError> {
    ["_id", "id", "document_id"]
        .iter()
        .find_map(|key| match body.get(*key) {
            Some(Value::String(id)) => DocumentId::parse(id),
            Some(Value::Number(id)) => DocumentId::parse(&id.to_string()),
            _ => None,
        })
        .ok_or_else(|| ApiError::Decode(format!("no document id in {}", body)))
}
