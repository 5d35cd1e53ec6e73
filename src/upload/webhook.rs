use crate::config::WebhookTargets;
use crate::upload::form::Submission;
use crate::upload::payload::WebhookPayload;
use crate::upload::types::Environment;
use crate::utils::file_size::FileSizeUtils;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Webhook responded with HTTP {0}")]
    Status(StatusCode),
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to build request: {0}")]
    Request(String),
    #[error("Upload worker failed: {0}")]
    Worker(String),
}

impl TransferError {
    pub fn is_network(&self) -> bool {
        matches!(self, TransferError::Network(_))
    }
}

/// A webhook call that came back with a 2xx status.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub environment: Environment,
    pub url: String,
    pub status: StatusCode,
}

#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Send the payload as one multipart POST and return the response status.
    async fn post(&self, url: &str, payload: WebhookPayload) -> Result<StatusCode, TransferError>;
}

#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post(&self, url: &str, payload: WebhookPayload) -> Result<StatusCode, TransferError> {
        let form = payload
            .into_form()
            .map_err(|e| TransferError::Request(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        Ok(response.status())
    }
}

pub struct WebhookClient<T> {
    transport: T,
    targets: WebhookTargets,
}

impl<T: WebhookTransport> WebhookClient<T> {
    pub fn new(transport: T, targets: WebhookTargets) -> Self {
        Self { transport, targets }
    }

    pub fn targets(&self) -> &WebhookTargets {
        &self.targets
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue exactly one POST for an already validated submission.
    pub async fn deliver(&self, submission: Submission) -> Result<Delivery, TransferError> {
        let environment = submission.environment;
        let url = self.targets.url_for(environment).to_string();

        info!(
            "Sending '{}' ({}) to {} webhook at {}",
            submission.file.name,
            FileSizeUtils::format_size(submission.file.size()),
            environment.label(),
            url
        );

        let payload = WebhookPayload::new(submission, Utc::now());
        let result = self.transport.post(&url, payload).await;

        match result {
            Ok(status) if status.is_success() => {
                info!("Webhook accepted upload with status {}", status);
                Ok(Delivery {
                    environment,
                    url,
                    status,
                })
            }
            Ok(status) => {
                error!("Webhook rejected upload with status {}", status);
                Err(TransferError::Status(status))
            }
            Err(e) => {
                error!("Upload to {} failed: {}", url, e);
                Err(e)
            }
        }
    }
}
