// https://resend.com/docs/api-reference/emails/send-email

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone)]
pub struct ResendOptions {
    pub api_key: String,
    pub base_url: String,
}

impl ResendOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Plain-text email to one or more recipients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendEmailRequest {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendEmailResponse {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum ResendError {
    #[error("Error sending email: {0}")]
    Network(String),

    #[error("Failed to send email: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Error parsing Resend response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone)]
pub struct ResendService {
    options: ResendOptions,
    client: Client,
}

impl ResendService {
    pub fn new(options: ResendOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    pub async fn send_email(
        &self,
        request: &SendEmailRequest,
    ) -> Result<SendEmailResponse, ResendError> {
        let url = format!("{}/emails", self.options.base_url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.options.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Request to Resend failed");
                ResendError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Resend returned an error");
            return Err(ResendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let sent = response
            .json::<SendEmailResponse>()
            .await
            .map_err(|e| ResendError::Parse(e.to_string()))?;
        debug!(email_id = %sent.id, recipients = request.to.len(), "Email accepted by Resend");
        Ok(sent)
    }
}
