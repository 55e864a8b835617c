use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::{ContactEmail, EmailAddress};

/// Client for a transactional email API exposing `POST /emails`.
#[derive(Debug)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: String,
    authorization_token: SecretString,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    reply_to: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// Acknowledgement from the email service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub id: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("email service responded with {status}: {message}")]
    Service { status: StatusCode, message: String },
    #[error("couldn't reach the email service, {0}")]
    Transport(#[from] reqwest::Error),
}

/// The error shapes the service is known to answer with.
#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceErrorBody {
    Flat { message: String },
    Nested { error: NestedError },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NestedError {
    Object { message: String },
    Text(String),
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: EmailAddress,
        sender_name: &str,
        authorization_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        let sender = if sender_name.trim().is_empty() {
            sender.to_string()
        } else {
            format!("{} <{}>", sender_name.trim(), sender)
        };
        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }

    /// Send `email` to `recipient`. One attempt, no retries.
    #[tracing::instrument(
        name = "Relaying email to the delivery service",
        skip(self, email),
        fields(recipient = %recipient)
    )]
    pub async fn send_email(
        &self,
        recipient: &EmailAddress,
        email: &ContactEmail,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));
        let request_body = SendEmailRequest {
            from: &self.sender,
            to: recipient.as_ref(),
            subject: &email.subject,
            html: &email.html_body,
            text: &email.plain_body,
            reply_to: &email.reply_to,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.authorization_token.expose_secret())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            // The service has accepted the email at this point, a body we
            // fail to read only costs us the receipt id.
            return Ok(receipt_from(response.text().await));
        }

        let body = response.text().await?;
        Err(DeliveryError::Service {
            status,
            message: service_error_message(status, &body),
        })
    }
}

fn receipt_from<E: std::fmt::Display>(body: Result<String, E>) -> DeliveryReceipt {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "Couldn't read the delivery acknowledgement body");
            return DeliveryReceipt { id: None };
        }
    };
    let id = serde_json::from_str::<SendEmailResponse>(&body)
        .ok()
        .and_then(|r| r.id);
    DeliveryReceipt { id }
}

/// Pull a human-readable message out of an error body, falling back to the
/// raw text.
fn service_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ServiceErrorBody>(body) {
        Ok(ServiceErrorBody::Flat { message })
        | Ok(ServiceErrorBody::Nested {
            error: NestedError::Object { message } | NestedError::Text(message),
        }) => message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.to_string(),
    }
}
