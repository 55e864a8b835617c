use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use tracing::{Instrument, Span};

use crate::{
    configuration::Environment,
    domain::{ContactEmail, Inquiry, MissingFields},
    email_client::DeliveryError,
    startup::AppState,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    message: Option<String>,
}

impl TryFrom<ContactForm> for Inquiry {
    type Error = MissingFields;

    fn try_from(value: ContactForm) -> Result<Self, Self::Error> {
        Inquiry::parse(
            value.first_name,
            value.last_name,
            value.email,
            value.phone,
            value.message,
        )
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ContactSuccess {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Diagnostic payload only ever sent to clients in development.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorDetails {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[derive(thiserror::Error, Debug)]
pub enum ContactError {
    #[error("malformed request body, {0}")]
    MalformedRequest(#[from] JsonRejection),
    #[error("invalid inquiry, {0}")]
    Validation(#[from] MissingFields),
    #[error("couldn't deliver the inquiry, {0}")]
    Delivery(#[from] DeliveryError),
    #[error("delivery task did not complete, {0}")]
    DeliveryTask(#[from] JoinError),
}

impl ContactError {
    fn status(&self) -> StatusCode {
        match self {
            ContactError::MalformedRequest(_) | ContactError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ContactError::Delivery(_) | ContactError::DeliveryTask(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn client_message(&self) -> &'static str {
        match self {
            ContactError::MalformedRequest(_) => "Invalid request body",
            ContactError::Validation(_) => "All fields are required",
            ContactError::Delivery(_) | ContactError::DeliveryTask(_) => "Failed to send message",
        }
    }

    /// Only delivery failures carry details, rejected requests never do.
    fn details(&self) -> Option<ErrorDetails> {
        match self {
            ContactError::MalformedRequest(_) | ContactError::Validation(_) => None,
            ContactError::Delivery(DeliveryError::Service { status, message }) => {
                Some(ErrorDetails {
                    kind: "delivery_service".into(),
                    message: message.clone(),
                    status: Some(status.as_u16()),
                })
            }
            ContactError::Delivery(e @ DeliveryError::Transport(_)) => Some(ErrorDetails {
                kind: "transport".into(),
                message: e.to_string(),
                status: None,
            }),
            ContactError::DeliveryTask(e) => Some(ErrorDetails {
                kind: "internal".into(),
                message: e.to_string(),
                status: None,
            }),
        }
    }
}

/// A [`ContactError`] paired with the deployment mode that decides how much
/// of it the client gets to see.
#[derive(Debug)]
pub struct ContactFailure {
    pub error: ContactError,
    pub environment: Environment,
}

impl IntoResponse for ContactFailure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(error = %self.error, "Failed to relay contact inquiry");
        } else {
            tracing::warn!(error = %self.error, "Rejected contact inquiry");
        }

        let details = if self.environment.discloses_error_details() {
            self.error.details()
        } else {
            None
        };
        let body = ErrorResponse {
            error: self.error.client_message().to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

#[tracing::instrument(
    name = "Relaying a contact inquiry",
    skip(app_state, payload)
)]
pub async fn contact(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ContactSuccess>, ContactFailure> {
    let environment = app_state.environment;
    submit_inquiry(app_state, payload)
        .await
        .map_err(|error| ContactFailure { error, environment })?;

    Ok(Json(ContactSuccess {
        success: true,
        message: "Message sent successfully".to_string(),
    }))
}

async fn submit_inquiry(
    app_state: Arc<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<(), ContactError> {
    let Json(form) = payload?;
    let inquiry: Inquiry = form.try_into()?;

    let email = ContactEmail::render(&inquiry);

    // Spawned so a client hanging up does not cancel a delivery that is
    // already in flight.
    let delivery = tokio::spawn(
        async move {
            app_state
                .email_client
                .send_email(&app_state.recipient, &email)
                .await
        }
        .instrument(Span::current()),
    );
    let receipt = delivery.await??;

    tracing::info!(receipt_id = ?receipt.id, "Contact inquiry delivered");
    Ok(())
}
