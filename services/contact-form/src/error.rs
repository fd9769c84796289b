// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission failures and their HTTP mapping.
//!
//! Every category maps to one status code and one fixed user-facing
//! message. Diagnostic detail is only attached when the deployment is not
//! production.

use crate::mailer::MailError;
use crate::metrics::Outcome;
use crate::validator::FieldError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use std::time::Duration;
use thiserror::Error;

pub const SUCCESS_MESSAGE: &str =
    "Thank you for your message! We'll get back to you within 24 hours.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid request format.";
pub const CONFIGURATION_MESSAGE: &str = "Server configuration error. Please try again later.";
pub const DELIVERY_MESSAGE: &str =
    "Failed to send message. Please try again or contact us directly.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again later.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// Uniform response body for the contact endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContactResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error,
        }
    }
}

/// Why a submission was not delivered.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("rate limit exceeded, retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("malformed request body: {0}")]
    InvalidFormat(#[source] serde_json::Error),

    #[error("unreadable request body: {0}")]
    UnreadableBody(#[source] axum::Error),

    #[error("invalid submission: {}", join_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("missing configuration: {}", .0.join(", "))]
    Configuration(Vec<&'static str>),

    #[error("delivery failed: {0}")]
    Delivery(#[from] MailError),

    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidFormat(_) | Self::UnreadableBody(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Configuration(_) | Self::Delivery(_) | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the submitter.
    pub fn public_message(&self) -> String {
        match self {
            Self::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            Self::InvalidFormat(_) | Self::UnreadableBody(_) => {
                INVALID_FORMAT_MESSAGE.to_string()
            }
            Self::Validation(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| INVALID_FORMAT_MESSAGE.to_string()),
            Self::Configuration(_) => CONFIGURATION_MESSAGE.to_string(),
            Self::Delivery(_) => DELIVERY_MESSAGE.to_string(),
            Self::Unexpected(_) => UNEXPECTED_MESSAGE.to_string(),
        }
    }

    /// Detail for non-production callers.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::RateLimited { .. } => None,
            Self::InvalidFormat(err) => Some(err.to_string()),
            Self::UnreadableBody(err) => Some(err.to_string()),
            Self::Validation(errors) => Some(join_errors(errors)),
            Self::Configuration(missing) => Some(format!("missing {}", missing.join(", "))),
            Self::Delivery(err) => Some(err.to_string()),
            Self::Unexpected(err) => Some(format!("{err:#}")),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::RateLimited { .. } => Outcome::RateLimited,
            Self::InvalidFormat(_) | Self::UnreadableBody(_) => Outcome::InvalidFormat,
            Self::Validation(_) => Outcome::Invalid,
            Self::Configuration(_) => Outcome::Misconfigured,
            Self::Delivery(_) => Outcome::DeliveryFailed,
            Self::Unexpected(_) => Outcome::Unexpected,
        }
    }

    /// Convert into the uniform JSON response.
    pub fn respond(self, expose_diagnostics: bool) -> Response {
        let status = self.status();
        let error = expose_diagnostics.then(|| self.diagnostic()).flatten();
        let body = Json(ContactResponse::failure(self.public_message(), error));

        match self {
            Self::RateLimited { retry_after } => (
                status,
                [(header::RETRY_AFTER, retry_after.as_secs().max(1).to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        self.respond(false)
    }
}

/// Response for any non-POST request to the contact endpoint.
pub fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ContactResponse::failure(METHOD_NOT_ALLOWED_MESSAGE, None)),
    )
        .into_response()
}

/// Response for a panic caught while handling a request.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ContactResponse::failure(UNEXPECTED_MESSAGE, None)),
    )
        .into_response()
}
