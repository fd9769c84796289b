// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact form service.
//!
//! `POST /api/contact` runs a strictly linear pipeline where each step
//! short-circuits on failure: client identification, rate limiting, body
//! parsing, schema validation, sanitization, configuration check and email
//! dispatch.

use crate::config::Config;
use crate::error::{method_not_allowed, panic_response, ContactError, ContactResponse};
use crate::limiter::{RateLimitResult, RateLimitStore};
use crate::mailer::{compose, DeliveryReceipt, EmailSender};
use crate::metrics::{Outcome, SubmissionMetrics};
use crate::validator::ContactSchema;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Key used when no client address header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Largest request body read from a client.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state.
pub struct AppState {
    pub limiter: Arc<dyn RateLimitStore>,
    pub schema: ContactSchema,
    pub mailer: Arc<dyn EmailSender>,
    pub metrics: SubmissionMetrics,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app: Router<Arc<AppState>> = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(
            "/api/contact",
            post(submit_contact).fallback(|| async { method_not_allowed() }),
        );

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-form",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Accept one contact form submission.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let client = client_key(&headers);

    match process(&state, &client, body).await {
        Ok(receipt) => {
            state.metrics.record(Outcome::Sent);
            info!(client = %client, message_id = %receipt.id, "Contact submission delivered");
            (StatusCode::OK, Json(ContactResponse::ok())).into_response()
        }
        Err(err) => {
            state.metrics.record(err.outcome());
            match &err {
                ContactError::RateLimited { .. } => {
                    info!(client = %client, "Contact submission rate limited")
                }
                ContactError::InvalidFormat(_)
                | ContactError::UnreadableBody(_)
                | ContactError::Validation(_) => {
                    debug!(client = %client, error = %err, "Contact submission rejected")
                }
                ContactError::Configuration(missing) => {
                    warn!(missing = ?missing, "Contact delivery is not configured")
                }
                ContactError::Delivery(_) => {
                    warn!(client = %client, error = %err, "Contact submission not delivered")
                }
                ContactError::Unexpected(_) => {
                    error!(client = %client, error = %err, "Contact submission failed")
                }
            }
            err.respond(state.config.expose_diagnostics())
        }
    }
}

async fn process(
    state: &AppState,
    client: &str,
    body: Body,
) -> Result<DeliveryReceipt, ContactError> {
    match state
        .limiter
        .consume(client)
        .await
        .map_err(|e| ContactError::Unexpected(e.into()))?
    {
        RateLimitResult::Allowed { remaining, .. } => {
            debug!(client, remaining, "Rate limit point consumed");
        }
        RateLimitResult::Limited { retry_after } => {
            return Err(ContactError::RateLimited { retry_after });
        }
    }

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(ContactError::UnreadableBody)?;
    let input: Value = serde_json::from_slice(&bytes).map_err(ContactError::InvalidFormat)?;

    let submission = state
        .schema
        .validate(&input)
        .map_err(ContactError::Validation)?
        .sanitize();

    let settings = state
        .config
        .mail
        .delivery()
        .ok_or_else(|| ContactError::Configuration(state.config.mail.missing()))?;

    let email = compose(&settings, &submission, Utc::now());
    let receipt = state.mailer.send(&email).await?;
    Ok(receipt)
}

/// Best-effort client identifier from proxy headers.
///
/// Uses the first `x-forwarded-for` entry, then `x-real-ip`, then
/// [`UNKNOWN_CLIENT`].
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
