// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-process application with test doubles for the collaborators.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use contact_form::{
    config::{Config, MailConfig, RateLimitConfig},
    handlers::{router, AppState},
    limiter::{InMemoryRateLimiter, LimiterError, RateLimitResult, RateLimitStore},
    mailer::{DeliveryReceipt, EmailSender, MailError, OutboundEmail},
    metrics::SubmissionMetrics,
    validator::ContactSchema,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Mail sender that records messages instead of delivering them.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    fail: bool,
}

impl RecordingMailer {
    /// A sender whose provider always rejects the message.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailError> {
        if self.fail {
            return Err(MailError::Rejected {
                status: 422,
                body: r#"{"message":"The example.com domain is not verified"}"#.to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(DeliveryReceipt {
            id: format!("msg_{}", sent.len()),
        })
    }
}

/// Mail sender that panics, standing in for an unforeseen fault.
pub struct PanickingMailer;

#[async_trait]
impl EmailSender for PanickingMailer {
    async fn send(&self, _email: &OutboundEmail) -> Result<DeliveryReceipt, MailError> {
        panic!("mail template exploded");
    }
}

/// Rate limit store whose backend is down.
pub struct UnavailableLimiter;

#[async_trait]
impl RateLimitStore for UnavailableLimiter {
    async fn consume(&self, _key: &str) -> Result<RateLimitResult, LimiterError> {
        Err(LimiterError::Unavailable("connection refused".to_string()))
    }
}

/// Configuration with every delivery variable present.
pub fn configured() -> Config {
    Config {
        mail: MailConfig {
            api_key: Some("re_test_key".to_string()),
            from_email: Some("noreply@chkware.com".to_string()),
            to_email: Some("hello@chkware.com".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Same as [`configured`] with a custom rate limit.
pub fn configured_with_limit(max_requests: u32, window_secs: u64) -> Config {
    Config {
        rate_limit: RateLimitConfig {
            max_requests,
            window_secs,
        },
        ..configured()
    }
}

/// Router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(configured())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_mailer(config, RecordingMailer::default())
    }

    pub fn with_mailer(config: Config, mailer: RecordingMailer) -> Self {
        let mailer = Arc::new(mailer);
        let limiter = Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));
        let router = build_router(config, mailer.clone(), limiter);
        Self { router, mailer }
    }

    /// POST a raw body, optionally from a given forwarded client address.
    pub async fn post(&self, ip: Option<&str>, body: &str) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/contact")
            .header("content-type", "application/json");
        if let Some(ip) = ip {
            builder = builder.header("x-forwarded-for", ip);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        send(&self.router, request).await
    }

    /// POST a JSON value.
    pub async fn post_json(&self, ip: Option<&str>, body: &Value) -> (StatusCode, HeaderMap, Value) {
        self.post(ip, &body.to_string()).await
    }

    /// Send a bodiless request with any method to any path.
    pub async fn call(&self, method: Method, uri: &str) -> (StatusCode, HeaderMap, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Build a router around arbitrary collaborators.
pub fn build_router(
    config: Config,
    mailer: Arc<dyn EmailSender>,
    limiter: Arc<dyn RateLimitStore>,
) -> Router {
    let state = Arc::new(AppState {
        limiter,
        schema: ContactSchema::new(),
        mailer,
        metrics: SubmissionMetrics::new().unwrap(),
        config,
    });
    router(state)
}

/// Drive one request through a router and decode the JSON body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// A POST request carrying a JSON body with no client headers.
pub fn contact_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
