// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form Service
//!
//! Serves `POST /api/contact` for the website: rate limits each client,
//! validates and sanitizes the submission, and forwards it by email.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file in the
//! working directory is read first if present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RESEND_API_KEY`: Email provider API key (required for delivery)
//! - `CONTACT_FROM_EMAIL`: Sender address (required for delivery)
//! - `CONTACT_TO_EMAIL`: Recipient address (required for delivery)
//! - `CONTACT_FROM_NAME`: Sender display name (default: CHKware Contact Form)
//! - `CONTACT_RATE_LIMIT_REQUESTS`: Submissions per client per window (default: 5)
//! - `CONTACT_RATE_LIMIT_WINDOW`: Window length in seconds (default: 3600)
//! - `NODE_ENV`: `production` hides diagnostic error details
//! - `METRICS_ENABLED`: Serve `/metrics` (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_form::{
    config::Config,
    handlers::{router, AppState},
    limiter::InMemoryRateLimiter,
    mailer::ResendMailer,
    metrics::SubmissionMetrics,
    validator::ContactSchema,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        environment = %config.environment,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        metrics = config.metrics.enabled,
        "Starting contact form service"
    );

    let missing = config.mail.missing();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Email delivery not configured, submissions will fail");
    }

    // Create application state
    let limiter = Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));
    let mailer = Arc::new(ResendMailer::from_config(&config.mail)?);

    let state = Arc::new(AppState {
        limiter: limiter.clone(),
        schema: ContactSchema::new(),
        mailer,
        metrics: SubmissionMetrics::new()?,
        config: config.clone(),
    });

    // Spawn cleanup task
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
