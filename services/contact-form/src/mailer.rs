// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Transactional email delivery.
//!
//! [`EmailSender`] is the seam the handler talks to; [`ResendMailer`] is the
//! production implementation backed by the Resend HTTP API.

use crate::config::{DeliverySettings, MailConfig};
use crate::validator::ValidatedSubmission;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maud::{html, DOCTYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// One message handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Provider acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeliveryReceipt {
    pub id: String,
}

/// Email delivery errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("email provider API key is not configured")]
    MissingApiKey,

    #[error("email provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Capability to deliver one email.
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailError>;
}

/// Resend API client.
pub struct ResendMailer {
    api_base: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ResendMailer {
    /// Create a client from the mail configuration.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailError> {
        let api_key = self.api_key.as_deref().ok_or(MailError::MissingApiKey)?;
        let url = format!("{}/emails", self.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let receipt: DeliveryReceipt = response.json().await?;
            debug!(id = %receipt.id, "Email accepted by provider");
            Ok(receipt)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Email provider rejected message");
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Build the notification email for a sanitized submission.
pub fn compose(
    settings: &DeliverySettings,
    submission: &ValidatedSubmission,
    received_at: DateTime<Utc>,
) -> OutboundEmail {
    OutboundEmail {
        from: settings.from.clone(),
        to: vec![settings.to.clone()],
        reply_to: submission.email.clone(),
        subject: format!("New Contact Form Submission: {}", submission.subject),
        html: render_html(submission, received_at),
        text: render_text(submission, received_at),
    }
}

fn render_html(submission: &ValidatedSubmission, received_at: DateTime<Utc>) -> String {
    let label = "padding: 8px 12px; font-weight: bold; color: #374151; vertical-align: top;";
    let value = "padding: 8px 12px; color: #111827;";

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "New Contact Form Submission" }
            }
            body style="font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #111827; max-width: 600px; margin: 0 auto; padding: 24px;" {
                h2 style="color: #1f2937; border-bottom: 2px solid #e5e7eb; padding-bottom: 8px;" {
                    "New Contact Form Submission"
                }
                table style="width: 100%; border-collapse: collapse;" {
                    tr {
                        td style=(label) { "Name:" }
                        td style=(value) { (submission.name) }
                    }
                    tr {
                        td style=(label) { "Email:" }
                        td style=(value) {
                            a href={ "mailto:" (submission.email) } { (submission.email) }
                        }
                    }
                    tr {
                        td style=(label) { "Subject:" }
                        td style=(value) { (submission.subject) }
                    }
                }
                h3 style="color: #1f2937; margin-top: 24px;" { "Message:" }
                div style="background: #f9fafb; border-left: 4px solid #3b82f6; padding: 12px 16px; white-space: pre-wrap;" {
                    (submission.message)
                }
                hr style="border: none; border-top: 1px solid #e5e7eb; margin: 24px 0;";
                p style="font-size: 12px; color: #6b7280;" {
                    "Sent from the CHKware website contact form on "
                    (received_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    ". Reply directly to this email to respond to the sender."
                }
            }
        }
    }
    .into_string()
}

fn render_text(submission: &ValidatedSubmission, received_at: DateTime<Utc>) -> String {
    format!(
        "New Contact Form Submission\n\n\
         Name: {}\n\
         Email: {}\n\
         Subject: {}\n\n\
         Message:\n{}\n\n\
         Sent from the CHKware website contact form on {}.\n",
        submission.name,
        submission.email,
        submission.subject,
        submission.message,
        received_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
