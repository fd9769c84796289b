// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form Service
//!
//! This crate implements the website's contact form endpoint:
//!
//! - Per-client fixed-window rate limiting (5 submissions per hour default)
//! - Schema validation of the JSON body with field-specific messages
//! - Script and HTML tag stripping of free-text fields
//! - Delivery through a transactional email provider (Resend)
//! - Uniform `{success, message, error?}` JSON responses

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod sanitize;
pub mod validator;

pub use config::Config;
pub use error::{ContactError, ContactResponse};
pub use limiter::{InMemoryRateLimiter, RateLimitResult, RateLimitStore};
pub use mailer::{EmailSender, OutboundEmail, ResendMailer};
pub use validator::{ContactSchema, FieldError, ValidatedSubmission};
