// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for submission outcomes.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Final outcome of one submission, used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    RateLimited,
    InvalidFormat,
    Invalid,
    Misconfigured,
    DeliveryFailed,
    Unexpected,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::Sent,
        Outcome::RateLimited,
        Outcome::InvalidFormat,
        Outcome::Invalid,
        Outcome::Misconfigured,
        Outcome::DeliveryFailed,
        Outcome::Unexpected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Sent => "sent",
            Outcome::RateLimited => "rate_limited",
            Outcome::InvalidFormat => "invalid_format",
            Outcome::Invalid => "invalid",
            Outcome::Misconfigured => "misconfigured",
            Outcome::DeliveryFailed => "delivery_failed",
            Outcome::Unexpected => "unexpected",
        }
    }
}

/// Registry holding the service's counters.
pub struct SubmissionMetrics {
    registry: Registry,
    submissions: IntCounterVec,
}

impl SubmissionMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_submissions_total",
                "Contact form submissions by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        // Pre-create every series so dashboards see zeros instead of gaps
        for outcome in Outcome::ALL {
            submissions.with_label_values(&[outcome.as_str()]);
        }

        Ok(Self {
            registry,
            submissions,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.submissions
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.submissions.with_label_values(&[outcome.as_str()]).get()
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
