// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse simulation patterns for security testing.

/// What each simulated request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Well-formed, valid submissions
    Valid,
    /// Bodies that are not JSON
    Malformed,
    /// JSON that fails schema validation
    Invalid,
    /// Valid submissions stuffed with markup
    Injection,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique client addresses to simulate
    pub unique_ips: usize,
    /// Whether requests carry a client address header at all
    pub send_client_header: bool,
    /// Request contents
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 50,
            unique_ips: 1,
            send_client_header: true,
            payload: Payload::Valid,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single IP flood - one client hammering the form.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 60,
            ..Default::default()
        }
    }

    /// Distributed spam - many clients, a few messages each.
    pub fn distributed_spam() -> Self {
        Self {
            total_requests: 200,
            unique_ips: 20,
            ..Default::default()
        }
    }

    /// Garbage flood - non-JSON bodies from one client.
    pub fn garbage_flood() -> Self {
        Self {
            total_requests: 30,
            payload: Payload::Malformed,
            ..Default::default()
        }
    }

    /// Schema probing - invalid submissions from rotating clients.
    pub fn schema_probe() -> Self {
        Self {
            total_requests: 27,
            unique_ips: 27,
            payload: Payload::Invalid,
            ..Default::default()
        }
    }

    /// Markup injection campaign from rotating clients.
    pub fn injection_campaign() -> Self {
        Self {
            total_requests: 21,
            unique_ips: 21,
            payload: Payload::Injection,
            ..Default::default()
        }
    }

    /// Headerless flood - clients that hide behind no proxy headers.
    pub fn headerless_flood() -> Self {
        Self {
            total_requests: 20,
            unique_ips: 20,
            send_client_header: false,
            ..Default::default()
        }
    }

    /// Number of client buckets the requests actually land in.
    pub fn effective_clients(&self) -> usize {
        if self.send_client_header {
            self.unique_ips.min(self.total_requests).max(1)
        } else {
            1
        }
    }

    /// Upper bound on requests that can pass the rate limiter.
    pub fn max_admitted(&self, capacity: u32) -> usize {
        (self.effective_clients() * capacity as usize).min(self.total_requests)
    }
}
