// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for abuse simulation results.

use axum::http::StatusCode;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Collects metrics during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Start time of the attack
    start_time: Option<Instant>,
    /// End time of the attack
    end_time: Option<Instant>,
    /// Count of requests by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of requests by client key
    requests_per_client: HashMap<String, usize>,
    /// Deliveries by client key
    delivered_per_client: HashMap<String, usize>,
    /// Latency samples (microseconds)
    latencies: Vec<u64>,
}

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Delivered,
    RateLimited,
    Rejected,
    ServerError,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Outcome::Delivered,
            StatusCode::TOO_MANY_REQUESTS => Outcome::RateLimited,
            s if s.is_client_error() => Outcome::Rejected,
            _ => Outcome::ServerError,
        }
    }
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of an attack.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Mark the end of an attack.
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record a request outcome.
    pub fn record(&mut self, outcome: Outcome, client: &str, latency: Duration) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
        if outcome == Outcome::Delivered {
            *self.delivered_per_client.entry(client.to_string()).or_insert(0) += 1;
        }
        self.latencies.push(latency.as_micros() as u64);
    }

    /// Get total request count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Get duration of the attack.
    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Get block rate (ratio of not-delivered to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        let delivered = self.count(Outcome::Delivered);
        (total - delivered) as f64 / total as f64
    }

    /// Get median latency in microseconds.
    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    /// Get number of unique clients that made requests.
    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    /// Most messages any single client got through.
    pub fn max_delivered_per_client(&self) -> usize {
        self.delivered_per_client.values().copied().max().unwrap_or(0)
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            delivered: self.count(Outcome::Delivered),
            rate_limited: self.count(Outcome::RateLimited),
            rejected: self.count(Outcome::Rejected),
            server_errors: self.count(Outcome::ServerError),
            duration_ms: self.duration().as_millis() as u64,
            block_rate: self.block_rate(),
            median_latency_us: self.median_latency_us(),
            unique_clients: self.unique_clients(),
            max_delivered_per_client: self.max_delivered_per_client(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub delivered: usize,
    pub rate_limited: usize,
    pub rejected: usize,
    pub server_errors: usize,
    pub duration_ms: u64,
    pub block_rate: f64,
    pub median_latency_us: u64,
    pub unique_clients: usize,
    pub max_delivered_per_client: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration_ms)?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Delivered:         {}", self.delivered)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Rejected (4xx):    {}", self.rejected)?;
        writeln!(f, "Server Errors:     {}", self.server_errors)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "Median latency:    {} us", self.median_latency_us)?;
        writeln!(f, "Unique clients:    {}", self.unique_clients)?;
        writeln!(f, "Max per client:    {}", self.max_delivered_per_client)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();
        metrics.start();

        metrics.record(Outcome::Delivered, "10.0.0.1", Duration::from_micros(100));
        metrics.record(Outcome::Delivered, "10.0.0.2", Duration::from_micros(150));
        metrics.record(Outcome::RateLimited, "10.0.0.1", Duration::from_micros(50));

        metrics.finish();

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.count(Outcome::Delivered), 2);
        assert_eq!(metrics.count(Outcome::RateLimited), 1);
        assert_eq!(metrics.unique_clients(), 2);
        assert_eq!(metrics.max_delivered_per_client(), 1);
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(Outcome::from_status(StatusCode::OK), Outcome::Delivered);
        assert_eq!(
            Outcome::from_status(StatusCode::TOO_MANY_REQUESTS),
            Outcome::RateLimited
        );
        assert_eq!(Outcome::from_status(StatusCode::BAD_REQUEST), Outcome::Rejected);
        assert_eq!(
            Outcome::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            Outcome::ServerError
        );
    }
}
