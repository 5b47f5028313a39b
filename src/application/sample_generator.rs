// Sample generator trait - source of every randomized draw the feed makes
use crate::domain::service::{ServiceId, ServiceStatus};
use crate::domain::telemetry::{LogLevel, MetricSample, ProcessRow};
use async_trait::async_trait;

/// Log line produced by a generator; the simulator assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct LogDraft {
    pub level: LogLevel,
    pub message: String,
}

impl LogDraft {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait SampleGenerator: Send + Sync {
    /// Produce the next sample for `service`, continuing from `previous` when present
    async fn generate(&mut self, service: ServiceId, previous: Option<&MetricSample>) -> MetricSample;

    /// Zero or one log line for this tick
    async fn generate_log(&mut self, service: ServiceId) -> Option<LogDraft>;

    /// Running/stopped state observed for `service` on a status round
    async fn next_status(&mut self, service: ServiceId, current: ServiceStatus) -> ServiceStatus;

    /// Feed-level alert to surface for this tick, if any
    async fn transient_alert(&mut self, service: ServiceId) -> Option<String>;

    /// Per-process breakdown behind the latest sample
    async fn process_table(&mut self, service: ServiceId, latest: Option<&MetricSample>) -> Vec<ProcessRow>;
}
