// Telemetry data domain models
use super::service::ServiceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessCounts {
    pub total: u32,
    pub running: u32,
    pub suspended: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreadCounts {
    pub total: u32,
    pub active: u32,
}

/// One synthetic telemetry reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    /// KB/s
    pub network: f64,
    pub active_connections: u32,
    pub processes: ProcessCounts,
    pub threads: ThreadCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub service_id: ServiceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub realtime: bool,
    /// Generation period in seconds.
    pub interval: u64,
    /// Only read by the log view.
    pub log_auto_scroll: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            realtime: true,
            interval: 5,
            log_auto_scroll: true,
        }
    }
}

/// Longest accepted generation period, in seconds.
pub const MAX_INTERVAL_SECS: u64 = 3600;

impl Settings {
    /// Generation period, clamped to `1..=MAX_INTERVAL_SECS` seconds.
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval.clamp(1, MAX_INTERVAL_SECS))
    }

    pub fn interval_in_range(&self) -> bool {
        (1..=MAX_INTERVAL_SECS).contains(&self.interval)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransientAlert {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AlertThresholds {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu: 80.0,
            memory: 90.0,
            disk: 85.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cpu,
    Memory,
    Disk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breach {
    pub metric: Metric,
    pub value: f64,
    pub threshold: f64,
}

impl AlertThresholds {
    /// Metrics of `sample` strictly above their threshold.
    pub fn breaches(&self, sample: &MetricSample) -> Vec<Breach> {
        [
            (Metric::Cpu, sample.cpu, self.cpu),
            (Metric::Memory, sample.memory, self.memory),
            (Metric::Disk, sample.disk, self.disk),
        ]
        .into_iter()
        .filter(|(_, value, threshold)| value > threshold)
        .map(|(metric, value, threshold)| Breach {
            metric,
            value,
            threshold,
        })
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Running,
    Warning,
}

/// Row of the process table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRow {
    pub name: String,
    pub cpu: f64,
    pub memory_mb: f64,
    pub state: ProcessState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cpu: f64, memory: f64, disk: f64) -> MetricSample {
        MetricSample {
            timestamp: Utc::now(),
            cpu,
            memory,
            disk,
            network: 100.0,
            active_connections: 10,
            processes: ProcessCounts::default(),
            threads: ThreadCounts::default(),
        }
    }

    #[test]
    fn test_breaches_only_above_threshold() {
        let thresholds = AlertThresholds::default();
        assert!(thresholds.breaches(&sample(80.0, 90.0, 85.0)).is_empty());

        let breaches = thresholds.breaches(&sample(81.0, 50.0, 86.5));
        assert_eq!(breaches.len(), 2);
        assert_eq!(breaches[0].metric, Metric::Cpu);
        assert_eq!(breaches[1].metric, Metric::Disk);
        assert_eq!(breaches[1].threshold, 85.0);
    }

    #[test]
    fn test_settings_wire_names() {
        let settings: Settings =
            serde_json::from_str(r#"{"realtime":false,"interval":2,"logAutoScroll":false}"#).unwrap();
        assert!(!settings.realtime);
        assert_eq!(settings.interval, 2);
        assert_eq!(settings.period(), std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_zero_interval_runs_at_one_second() {
        let settings = Settings {
            interval: 0,
            ..Settings::default()
        };
        assert_eq!(settings.period(), std::time::Duration::from_secs(1));
        assert!(!settings.interval_in_range());
    }

    #[test]
    fn test_huge_interval_is_capped() {
        let settings = Settings {
            interval: u64::MAX,
            ..Settings::default()
        };
        assert_eq!(settings.period(), std::time::Duration::from_secs(MAX_INTERVAL_SECS));
        assert!(!settings.interval_in_range());
        assert!(Settings::default().interval_in_range());
    }

    #[test]
    fn test_sample_serializes_camel_case() {
        let value = serde_json::to_value(sample(1.0, 2.0, 3.0)).unwrap();
        assert!(value.get("activeConnections").is_some());
        assert_eq!(value["processes"]["total"], 0);
    }
}
