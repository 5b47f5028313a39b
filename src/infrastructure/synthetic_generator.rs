// Synthetic sample generator - random walk inside per-service bands
use crate::application::sample_generator::{LogDraft, SampleGenerator};
use crate::domain::service::{Band, ServiceId, ServiceStatus};
use crate::domain::telemetry::{
    LogLevel, MetricSample, ProcessCounts, ProcessRow, ProcessState, ThreadCounts,
};
use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PROCESS_ROWS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct GeneratorOptions {
    /// Chance that a tick yields a log line.
    pub log_probability: f64,
    /// Chance per status round that a service flips running/stopped.
    pub status_flip_probability: f64,
    /// Chance per tick of a transient feed alert.
    pub alert_probability: f64,
    /// Largest step between consecutive samples, as a fraction of the band width.
    pub max_step: f64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            log_probability: 0.3,
            status_flip_probability: 0.05,
            alert_probability: 0.02,
            max_step: 0.1,
        }
    }
}

pub struct SyntheticGenerator {
    rng: StdRng,
    options: GeneratorOptions,
}

impl SyntheticGenerator {
    /// Seeded generators replay the same stream; `None` draws a seed from the OS.
    pub fn new(seed: Option<u64>, options: GeneratorOptions) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            rng,
            options: GeneratorOptions {
                log_probability: probability(options.log_probability),
                status_flip_probability: probability(options.status_flip_probability),
                alert_probability: probability(options.alert_probability),
                max_step: probability(options.max_step),
            },
        }
    }

    /// Uniform in the band, or a bounded step away from `previous`.
    fn walk(&mut self, band: Band, previous: Option<f64>) -> f64 {
        match previous {
            None => self.rng.random_range(band.min..=band.max),
            Some(prev) => {
                let delta = band.span() * self.options.max_step;
                band.clamp(prev + self.rng.random_range(-delta..=delta))
            }
        }
    }

    fn log_table(service: ServiceId) -> &'static [(LogLevel, &'static str)] {
        match service {
            ServiceId::Service1 => &[
                (LogLevel::Info, "User login successful"),
                (LogLevel::Info, "Session token refreshed"),
                (LogLevel::Info, "Password reset email sent"),
                (LogLevel::Warning, "Multiple failed login attempts detected"),
                (LogLevel::Error, "Failed to validate session token"),
            ],
            ServiceId::Service2 => &[
                (LogLevel::Info, "Payment processed successfully"),
                (LogLevel::Info, "Refund issued"),
                (LogLevel::Info, "Settlement batch completed"),
                (LogLevel::Warning, "Payment provider latency above 800ms"),
                (LogLevel::Error, "Transaction declined by upstream processor"),
            ],
            ServiceId::Service3 => &[
                (LogLevel::Info, "Batch job completed"),
                (LogLevel::Info, "Pipeline checkpoint written"),
                (LogLevel::Info, "Backup completed"),
                (LogLevel::Warning, "High memory usage detected"),
                (LogLevel::Error, "Worker crashed while processing partition"),
            ],
        }
    }
}

fn probability(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}

#[async_trait]
impl SampleGenerator for SyntheticGenerator {
    async fn generate(&mut self, service: ServiceId, previous: Option<&MetricSample>) -> MetricSample {
        let profile = service.profile();

        let cpu = self.walk(profile.cpu, previous.map(|p| p.cpu));
        let memory = self.walk(profile.memory, previous.map(|p| p.memory));
        let disk = self.walk(profile.disk, previous.map(|p| p.disk));
        let network = self.walk(profile.network, previous.map(|p| p.network));
        let connections = self
            .walk(profile.connections, previous.map(|p| p.active_connections as f64))
            .round() as u32;

        let total = self.rng.random_range(80..=120);
        let running = self.rng.random_range(70..=90).min(total);
        let suspended = self.rng.random_range(5..=15).min(total - running);
        let threads_total = self.rng.random_range(200..=300);
        let threads_active = self.rng.random_range(150..=200);

        MetricSample {
            timestamp: Utc::now(),
            cpu,
            memory,
            disk,
            network,
            active_connections: connections,
            processes: ProcessCounts {
                total,
                running,
                suspended,
            },
            threads: ThreadCounts {
                total: threads_total,
                active: threads_active,
            },
        }
    }

    async fn generate_log(&mut self, service: ServiceId) -> Option<LogDraft> {
        if !self.rng.random_bool(self.options.log_probability) {
            return None;
        }

        let table = Self::log_table(service);
        let (level, message) = table[self.rng.random_range(0..table.len())];
        Some(LogDraft::new(level, message))
    }

    async fn next_status(&mut self, _service: ServiceId, current: ServiceStatus) -> ServiceStatus {
        if self.rng.random_bool(self.options.status_flip_probability) {
            current.flipped()
        } else {
            current
        }
    }

    async fn transient_alert(&mut self, service: ServiceId) -> Option<String> {
        if !self.rng.random_bool(self.options.alert_probability) {
            return None;
        }
        Some(format!("Lost connection to {} metrics feed, retrying", service.name()))
    }

    async fn process_table(&mut self, service: ServiceId, latest: Option<&MetricSample>) -> Vec<ProcessRow> {
        // busier services get busier rows
        let load = latest.map(|s| s.cpu / 100.0).unwrap_or(0.5);

        (1..=PROCESS_ROWS)
            .map(|n| ProcessRow {
                name: format!("{}-worker-{}", service, n),
                cpu: self.rng.random_range(0.0..=10.0) * load,
                memory_mb: self.rng.random_range(0.0..=100.0),
                state: if self.rng.random_bool(0.8) {
                    ProcessState::Running
                } else {
                    ProcessState::Warning
                },
            })
            .collect()
    }
}
