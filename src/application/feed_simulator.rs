// Feed simulator - Per-service rolling telemetry and connection lifecycle
use crate::application::sample_generator::SampleGenerator;
use crate::domain::history::ServiceHistory;
use crate::domain::service::{ServiceId, ServiceStatus};
use crate::domain::snapshot::FeedSnapshot;
use crate::domain::telemetry::{
    AlertThresholds, ConnectionStatus, LogEntry, LogLevel, ProcessRow, Settings, TransientAlert,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

pub const DEFAULT_METRIC_HISTORY: usize = 50;
pub const DEFAULT_LOG_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    pub metric_history: usize,
    pub log_history: usize,
    pub thresholds: AlertThresholds,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            metric_history: DEFAULT_METRIC_HISTORY,
            log_history: DEFAULT_LOG_HISTORY,
            thresholds: AlertThresholds::default(),
        }
    }
}

/// What the generation schedule has to do after a settings change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleChange {
    Unchanged,
    Restart(Duration),
    Suspend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub sampled: bool,
    pub logged: bool,
    pub alert_raised: bool,
}

pub struct FeedSimulator {
    generator: Box<dyn SampleGenerator>,
    options: FeedOptions,
    settings: Settings,
    selected: ServiceId,
    connection: ConnectionStatus,
    histories: HashMap<ServiceId, ServiceHistory>,
    service_status: BTreeMap<ServiceId, ServiceStatus>,
    alert: Option<TransientAlert>,
    next_log_id: u64,
}

impl FeedSimulator {
    pub fn new(
        generator: Box<dyn SampleGenerator>,
        options: FeedOptions,
        settings: Settings,
        initial: ServiceId,
    ) -> Self {
        let mut histories = HashMap::new();
        histories.insert(
            initial,
            ServiceHistory::new(options.metric_history, options.log_history),
        );

        Self {
            generator,
            options,
            settings,
            selected: initial,
            connection: ConnectionStatus::Connecting,
            histories,
            service_status: ServiceId::ALL
                .into_iter()
                .map(|id| (id, ServiceStatus::Running))
                .collect(),
            alert: None,
            next_log_id: 1,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn service_status(&self, service: ServiceId) -> ServiceStatus {
        self.service_status
            .get(&service)
            .copied()
            .unwrap_or(ServiceStatus::Running)
    }

    pub fn history(&self, service: ServiceId) -> Option<&ServiceHistory> {
        self.histories.get(&service)
    }

    /// Switch the active service.
    ///
    /// A service that already produced samples is shown from its cache right
    /// away; anything else waits in `connecting` for the first tick.
    /// Returns whether the selection changed.
    pub fn select(&mut self, service: ServiceId) -> bool {
        if service == self.selected {
            return false;
        }

        self.selected = service;
        self.alert = None;

        let (metric_capacity, log_capacity) = (self.options.metric_history, self.options.log_history);
        let history = self
            .histories
            .entry(service)
            .or_insert_with(|| ServiceHistory::new(metric_capacity, log_capacity));

        // logs recorded while the service had no samples are kept
        self.connection = if history.metrics.is_empty() {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Connected
        };

        tracing::info!(service = %service, connection = ?self.connection, "Selected service");
        true
    }

    pub fn configure(&mut self, settings: Settings) -> ScheduleChange {
        let previous = std::mem::replace(&mut self.settings, settings);

        let change = if !settings.realtime {
            ScheduleChange::Suspend
        } else if !previous.realtime || previous.period() != settings.period() {
            ScheduleChange::Restart(settings.period())
        } else {
            ScheduleChange::Unchanged
        };

        tracing::info!(
            realtime = settings.realtime,
            interval = settings.interval,
            log_auto_scroll = settings.log_auto_scroll,
            ?change,
            "Updated feed settings"
        );

        change
    }

    /// Generate one sample (and maybe one log line) for the selected service.
    pub async fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.settings.realtime {
            return outcome;
        }

        let service = self.selected;
        let (metric_capacity, log_capacity) = (self.options.metric_history, self.options.log_history);
        let history = self
            .histories
            .entry(service)
            .or_insert_with(|| ServiceHistory::new(metric_capacity, log_capacity));

        let sample = self
            .generator
            .generate(service, history.metrics.latest())
            .await;
        tracing::debug!(
            service = %service,
            cpu = sample.cpu,
            memory = sample.memory,
            connections = sample.active_connections,
            "Generated sample"
        );
        history.metrics.push(sample);
        outcome.sampled = true;

        if let Some(draft) = self.generator.generate_log(service).await {
            self.push_log(service, draft.level, draft.message);
            outcome.logged = true;
        }

        if self.connection == ConnectionStatus::Connecting {
            self.connection = ConnectionStatus::Connected;
        }

        if self.alert.is_none() {
            if let Some(message) = self.generator.transient_alert(service).await {
                tracing::warn!(service = %service, "{}", message);
                self.alert = Some(TransientAlert {
                    message,
                    raised_at: Utc::now(),
                });
                self.connection = ConnectionStatus::Error;
                outcome.alert_raised = true;
            }
        }

        outcome
    }

    /// One status round: every service may independently flip running/stopped.
    pub async fn status_tick(&mut self) -> Vec<(ServiceId, ServiceStatus)> {
        let mut changes = Vec::new();
        for service in ServiceId::ALL {
            let current = self.service_status(service);
            let next = self.generator.next_status(service, current).await;
            if self.set_service_status(service, next) {
                changes.push((service, next));
            }
        }
        changes
    }

    /// Force a service status. Returns whether it changed.
    pub fn set_service_status(&mut self, service: ServiceId, status: ServiceStatus) -> bool {
        let previous = self.service_status.insert(service, status);
        if previous == Some(status) {
            return false;
        }

        match status {
            ServiceStatus::Running => {
                tracing::info!(service = %service, "Service is running");
            }
            ServiceStatus::Stopped => {
                tracing::warn!(service = %service, "Service stopped");
                if service == self.selected {
                    self.push_log(
                        service,
                        LogLevel::Error,
                        format!("{} is not responding", service.name()),
                    );
                }
            }
        }

        true
    }

    pub fn alert(&self) -> Option<&TransientAlert> {
        self.alert.as_ref()
    }

    pub fn clear_alert(&mut self) {
        if self.alert.take().is_some() && self.connection == ConnectionStatus::Error {
            self.connection = ConnectionStatus::Connected;
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let history = self.histories.get(&self.selected);
        let latest = history.and_then(|h| h.metrics.latest().cloned());
        let breaches = latest
            .as_ref()
            .map(|sample| self.options.thresholds.breaches(sample))
            .unwrap_or_default();

        FeedSnapshot {
            service: self.selected,
            connection: self.connection,
            latest,
            history: history.map(|h| h.metrics.to_vec()).unwrap_or_default(),
            logs: history.map(|h| h.logs.to_vec()).unwrap_or_default(),
            service_status: self.service_status.clone(),
            settings: self.settings,
            alert: self.alert.clone(),
            breaches,
        }
    }

    pub async fn process_table(&mut self) -> Vec<ProcessRow> {
        let service = self.selected;
        let latest = self
            .histories
            .get(&service)
            .and_then(|h| h.metrics.latest());
        self.generator.process_table(service, latest).await
    }

    fn push_log(&mut self, service: ServiceId, level: LogLevel, message: String) {
        let entry = LogEntry {
            id: self.next_log_id,
            timestamp: Utc::now(),
            level,
            message,
            service_id: service,
        };
        self.next_log_id += 1;

        let (metric_capacity, log_capacity) = (self.options.metric_history, self.options.log_history);
        self.histories
            .entry(service)
            .or_insert_with(|| ServiceHistory::new(metric_capacity, log_capacity))
            .logs
            .push(entry);
    }
}
