// Feed snapshot handed to the views
use super::service::{ServiceId, ServiceStatus};
use super::telemetry::{Breach, ConnectionStatus, LogEntry, MetricSample, Settings, TransientAlert};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub service: ServiceId,
    pub connection: ConnectionStatus,
    pub latest: Option<MetricSample>,
    pub history: Vec<MetricSample>,
    pub logs: Vec<LogEntry>,
    pub service_status: BTreeMap<ServiceId, ServiceStatus>,
    pub settings: Settings,
    pub alert: Option<TransientAlert>,
    pub breaches: Vec<Breach>,
}
