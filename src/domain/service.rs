// Service domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    Service1,
    Service2,
    Service3,
}

impl ServiceId {
    pub const ALL: [ServiceId; 3] = [ServiceId::Service1, ServiceId::Service2, ServiceId::Service3];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::Service1 => "service1",
            ServiceId::Service2 => "service2",
            ServiceId::Service3 => "service3",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceId::Service1 => "Authentication Service",
            ServiceId::Service2 => "Payment Gateway",
            ServiceId::Service3 => "Data Processing Service",
        }
    }

    /// Range profile giving each service its own load "personality".
    pub fn profile(&self) -> ServiceProfile {
        match self {
            ServiceId::Service1 => ServiceProfile {
                cpu: Band::new(20.0, 40.0),
                memory: Band::new(30.0, 50.0),
                disk: Band::new(20.0, 40.0),
                network: Band::new(50.0, 300.0),
                connections: Band::new(50.0, 150.0),
            },
            ServiceId::Service2 => ServiceProfile {
                cpu: Band::new(40.0, 70.0),
                memory: Band::new(50.0, 80.0),
                disk: Band::new(30.0, 60.0),
                network: Band::new(200.0, 800.0),
                connections: Band::new(100.0, 300.0),
            },
            ServiceId::Service3 => ServiceProfile {
                cpu: Band::new(30.0, 90.0),
                memory: Band::new(40.0, 90.0),
                disk: Band::new(50.0, 90.0),
                network: Band::new(100.0, 1000.0),
                connections: Band::new(10.0, 60.0),
            },
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service id: {0}")]
pub struct UnknownService(pub String);

impl FromStr for ServiceId {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    Stopped,
}

impl ServiceStatus {
    pub fn flipped(self) -> Self {
        match self {
            ServiceStatus::Running => ServiceStatus::Stopped,
            ServiceStatus::Stopped => ServiceStatus::Running,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ServiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ServiceStatus::Running),
            "stopped" => Ok(ServiceStatus::Stopped),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Closed `[min, max]` interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceProfile {
    pub cpu: Band,
    pub memory: Band,
    pub disk: Band,
    /// KB/s
    pub network: Band,
    pub connections: Band,
}

/// Catalog entry served to the sidebar.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub id: ServiceId,
    pub name: String,
    pub status: ServiceStatus,
}
