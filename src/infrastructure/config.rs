use crate::application::feed_runtime::RuntimeTiming;
use crate::application::feed_simulator::{FeedOptions, DEFAULT_LOG_HISTORY, DEFAULT_METRIC_HISTORY};
use crate::domain::telemetry::{AlertThresholds, Settings, MAX_INTERVAL_SECS};
use crate::infrastructure::synthetic_generator::GeneratorOptions;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub feed: FeedConfig,
    pub settings: SettingsConfig,
    pub thresholds: ThresholdsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub metric_history: usize,
    pub log_history: usize,
    pub status_interval_secs: u64,
    pub status_flip_probability: f64,
    pub log_probability: f64,
    pub alert_probability: f64,
    pub alert_duration_secs: u64,
    pub max_step: f64,
    pub seed: Option<u64>,
    pub initial_service: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let generator = GeneratorOptions::default();
        let timing = RuntimeTiming::default();
        Self {
            metric_history: DEFAULT_METRIC_HISTORY,
            log_history: DEFAULT_LOG_HISTORY,
            status_interval_secs: timing.status_interval.as_secs(),
            status_flip_probability: generator.status_flip_probability,
            log_probability: generator.log_probability,
            alert_probability: generator.alert_probability,
            alert_duration_secs: timing.alert_duration.as_secs(),
            max_step: generator.max_step,
            seed: None,
            initial_service: "service1".to_string(),
        }
    }
}

/// Host settings at startup. Keys are snake_case here, camelCase on the wire.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SettingsConfig {
    pub realtime: bool,
    pub interval: u64,
    pub log_auto_scroll: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            realtime: settings.realtime,
            interval: settings.interval,
            log_auto_scroll: settings.log_auto_scroll,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        let thresholds = AlertThresholds::default();
        Self {
            cpu: thresholds.cpu,
            memory: thresholds.memory,
            disk: thresholds.disk,
        }
    }
}

impl AppConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            realtime: self.settings.realtime,
            interval: self.settings.interval,
            log_auto_scroll: self.settings.log_auto_scroll,
        }
    }

    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            metric_history: self.feed.metric_history,
            log_history: self.feed.log_history,
            thresholds: AlertThresholds {
                cpu: self.thresholds.cpu,
                memory: self.thresholds.memory,
                disk: self.thresholds.disk,
            },
        }
    }

    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            log_probability: self.feed.log_probability,
            status_flip_probability: self.feed.status_flip_probability,
            alert_probability: self.feed.alert_probability,
            max_step: self.feed.max_step,
        }
    }

    pub fn timing(&self) -> RuntimeTiming {
        RuntimeTiming {
            status_interval: Duration::from_secs(self.feed.status_interval_secs.clamp(1, MAX_INTERVAL_SECS)),
            alert_duration: Duration::from_secs(self.feed.alert_duration_secs),
        }
    }
}

/// Load `config/feed.*` (optional) overridden by `FEED__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/feed").required(false))
        .add_source(
            config::Environment::with_prefix("FEED")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    build_config(builder)
}

fn build_config(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<AppConfig> {
    let settings = builder.build()?;
    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> AppConfig {
        let builder = config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        build_config(builder).unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = parse("");
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.settings(), Settings::default());
        assert_eq!(config.feed_options().metric_history, 50);
        assert_eq!(config.feed_options().log_history, 100);
        assert_eq!(config.timing().status_interval, Duration::from_secs(10));
        assert_eq!(config.timing().alert_duration, Duration::from_secs(3));
        assert!(config.feed.seed.is_none());
    }

    #[test]
    fn test_partial_overrides() {
        let config = parse(
            r#"
            [feed]
            seed = 42
            log_probability = 1.0
            metric_history = 20

            [settings]
            interval = 1
            log_auto_scroll = false

            [thresholds]
            cpu = 70.0
            "#,
        );

        assert_eq!(config.feed.seed, Some(42));
        assert_eq!(config.generator_options().log_probability, 1.0);
        assert_eq!(config.feed_options().metric_history, 20);
        assert_eq!(config.feed_options().log_history, 100);

        let settings = config.settings();
        assert!(settings.realtime);
        assert_eq!(settings.interval, 1);
        assert!(!settings.log_auto_scroll);

        assert_eq!(config.feed_options().thresholds.cpu, 70.0);
        assert_eq!(config.feed_options().thresholds.disk, 85.0);
    }

    #[test]
    fn test_zero_status_interval_is_raised() {
        let config = parse("[feed]\nstatus_interval_secs = 0\n");
        assert_eq!(config.timing().status_interval, Duration::from_secs(1));

        let config = parse("[feed]\nstatus_interval_secs = 9223372036854775807\n");
        assert_eq!(config.timing().status_interval, Duration::from_secs(MAX_INTERVAL_SECS));
    }
}
