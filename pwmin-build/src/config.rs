//! Build configuration loading
//!
//! Sensors are declared as an array of tables so their order in the file
//! is the order they are allocated in:
//!
//! ```toml
//! board = "rpipico"
//!
//! [[sensor]]
//! name = "fan_tach"
//! pin = 3
//! update_interval = "30s"
//!
//! [[sensor]]
//! name = "flow_meter"
//! pin = 7
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid interval '{0}' (expected e.g. 500ms, 60s, 5min, 1h)")]
    InvalidInterval(String),
    #[error("sensor name '{0}' is used more than once")]
    DuplicateSensor(String),
    #[error("sensor {0} has an empty name")]
    EmptyName(usize),
}

/// Top-level build configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Target board name, resolved against the board profile table
    #[serde(default)]
    pub board: Option<String>,
    /// Reject sensors whose pins share a PWM slice
    #[serde(default = "default_enforce_slice_exclusivity")]
    pub enforce_slice_exclusivity: bool,
    /// Sensor declarations in file order
    #[serde(default, rename = "sensor")]
    pub sensors: Vec<SensorConfig>,
}

/// How Home Assistant-style frontends should treat the reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    #[default]
    Measurement,
    Total,
    TotalIncreasing,
}

/// One PWM input sensor
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    /// Sensor name, unique within the build
    pub name: String,
    /// GPIO pin to count pulses on
    pub pin: u8,
    /// Polling period
    #[serde(
        default = "default_update_interval",
        deserialize_with = "deserialize_interval"
    )]
    pub update_interval: Duration,
    #[serde(default = "default_unit")]
    pub unit_of_measurement: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub accuracy_decimals: u8,
    #[serde(default)]
    pub state_class: StateClass,
}

fn default_enforce_slice_exclusivity() -> bool { true }
fn default_update_interval() -> Duration { Duration::from_secs(60) }
fn default_unit() -> String { "Hz".to_string() }
fn default_icon() -> String { "mdi:pulse".to_string() }

impl SensorConfig {
    /// Sensor on `pin` with default metadata
    pub fn new(name: impl Into<String>, pin: u8) -> Self {
        Self {
            name: name.into(),
            pin,
            update_interval: default_update_interval(),
            unit_of_measurement: default_unit(),
            icon: default_icon(),
            accuracy_decimals: 0,
            state_class: StateClass::default(),
        }
    }
}

impl BuildConfig {
    /// Config for `board` with the given sensors and slice exclusivity on
    pub fn new(board: impl Into<String>, sensors: Vec<SensorConfig>) -> Self {
        Self {
            board: Some(board.into()),
            enforce_slice_exclusivity: true,
            sensors,
        }
    }

    /// Find a sensor by name
    pub fn find_sensor(&self, name: &str) -> Option<&SensorConfig> {
        self.sensors.iter().find(|s| s.name == name)
    }

    /// Check the parts serde cannot express
    fn check(&self) -> Result<(), ConfigError> {
        for (i, sensor) in self.sensors.iter().enumerate() {
            if sensor.name.trim().is_empty() {
                return Err(ConfigError::EmptyName(i));
            }
            if self.sensors[..i].iter().any(|s| s.name == sensor.name) {
                return Err(ConfigError::DuplicateSensor(sensor.name.clone()));
            }
        }
        Ok(())
    }
}

/// Parse an interval such as `500ms`, `60s`, `5min` or `1h`
pub fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    let invalid = || ConfigError::InvalidInterval(value.to_string());

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (number, unit) = value.split_at(split);
    let number: u64 = number.parse().map_err(|_| invalid())?;

    let millis = match unit.trim() {
        "ms" => Some(number),
        "s" => number.checked_mul(1_000),
        "min" => number.checked_mul(60_000),
        "h" => number.checked_mul(3_600_000),
        _ => None,
    }
    .ok_or_else(invalid)?;

    if millis == 0 {
        return Err(invalid());
    }
    Ok(Duration::from_millis(millis))
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_interval(&raw).map_err(serde::de::Error::custom)
}

/// Parse a build configuration from TOML text
pub fn parse_config(input: &str) -> Result<BuildConfig, ConfigError> {
    let config: BuildConfig = toml::from_str(input)?;
    config.check()?;
    Ok(config)
}

/// Load a build configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<BuildConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path.display(), e);
        ConfigError::Io(e)
    })?;

    let config = parse_config(&contents).map_err(|e| {
        tracing::error!("Failed to parse config '{}': {}", path.display(), e);
        e
    })?;

    tracing::debug!(
        "Loaded {} with {} sensor(s) for board {:?}",
        path.display(),
        config.sensors.len(),
        config.board
    );
    Ok(config)
}
