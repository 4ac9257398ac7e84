//! Clinic configuration.
//!
//! Values come from an optional TOML file and `VET_CLINIC__*` environment
//! variables, e.g. `VET_CLINIC__DATABASE__PATH=/var/lib/clinic.db`.

use std::path::{Path, PathBuf};

use chrono::{NaiveTime, Timelike};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/vet_clinic.toml";

const ENV_PREFIX: &str = "VET_CLINIC";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level clinic settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClinicConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub statistics: StatisticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("vet_clinic.db")
}

/// Working hours and slot grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    /// First bookable slot
    #[serde(default = "default_opening", with = "hhmm")]
    pub opening_time: NaiveTime,
    /// Last bookable slot (inclusive)
    #[serde(default = "default_closing", with = "hhmm")]
    pub closing_time: NaiveTime,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
    /// How often UI shells poll for schedule changes
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            opening_time: default_opening(),
            closing_time: default_closing(),
            slot_minutes: default_slot_minutes(),
            refresh_seconds: default_refresh_seconds(),
        }
    }
}

fn default_opening() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

fn default_closing() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default()
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_refresh_seconds() -> u64 {
    300
}

impl ScheduleConfig {
    /// Check that the grid is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.opening_time >= self.closing_time {
            return Err(ConfigError::Invalid(format!(
                "opening time {} must be before closing time {}",
                self.opening_time.format("%H:%M"),
                self.closing_time.format("%H:%M")
            )));
        }
        if !(5..=240).contains(&self.slot_minutes) || (24 * 60) % self.slot_minutes != 0 {
            return Err(ConfigError::Invalid(format!(
                "slot length of {} minutes must be 5..=240 and divide a day",
                self.slot_minutes
            )));
        }
        if self.refresh_seconds == 0 {
            return Err(ConfigError::Invalid("refresh interval must be positive".into()));
        }
        Ok(())
    }

    /// Whether `time` lies on the slot grid within working hours.
    pub fn is_on_grid(&self, time: NaiveTime) -> bool {
        if time < self.opening_time || time > self.closing_time || time.nanosecond() != 0 {
            return false;
        }
        let offset = (time - self.opening_time).num_seconds();
        offset % (i64::from(self.slot_minutes) * 60) == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatisticsConfig {
    #[serde(default = "default_window_months")]
    pub window_months: u32,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            window_months: default_window_months(),
        }
    }
}

fn default_window_months() -> u32 {
    6
}

impl ClinicConfig {
    /// Load from `config/vet_clinic.toml` (if present) and the environment.
    pub fn load() -> ConfigResult<Self> {
        Self::build(File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// Load from an explicit file, which must exist, and the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        Self::build(File::from(path.as_ref()).required(true))
    }

    fn build<S>(file: S) -> ConfigResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: ClinicConfig = settings.try_deserialize()?;
        config.validate()?;
        tracing::debug!(
            db = %config.database.path.display(),
            slot_minutes = config.schedule.slot_minutes,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.schedule.validate()?;
        if self.statistics.window_months == 0 {
            return Err(ConfigError::Invalid(
                "statistics window must be at least one month".into(),
            ));
        }
        Ok(())
    }
}

/// `HH:MM` (or `HH:MM:SS`) time fields.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| serde::de::Error::custom(format!("invalid time of day: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ClinicConfig::default();
        assert_eq!(config.database.path, PathBuf::from("vet_clinic.db"));
        assert_eq!(config.schedule.opening_time, time(9, 0));
        assert_eq!(config.schedule.closing_time, time(20, 0));
        assert_eq!(config.schedule.slot_minutes, 30);
        assert_eq!(config.schedule.refresh_seconds, 300);
        assert_eq!(config.statistics.window_months, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_grid() {
        let mut schedule = ScheduleConfig::default();
        schedule.opening_time = time(20, 0);
        schedule.closing_time = time(9, 0);
        assert!(matches!(schedule.validate(), Err(ConfigError::Invalid(_))));

        let mut schedule = ScheduleConfig::default();
        schedule.slot_minutes = 7;
        assert!(schedule.validate().is_err());

        schedule.slot_minutes = 480;
        assert!(schedule.validate().is_err());

        schedule.slot_minutes = 15;
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_is_on_grid() {
        let schedule = ScheduleConfig::default();
        assert!(schedule.is_on_grid(time(9, 0)));
        assert!(schedule.is_on_grid(time(14, 30)));
        assert!(schedule.is_on_grid(time(20, 0)));
        assert!(!schedule.is_on_grid(time(8, 30)));
        assert!(!schedule.is_on_grid(time(20, 30)));
        assert!(!schedule.is_on_grid(time(10, 15)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[database]
path = "/tmp/clinic.db"

[schedule]
opening_time = "08:00"
closing_time = "18:00"
slot_minutes = 60
"#
        )
        .unwrap();

        let config = ClinicConfig::load_from(&path).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/clinic.db"));
        assert_eq!(config.schedule.opening_time, time(8, 0));
        assert_eq!(config.schedule.slot_minutes, 60);
        // Untouched sections keep their defaults
        assert_eq!(config.schedule.refresh_seconds, 300);
        assert_eq!(config.statistics.window_months, 6);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.toml");
        std::fs::write(&path, "[schedule]\nslot_minutes = 7\n").unwrap();

        assert!(matches!(
            ClinicConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ClinicConfig::load_from(dir.path().join("absent.toml")),
            Err(ConfigError::Load(_))
        ));
    }
}
