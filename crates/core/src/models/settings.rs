use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::CoreError;

/// How often quotes are refreshed automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshInterval {
    /// "Don't Update": refresh only on demand
    Manual,
    Minutes(u64),
    Hours(u64),
}

impl RefreshInterval {
    /// Every label offered to the user, in menu order.
    pub const CHOICES: [RefreshInterval; 7] = [
        RefreshInterval::Manual,
        RefreshInterval::Minutes(5),
        RefreshInterval::Minutes(10),
        RefreshInterval::Minutes(15),
        RefreshInterval::Minutes(30),
        RefreshInterval::Hours(1),
        RefreshInterval::Hours(2),
    ];

    /// Period between automatic refreshes; `None` for `Manual`.
    pub fn period(&self) -> Option<Duration> {
        match self {
            RefreshInterval::Manual => None,
            RefreshInterval::Minutes(m) => Some(Duration::from_secs(m.saturating_mul(60))),
            RefreshInterval::Hours(h) => Some(Duration::from_secs(h.saturating_mul(60 * 60))),
        }
    }
}

impl std::fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshInterval::Manual => write!(f, "Don't Update"),
            RefreshInterval::Minutes(m) => write!(f, "{m} Mins"),
            RefreshInterval::Hours(1) => write!(f, "1 Hour"),
            RefreshInterval::Hours(h) => write!(f, "{h} Hours"),
        }
    }
}

impl FromStr for RefreshInterval {
    type Err = CoreError;

    /// Parses the menu labels: "Don't Update", "5 Mins", "1 Hour", "2 Hours".
    /// Only intervals listed in `CHOICES` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("don't update") || text.eq_ignore_ascii_case("manual") {
            return Ok(RefreshInterval::Manual);
        }
        let invalid = || CoreError::InvalidInterval(s.to_string());
        let (count, unit) = text.split_once(' ').ok_or_else(invalid)?;
        let count: u64 = count.parse().map_err(|_| invalid())?;
        let interval = match unit.trim().to_ascii_lowercase().as_str() {
            "min" | "mins" | "minute" | "minutes" => RefreshInterval::Minutes(count),
            "hour" | "hours" => RefreshInterval::Hours(count),
            _ => return Err(invalid()),
        };
        if Self::CHOICES.contains(&interval) {
            Ok(interval)
        } else {
            Err(invalid())
        }
    }
}

/// User-configurable settings, read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where positions are stored (CSV).
    pub data_file: PathBuf,

    /// Automatic refresh interval label, e.g. "5 Mins".
    pub refresh_interval: String,

    /// Lookup attempts per ticker before it is marked unavailable.
    pub retry_attempts: u32,

    /// Fixed pause between failed attempts.
    pub retry_delay_ms: u64,

    /// Treat the market as always open (useful outside trading hours).
    pub dev_mode: bool,

    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data.csv"),
            refresh_interval: "5 Mins".to_string(),
            retry_attempts: 3,
            retry_delay_ms: 1000,
            dev_mode: false,
            log_level: "info".to_string(),
            api_keys: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if it exists), then apply environment overrides.
    ///
    /// - `OPTIONS_MONITOR_DATA_FILE` replaces `data_file`
    /// - `OPTIONS_MONITOR_DEV_MODE` ("1"/"true"/"yes") sets `dev_mode`
    /// - `ALPHAVANTAGE_API_KEY` sets the "alphavantage" key
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let mut settings = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<Settings>(&text).map_err(|e| {
                CoreError::Config(format!("Failed to parse {}: {e}", path.display()))
            })?
        } else {
            Settings::default()
        };

        if let Ok(file) = std::env::var("OPTIONS_MONITOR_DATA_FILE") {
            settings.data_file = PathBuf::from(file);
        }
        if let Ok(val) = std::env::var("OPTIONS_MONITOR_DEV_MODE") {
            settings.dev_mode = matches!(val.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(key) = std::env::var("ALPHAVANTAGE_API_KEY") {
            settings.api_keys.insert("alphavantage".to_string(), key);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Write settings as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(CoreError::Config("data_file must not be empty".into()));
        }
        if self.retry_attempts == 0 {
            return Err(CoreError::Config("retry_attempts must be > 0".into()));
        }
        self.interval()?;
        Ok(())
    }

    /// The configured refresh interval, parsed.
    pub fn interval(&self) -> Result<RefreshInterval, CoreError> {
        self.refresh_interval.parse()
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
