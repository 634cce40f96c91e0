use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::layout::MIN_WIDTH;
use crate::core::models::report::ReportTimezone;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub timezone: ReportTimezone,
    /// Preferred report width; the terminal size is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    #[serde(default = "default_hourly_window")]
    pub hourly_window_hours: u32,
    #[serde(default = "default_daily_window")]
    pub daily_window_days: u32,
    /// Searched in addition to the standard Claude directories.
    #[serde(default)]
    pub data_dirs: Vec<PathBuf>,
}

fn default_color() -> String {
    "auto".to_string()
}
fn default_hourly_window() -> u32 {
    24
}
fn default_daily_window() -> u32 {
    14
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: default_color(),
            timezone: ReportTimezone::default(),
            width: None,
            hourly_window_hours: default_hourly_window(),
            daily_window_days: default_daily_window(),
            data_dirs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("claude-usage").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if let Some(width) = self.settings.width {
            if width < MIN_WIDTH {
                issues.push(format!(
                    "Invalid width: {} (must be at least {})",
                    width, MIN_WIDTH
                ));
            }
        }
        if self.settings.hourly_window_hours == 0 {
            issues.push("hourly_window_hours must be greater than 0".to_string());
        }
        if self.settings.daily_window_days == 0 {
            issues.push("daily_window_days must be greater than 0".to_string());
        }
        for dir in &self.settings.data_dirs {
            if !dir.is_dir() {
                issues.push(format!("Data directory not found: {}", dir.display()));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_windows() {
        let settings = Settings::default();
        assert_eq!(settings.hourly_window_hours, 24);
        assert_eq!(settings.daily_window_days, 14);
        assert_eq!(settings.color, "auto");
        assert_eq!(settings.timezone, ReportTimezone::Local);
        assert!(settings.width.is_none());
    }

    #[test]
    fn validate_catches_invalid_color() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("color")));
    }

    #[test]
    fn validate_catches_narrow_width() {
        let mut config = AppConfig::default();
        config.settings.width = Some(40);
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("width")));

        config.settings.width = Some(69);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn validate_catches_zero_windows() {
        let mut config = AppConfig::default();
        config.settings.hourly_window_hours = 0;
        config.settings.daily_window_days = 0;
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn validate_catches_missing_data_dir() {
        let mut config = AppConfig::default();
        config
            .settings
            .data_dirs
            .push(PathBuf::from("/nonexistent/claude-usage-logs"));
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("not found")));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[settings]
color = "always"
timezone = "utc"
width = 120
daily_window_days = 30
data_dirs = ["/srv/claude"]
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.color, "always");
        assert_eq!(config.settings.timezone, ReportTimezone::Utc);
        assert_eq!(config.settings.width, Some(120));
        assert_eq!(config.settings.daily_window_days, 30);
        assert_eq!(config.settings.hourly_window_hours, 24);
        assert_eq!(config.settings.data_dirs, vec![PathBuf::from("/srv/claude")]);
    }

    #[test]
    fn parse_bad_timezone_fails() {
        let toml = "[settings]\ntimezone = \"mars\"\n";
        assert!(toml::from_str::<AppConfig>(toml).is_err());
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.color, "auto");
        assert_eq!(config.settings.hourly_window_hours, 24);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.settings.daily_window_days, 14);
        assert!(parsed.settings.width.is_none());
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(
            path,
            PathBuf::from("/tmp/test_xdg_config/claude-usage/config.toml")
        );
    }
}
