use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
        }
    }
}

/// Cadences for the two background tasks, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervals {
    #[serde(default = "default_usage_secs")]
    pub usage_secs: u64,
    #[serde(default = "default_cost_secs")]
    pub cost_secs: u64,
}

fn default_usage_secs() -> u64 {
    60
}
fn default_cost_secs() -> u64 {
    300
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            usage_secs: default_usage_secs(),
            cost_secs: default_cost_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub intervals: Intervals,
    /// Overrides the session log directory
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Config file path, respecting XDG_CONFIG_HOME.
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("tokenbar").join("config.toml")
    }

    /// Load from the default path, falling back to defaults if not found.
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
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Session log directory: explicit config value, then CLAUDE_CONFIG_DIR,
    /// then ~/.claude/projects.
    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        if let Ok(config_dir) = std::env::var("CLAUDE_CONFIG_DIR") {
            return PathBuf::from(config_dir).join("projects");
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(".claude")
            .join("projects")
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if self.intervals.usage_secs == 0 {
            issues.push("intervals.usage_secs must be at least 1".to_string());
        }
        if self.intervals.cost_secs == 0 {
            issues.push("intervals.cost_secs must be at least 1".to_string());
        }
        issues
    }
}
