use crate::collectors::generic::{DEFAULT_GENERIC_SENSORS_DIR, DEFAULT_SCRIPT_TIMEOUT};
use anyhow::{Context, Result};
use config::{Config, File};
use log::{debug, info, LevelFilter};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_interval() -> u64 {
    10
}

fn default_generic_dir() -> PathBuf {
    PathBuf::from(DEFAULT_GENERIC_SENSORS_DIR)
}

fn default_script_timeout() -> u64 {
    DEFAULT_SCRIPT_TIMEOUT.as_secs()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// Seconds between collection cycles.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

/// Sensor selection. `filter` keeps the difference between "not set"
/// (`None`) and "set to nothing" (`Some("")`), see [`crate::filter::FilterSpec`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SensorsConfig {
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub primary: Option<String>,
    /// Replacement for `/sys` when reading hardware sensors.
    #[serde(default)]
    pub sys_root: Option<PathBuf>,
    #[serde(default = "default_generic_dir")]
    pub generic_dir: PathBuf,
    /// Seconds an executable generic sensor may run before it is killed.
    #[serde(default = "default_script_timeout")]
    pub script_timeout: u64,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            filter: None,
            primary: None,
            sys_root: None,
            generic_dir: default_generic_dir(),
            script_timeout: default_script_timeout(),
        }
    }
}

impl SensorsConfig {
    pub fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.script_timeout)
    }

    /// Applies `SENSORS`, `PRIMARY_SENSOR`, `SYS_SENSORS` and
    /// `GENERIC_SENSORS_DIR` on top of the file configuration.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // An empty SENSORS is meaningful: it disables temperature collection.
        if let Some(filter) = lookup("SENSORS") {
            self.filter = Some(filter);
        }
        if let Some(primary) = lookup("PRIMARY_SENSOR") {
            self.primary = Some(primary);
        }
        if let Some(root) = lookup("SYS_SENSORS").filter(|root| !root.is_empty()) {
            self.sys_root = Some(PathBuf::from(root));
        }
        if let Some(dir) = lookup("GENERIC_SENSORS_DIR").filter(|dir| !dir.is_empty()) {
            self.generic_dir = PathBuf::from(dir);
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(rename = "agent", alias = "AGENT", default)]
    pub agent: AgentConfig,
    #[serde(rename = "sensors", alias = "SENSORS", default)]
    pub sensors: SensorsConfig,
    #[serde(rename = "logging", alias = "LOGGING", default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads `config.ini` if present, then applies environment overrides.
    pub fn new() -> Result<Self> {
        let path = Path::new("config.ini");
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            debug!("No configuration file at {}, using defaults", path.display());
            Self::default()
        };
        config.sensors.apply_env();
        Ok(config)
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.agent.interval.max(1))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(File::from(config_path).format(config::FileFormat::Ini))
            .build()
            .context(format!("Failed to load config from {}", config_path.display()))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;

        Ok(app_config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = path.as_ref();

        let mut config_str = String::new();

        config_str.push_str(&format!("[AGENT]\ninterval = {}\n\n", self.agent.interval));

        config_str.push_str("[SENSORS]\n");
        if let Some(filter) = &self.sensors.filter {
            config_str.push_str(&format!("filter = \"{}\"\n", filter));
        }
        if let Some(primary) = &self.sensors.primary {
            config_str.push_str(&format!("primary = \"{}\"\n", primary));
        }
        if let Some(root) = &self.sensors.sys_root {
            config_str.push_str(&format!("sys_root = \"{}\"\n", root.display()));
        }
        config_str.push_str(&format!(
            "generic_dir = \"{}\"\nscript_timeout = {}\n\n",
            self.sensors.generic_dir.display(),
            self.sensors.script_timeout
        ));

        config_str.push_str(&format!("[LOGGING]\nlevel = {}\n", self.logging.level));

        fs::write(config_path, config_str)
            .context(format!("Failed to save config to {}", config_path.display()))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ini_file(content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.agent.interval, 10);
        assert_eq!(config.sensors.filter, None);
        assert_eq!(config.sensors.primary, None);
        assert_eq!(config.sensors.sys_root, None);
        assert_eq!(config.sensors.generic_dir, PathBuf::from("/generic-sensors"));
        assert_eq!(config.sensors.script_timeout(), Duration::from_secs(5));
        assert_eq!(config.get_log_level(), LevelFilter::Info);
    }

    #[test]
    fn test_from_file() {
        let temp_file = ini_file(
            "[AGENT]\ninterval = 30\n\n[SENSORS]\nfilter = \"-nvme*,gpu_temp\"\nprimary = \"cpu_temp\"\nsys_root = \"/host/sys\"\ngeneric_dir = \"/opt/sensors\"\nscript_timeout = 2\n\n[LOGGING]\nlevel = debug\n",
        );

        let config = AppConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(config.agent.interval, 30);
        assert_eq!(config.sensors.filter.as_deref(), Some("-nvme*,gpu_temp"));
        assert_eq!(config.sensors.primary.as_deref(), Some("cpu_temp"));
        assert_eq!(config.sensors.sys_root, Some(PathBuf::from("/host/sys")));
        assert_eq!(config.sensors.generic_dir, PathBuf::from("/opt/sensors"));
        assert_eq!(config.sensors.script_timeout(), Duration::from_secs(2));
        assert_eq!(config.get_log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let temp_file = ini_file("[LOGGING]\nlevel = warn\n");

        let config = AppConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(config.agent.interval, 10);
        assert_eq!(config.sensors, SensorsConfig::default());
        assert_eq!(config.get_log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_save_config() {
        let mut config = AppConfig::default();
        config.agent.interval = 15;
        config.sensors.filter = Some("cpu_temp".to_string());
        config.sensors.primary = Some("cpu_temp".to_string());
        config.sensors.script_timeout = 3;
        config.logging.level = "error".to_string();

        let temp_file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        config.save(temp_file.path()).unwrap();

        let loaded_config = AppConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(loaded_config.agent.interval, 15);
        assert_eq!(loaded_config.sensors, config.sensors);
        assert_eq!(loaded_config.get_log_level(), LevelFilter::Error);
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("SENSORS", ""),
            ("PRIMARY_SENSOR", "cpu_temp"),
            ("SYS_SENSORS", "/host/sys"),
        ]);
        let mut sensors = SensorsConfig {
            filter: Some("gpu_temp".to_string()),
            ..SensorsConfig::default()
        };
        sensors.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(sensors.filter.as_deref(), Some(""));
        assert_eq!(sensors.primary.as_deref(), Some("cpu_temp"));
        assert_eq!(sensors.sys_root, Some(PathBuf::from("/host/sys")));
        assert_eq!(sensors.generic_dir, PathBuf::from("/generic-sensors"));
    }

    #[test]
    fn test_unset_env_keeps_file_values() {
        let mut sensors = SensorsConfig {
            filter: Some("gpu_temp".to_string()),
            ..SensorsConfig::default()
        };
        sensors.apply_overrides(|_| None);
        assert_eq!(sensors.filter.as_deref(), Some("gpu_temp"));
    }

    #[test]
    fn test_invalid_log_level_falls_back_to_info() {
        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert_eq!(config.get_log_level(), LevelFilter::Info);
    }
}
