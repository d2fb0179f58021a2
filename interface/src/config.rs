use crate::error::Result;
use brain::{Calibration, Celebration, SCAN_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "shape-drawer.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub calibration: Calibration,
    pub celebration: Celebration,
    pub scan: ScanConfig,
    pub simulation: SimulationConfig,
    pub bridge: BridgeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Time allowed to present a code, in seconds.
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_secs: SCAN_TIMEOUT.as_secs(),
            poll_interval_ms: 100,
        }
    }
}

impl ScanConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub wheel_base_cm: f64,
    /// Wheel speed at full motor power.
    pub full_speed_cm_s: f64,
    /// Block for each command's duration, as the real motors would.
    pub realtime: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // 90 degrees in ~643 ms at power 50
            wheel_base_cm: 13.6,
            full_speed_cm_s: 33.3,
            realtime: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub wheel_command_key: String,
    pub light_key: String,
    pub code_key: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            wheel_command_key: "rt/robot/wheel_commands".to_string(),
            light_key: "rt/robot/underlights".to_string(),
            code_key: "rt/camera/optical_code".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Where the drawing summary is written on exit.
    pub summary_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            summary_path: "shape_drawer_log.txt".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads `path` if given, else `shape-drawer.toml` when present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))
            }
            None => Ok(Self::default()),
        }
    }
}
