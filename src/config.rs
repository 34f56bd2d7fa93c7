use std::path::PathBuf;

use config::{Config, File};
use serde::Deserialize;

use crate::error::AppError;

/// Base name of the optional settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "webcam-dial";

pub const DEFAULT_ENDPOINT: &str = "https://api.example.com/dial/inference";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub inference: InferenceSettings,
    pub snapshots: SnapshotSettings,
    pub camera: CameraSettings,
    pub logging: LoggingSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceSettings {
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSettings {
    pub dir: PathBuf,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraSettings {
    /// Local device indices probed are `0..probe_devices`.
    pub probe_devices: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inference: InferenceSettings {
                endpoint: DEFAULT_ENDPOINT.to_string(),
            },
            snapshots: SnapshotSettings {
                dir: PathBuf::from("snapshots"),
                jpeg_quality: 95,
            },
            camera: CameraSettings { probe_devices: 4 },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
            ui: UiSettings {
                width: 960.0,
                height: 820.0,
            },
        }
    }
}

impl Settings {
    /// Loads the compiled defaults overlaid with `webcam-dial.{toml,yaml,json,...}`
    /// when present in the working directory.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(File::with_name(SETTINGS_FILE).required(false))
    }

    fn load_from<S>(source: S) -> Result<Self, AppError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Settings::default();
        let settings: Settings = Config::builder()
            .set_default("inference.endpoint", defaults.inference.endpoint)?
            .set_default(
                "snapshots.dir",
                defaults.snapshots.dir.to_string_lossy().to_string(),
            )?
            .set_default("snapshots.jpeg_quality", defaults.snapshots.jpeg_quality as i64)?
            .set_default("camera.probe_devices", defaults.camera.probe_devices as i64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("ui.width", defaults.ui.width as f64)?
            .set_default("ui.height", defaults.ui.height as f64)?
            .add_source(source)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.inference.endpoint.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "inference.endpoint must not be empty".to_string(),
            ));
        }
        if !(1..=100).contains(&self.snapshots.jpeg_quality) {
            return Err(AppError::InvalidConfig(format!(
                "snapshots.jpeg_quality must be between 1 and 100, got {}",
                self.snapshots.jpeg_quality
            )));
        }
        if self.camera.probe_devices == 0 {
            return Err(AppError::InvalidConfig(
                "camera.probe_devices must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Max level for the subscriber; unknown names fall back to INFO.
    pub fn log_level(&self) -> tracing::Level {
        self.logging
            .level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO)
    }

    pub fn has_valid_log_level(&self) -> bool {
        self.logging.level.parse::<tracing::Level>().is_ok()
    }
}
