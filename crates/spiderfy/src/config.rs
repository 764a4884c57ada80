use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Resolved tunables for one [`crate::Spiderfier`]. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub animate: bool,
    pub animation_duration: Duration,
    pub use_custom_proxy_visual: bool,
    pub circle_to_spiral_threshold: usize,
    pub circle_foot_separation: f64,
    pub spiral_foot_separation: f64,
    pub spiral_length_start: f64,
    pub spiral_length_growth: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            animate: false,
            animation_duration: Duration::ZERO,
            use_custom_proxy_visual: false,
            circle_to_spiral_threshold: 9,
            circle_foot_separation: 25.0,
            spiral_foot_separation: 28.0,
            spiral_length_start: 15.0,
            spiral_length_growth: 4.0,
        }
    }
}

/// User overrides. Every field is optional; a present value always wins over
/// the default, including `false` and `0`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpiderOptions {
    pub animate: Option<bool>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(rename = "animation_duration_ms")]
    pub animation_duration: Option<Duration>,
    pub use_custom_proxy_visual: Option<bool>,
    pub circle_to_spiral_threshold: Option<usize>,
    pub circle_foot_separation: Option<f64>,
    pub spiral_foot_separation: Option<f64>,
    pub spiral_length_start: Option<f64>,
    #[serde(rename = "spiral_length_factor")]
    pub spiral_length_growth: Option<f64>,
}

impl Settings {
    pub fn merge(defaults: &Settings, options: &SpiderOptions) -> Settings {
        Settings {
            animate: options.animate.unwrap_or(defaults.animate),
            animation_duration: options
                .animation_duration
                .unwrap_or(defaults.animation_duration),
            use_custom_proxy_visual: options
                .use_custom_proxy_visual
                .unwrap_or(defaults.use_custom_proxy_visual),
            circle_to_spiral_threshold: options
                .circle_to_spiral_threshold
                .unwrap_or(defaults.circle_to_spiral_threshold),
            circle_foot_separation: options
                .circle_foot_separation
                .unwrap_or(defaults.circle_foot_separation),
            spiral_foot_separation: options
                .spiral_foot_separation
                .unwrap_or(defaults.spiral_foot_separation),
            spiral_length_start: options
                .spiral_length_start
                .unwrap_or(defaults.spiral_length_start),
            spiral_length_growth: options
                .spiral_length_growth
                .unwrap_or(defaults.spiral_length_growth),
        }
    }

    pub fn from_options(options: &SpiderOptions) -> Result<Settings, ConfigError> {
        let settings = Self::merge(&Settings::default(), options);
        settings.validate()?;
        Ok(settings)
    }

    /// Layout divides by the spiral length and by the accumulated angle, so
    /// both seeds must be strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("circle_foot_separation", self.circle_foot_separation),
            ("spiral_foot_separation", self.spiral_foot_separation),
            ("spiral_length_start", self.spiral_length_start),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        if !self.spiral_length_growth.is_finite() || self.spiral_length_growth < 0.0 {
            return Err(ConfigError::Invalid {
                field: "spiral_length_factor",
                value: self.spiral_length_growth,
            });
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: f64 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "spiderfy", "spiderfy").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Reads overrides from an optional TOML file, then `SPIDERFY_*` variables.
pub fn load_options(path: &Path) -> Result<SpiderOptions, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("SPIDERFY").try_parsing(true))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };
    Settings::from_options(&load_options(&path)?)
}

pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = get_config_path()?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
