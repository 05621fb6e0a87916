use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub session: SessionConfig,
    pub clustering: ClusteringConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Parameters for the Hough circle transform and its pre-smoothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Inverse accumulator resolution
    pub dp: f64,
    /// Minimum distance between detected centers, px
    pub min_center_distance: f64,
    /// Upper Canny threshold used by the gradient method
    pub canny_threshold: f64,
    /// Accumulator votes needed to accept a center
    pub accumulator_threshold: f64,
    pub min_radius: i32,
    pub max_radius: i32,
    /// Gaussian kernel side, must be odd
    pub blur_kernel_size: i32,
    /// 0.0 derives sigma from the kernel size
    pub blur_sigma: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub window_title: String,
    /// Radius given to manually added features, px
    pub default_radius: i32,
    /// Extra reach beyond a feature's radius for removal clicks, px
    pub removal_tolerance: f64,
    pub quit_key: char,
    /// Upper bound on one GUI event dispatch wait, ms
    pub event_wait_ms: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Max vertical gap to the previous row member, px
    pub row_tolerance: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub default_extension: String,
    pub row_header: String,
    pub tube_header: String,
    pub delimiter: char,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            dp: 1.0,
            min_center_distance: 15.0,
            canny_threshold: 10.0,
            accumulator_threshold: 8.0,
            min_radius: 3,
            max_radius: 5,
            blur_kernel_size: 5,
            blur_sigma: 0.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_title: "Tube editor".to_string(),
            default_radius: 5,
            removal_tolerance: 10.0,
            quit_key: 'q',
            event_wait_ms: 30,
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self { row_tolerance: 10 }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_extension: "csv".to_string(),
            row_header: "row".to_string(),
            tube_header: "tube".to_string(),
            delimiter: ',',
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path)?;

        if content.trim_start().starts_with('{') {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ConfigFormat) -> crate::Result<()> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let detector = &self.detector;

        if detector.dp <= 0.0 {
            errors.push("detector.dp must be positive".to_string());
        }

        if detector.min_center_distance <= 0.0 {
            errors.push("detector.min_center_distance must be positive".to_string());
        }

        if detector.canny_threshold <= 0.0 || detector.accumulator_threshold <= 0.0 {
            errors.push("detector thresholds must be positive".to_string());
        }

        if detector.min_radius <= 0 {
            errors.push("detector.min_radius must be positive".to_string());
        }

        if detector.min_radius > detector.max_radius {
            errors.push("detector.min_radius must not exceed max_radius".to_string());
        }

        if detector.blur_kernel_size <= 0 || detector.blur_kernel_size % 2 == 0 {
            errors.push("detector.blur_kernel_size must be a positive odd number".to_string());
        }

        if detector.blur_sigma < 0.0 {
            errors.push("detector.blur_sigma must be non-negative".to_string());
        }

        if self.session.default_radius <= 0 {
            errors.push("session.default_radius must be positive".to_string());
        }

        if self.session.removal_tolerance < 0.0 {
            errors.push("session.removal_tolerance must be non-negative".to_string());
        }

        if self.session.event_wait_ms <= 0 {
            errors.push("session.event_wait_ms must be positive".to_string());
        }

        if self.clustering.row_tolerance < 0 {
            errors.push("clustering.row_tolerance must be non-negative".to_string());
        }

        let export = &self.export;
        if export.default_extension.is_empty() || export.default_extension.contains('.') {
            errors.push("export.default_extension must be a bare extension like \"csv\"".to_string());
        }

        if !export.delimiter.is_ascii() || export.delimiter == '"' || export.delimiter == '\n' {
            errors.push("export.delimiter must be a single ASCII character other than a quote or newline".to_string());
        }

        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    Json,
    Toml,
}

/// Load the configuration at `config_path`, falling back to defaults when it
/// is missing, unreadable or invalid.
pub fn load_config_or_default(config_path: Option<&Path>) -> Config {
    match config_path {
        Some(path) => match Config::load_from_file(path) {
            Ok(config) => {
                if let Err(errors) = config.validate() {
                    for error in &errors {
                        tracing::warn!(path = %path.display(), "Configuration error: {}", error);
                    }
                    tracing::warn!("Using default configuration instead");
                    Config::default()
                } else {
                    config
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        },
        None => Config::default(),
    }
}
