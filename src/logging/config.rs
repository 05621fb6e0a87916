//! Logging configuration
//!
//! Per-stage log levels, output destinations and presets for the tracing
//! subscriber set up in [`super::init_logging`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level (trace, debug, info, warn, error)
    pub global_level: String,

    /// Enable console output
    pub console_output: bool,

    /// Directory for JSON log files (None = no file logging)
    pub log_directory: Option<PathBuf>,

    /// Include file location in console logs
    pub include_file_location: bool,

    /// Level for the circle detector
    pub detection_level: String,

    /// Level for the interactive edit session
    pub session_level: String,

    /// Level for row clustering
    pub clustering_level: String,

    /// Level for table export
    pub export_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global_level: "info".to_string(),
            console_output: true,
            log_directory: None,
            include_file_location: false,
            detection_level: "info".to_string(),
            session_level: "info".to_string(),
            clustering_level: "info".to_string(),
            export_level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Verbose preset for working on the detector and session
    pub fn development() -> Self {
        Self {
            global_level: "debug".to_string(),
            console_output: true,
            log_directory: Some(PathBuf::from("logs")),
            include_file_location: true,
            detection_level: "trace".to_string(),
            session_level: "debug".to_string(),
            clustering_level: "trace".to_string(),
            export_level: "debug".to_string(),
        }
    }

    /// Same settings with every level replaced by `level`.
    pub fn with_level(mut self, level: &str) -> Self {
        self.global_level = level.to_string();
        self.detection_level = level.to_string();
        self.session_level = level.to_string();
        self.clustering_level = level.to_string();
        self.export_level = level.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        let levels = [
            ("global_level", &self.global_level),
            ("detection_level", &self.detection_level),
            ("session_level", &self.session_level),
            ("clustering_level", &self.clustering_level),
            ("export_level", &self.export_level),
        ];

        for (name, level) in levels {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(format!(
                    "Invalid {}: {}. Must be one of: {:?}",
                    name, level, VALID_LEVELS
                ));
            }
        }

        if let Some(ref log_dir) = self.log_directory {
            if let Some(parent) = log_dir.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(format!("Log directory parent does not exist: {:?}", parent));
                }
            }
        }

        Ok(())
    }

    /// Effective level for a pipeline component
    pub fn component_level(&self, component: &str) -> &str {
        match component {
            "detection" => &self.detection_level,
            "session" => &self.session_level,
            "clustering" => &self.clustering_level,
            "export" => &self.export_level,
            _ => &self.global_level,
        }
    }

    /// `EnvFilter` directives: the global level for this crate plus one
    /// directive per component module.
    pub fn filter_directives(&self) -> String {
        let krate = env!("CARGO_PKG_NAME").replace('-', "_");
        let mut directives = vec![format!("{}={}", krate, self.global_level)];
        for (component, module) in [
            ("detection", "detection"),
            ("session", "session"),
            ("clustering", "clustering"),
            ("export", "export"),
        ] {
            directives.push(format!(
                "{}::{}={}",
                krate,
                module,
                self.component_level(component)
            ));
        }
        directives.join(",")
    }
}
