use std::path::PathBuf;

/// Failures a pipeline run can end with.
///
/// Cancelling the save destination is not listed here; it is a normal
/// outcome (`ExportOutcome::Cancelled`).
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("could not decode '{}' as an image", path.display())]
    InputDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no tubes detected in '{}'", path.display())]
    NoFeaturesDetected { path: PathBuf },
    #[error("every tube was removed during editing; nothing to number or export")]
    EmptyFeatureSet,
    #[error("failed to write table to '{}'", path.display())]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read edit script '{}'", path.display())]
    EditScript {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Backend(#[from] opencv::Error),
}

impl PipelineError {
    /// `false` for the "nothing to do" outcomes that end a run without a
    /// failure: no detections, or everything removed during editing.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PipelineError::NoFeaturesDetected { .. } | PipelineError::EmptyFeatureSet
        )
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(!PipelineError::EmptyFeatureSet.is_fatal());
        assert!(!PipelineError::NoFeaturesDetected { path: PathBuf::from("a.png") }.is_fatal());
        let write = PipelineError::ExportWrite {
            path: PathBuf::from("out.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(write.is_fatal());
        assert_eq!(write.to_string(), "failed to write table to 'out.csv'");
    }
}
