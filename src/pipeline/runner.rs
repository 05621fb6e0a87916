use crate::clustering::{assignments_from_rows, RowClusterer};
use crate::config::Config;
use crate::detection::HoughCircleDetector;
use crate::export::TableExporter;
use crate::logging::{self, StageSpan};
use crate::pipeline::{
    Assignment, DestinationPicker, FeatureDetector, FeatureSet, InteractiveSurface, Notifier,
    PipelineError, PipelineResult, Row,
};
use crate::session::{EditSession, SessionSummary};
use crate::utils::{load_rgb_image, rgbimage_to_mat};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// How the export stage ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    Written { path: PathBuf },
    /// No destination chosen; nothing was written.
    Cancelled,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub session: SessionSummary,
    pub rows: Vec<Row>,
    pub assignments: Vec<Assignment>,
    pub export: ExportOutcome,
}

impl RunReport {
    pub fn tube_count(&self) -> usize {
        self.assignments.len()
    }
}

/// Detect → edit → cluster → export, strictly in sequence on one thread.
pub struct TubeMapPipeline {
    config: Config,
    detector: Box<dyn FeatureDetector>,
    overlay_path: Option<PathBuf>,
}

impl TubeMapPipeline {
    pub fn new(config: Config) -> Self {
        let detector = Box::new(HoughCircleDetector::new(config.detector.clone()));
        Self::with_detector(config, detector)
    }

    pub fn with_detector(config: Config, detector: Box<dyn FeatureDetector>) -> Self {
        Self {
            config,
            detector,
            overlay_path: None,
        }
    }

    /// Save the final overlay image here once editing ends.
    pub fn with_overlay(mut self, path: Option<PathBuf>) -> Self {
        self.overlay_path = path;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode the image and seed an edit session with its detections.
    ///
    /// Fails with `InputDecode` before any detection is attempted, and with
    /// `NoFeaturesDetected` when the image is valid but yields nothing.
    pub fn prepare(&self, image_path: &Path) -> PipelineResult<EditSession> {
        let stage = StageSpan::new("detection");
        let result = stage.span().in_scope(|| {
            let rgb = load_rgb_image(image_path)?;
            tracing::info!(
                path = %image_path.display(),
                width = rgb.width(),
                height = rgb.height(),
                detector = self.detector.name(),
                "Image loaded"
            );
            let image = rgbimage_to_mat(&rgb)?;
            let detected = self.detector.detect(&image)?;
            if detected.is_empty() {
                return Err(PipelineError::NoFeaturesDetected {
                    path: image_path.to_path_buf(),
                });
            }
            Ok(EditSession::new(image, detected, self.config.session.clone()))
        });

        match &result {
            Ok(session) => {
                stage.record_counts(0, session.features().len());
                stage.finish(true, &format!("{} tubes detected", session.features().len()));
            }
            Err(e) => stage.finish(false, &e.to_string()),
        }
        result
    }

    /// Drive the session against `surface` until the user finishes.
    pub fn edit<S: InteractiveSurface + ?Sized>(
        &self,
        session: &mut EditSession,
        surface: &mut S,
    ) -> PipelineResult<SessionSummary> {
        let stage = StageSpan::new("edit_session");
        let result = stage.span().in_scope(|| session.run(surface));
        match &result {
            Ok(summary) => {
                stage.record_counts(summary.initial, summary.remaining);
                stage.finish(
                    true,
                    &format!("{} added, {} removed", summary.added, summary.removed),
                );
            }
            Err(e) => stage.finish(false, &e.to_string()),
        }
        result
    }

    /// Group the final feature set into numbered rows.
    pub fn cluster(&self, features: &FeatureSet) -> PipelineResult<Vec<Row>> {
        let stage = StageSpan::new("clustering");
        let clusterer = RowClusterer::new(&self.config.clustering);
        let result = stage
            .span()
            .in_scope(|| clusterer.group_rows(features.as_slice()));
        match &result {
            Ok(rows) => {
                stage.record_counts(features.len(), rows.len());
                stage.finish(true, &format!("{} rows", rows.len()));
            }
            Err(e) => stage.finish(false, &e.to_string()),
        }
        result
    }

    /// Ask for a destination and write the table there.
    pub fn export(
        &self,
        assignments: &[Assignment],
        picker: &mut dyn DestinationPicker,
        notifier: &mut dyn Notifier,
    ) -> PipelineResult<ExportOutcome> {
        if assignments.is_empty() {
            return Err(PipelineError::EmptyFeatureSet);
        }

        let stage = StageSpan::new("export");
        let exporter = TableExporter::new(self.config.export.clone());
        let result = stage.span().in_scope(|| {
            let Some(chosen) = picker.choose(exporter.default_extension())? else {
                tracing::info!("Export cancelled, no destination chosen");
                return Ok(ExportOutcome::Cancelled);
            };
            let path = exporter.write(assignments, &chosen)?;
            Ok(ExportOutcome::Written { path })
        });

        match &result {
            Ok(ExportOutcome::Written { path }) => {
                stage.record_counts(assignments.len(), assignments.len());
                stage.finish(true, &format!("written to {}", path.display()));
            }
            Ok(ExportOutcome::Cancelled) => stage.finish(true, "cancelled"),
            Err(e) => stage.finish(false, &e.to_string()),
        }

        if let Ok(ExportOutcome::Written { path }) = &result {
            let rows = assignments.last().map_or(0, |a| a.row);
            notifier.info(&format!(
                "Table saved to {} ({} rows, {} tubes)",
                path.display(),
                rows,
                assignments.len()
            ));
        }
        result
    }

    /// Run the whole pipeline for one image.
    ///
    /// `open_surface` is only called once detection has produced something
    /// to edit. Quitting the session still proceeds to clustering and export
    /// with whatever features remain.
    pub fn run<S, F>(
        &self,
        image_path: &Path,
        open_surface: F,
        picker: &mut dyn DestinationPicker,
        notifier: &mut dyn Notifier,
    ) -> PipelineResult<RunReport>
    where
        S: InteractiveSurface,
        F: FnOnce(&EditSession) -> PipelineResult<S>,
    {
        let run_id = logging::new_correlation_id();
        let run_span = tracing::info_span!("pipeline_run", run_id = %run_id, image = %image_path.display());
        let result = run_span.in_scope(|| {
            let mut session = self.prepare(image_path)?;
            let summary = {
                let mut surface = open_surface(&session)?;
                self.edit(&mut session, &mut surface)?
            };

            if let Some(ref overlay) = self.overlay_path {
                session.save_overlay(overlay)?;
            }

            let features = session.into_features();
            let rows = self.cluster(&features)?;
            let assignments = assignments_from_rows(&rows);
            let export = self.export(&assignments, picker, notifier)?;

            Ok(RunReport {
                run_id,
                session: summary,
                rows,
                assignments,
                export,
            })
        });
        logging::clear_correlation_id();
        result
    }
}
