//! Interactive correction of detected features
//!
//! [`EditSession`] owns the live [`FeatureSet`] and the untouched source
//! image. A surface feeds it pointer gestures one at a time; after each one
//! the overlay is re-rendered from scratch on a copy of the source.

pub mod surface;

use crate::config::SessionConfig;
use crate::pipeline::{Feature, FeatureSet, InteractiveSurface, PipelineResult};
use opencv::core::{Mat, Point, Scalar, Vector};
use opencv::imgcodecs;
use opencv::imgproc;
use opencv::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use surface::*;

/// Outline color (BGR)
const OUTLINE_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const OUTLINE_THICKNESS: i32 = 2;
/// Center dot color (BGR)
const CENTER_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0);
const CENTER_RADIUS: i32 = 1;
const CENTER_THICKNESS: i32 = 3;

/// One user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Primary button: place a feature
    Add { x: i32, y: i32 },
    /// Secondary button: drop the first feature within reach
    Remove { x: i32, y: i32 },
    /// Quit key or window closed
    Finish,
}

/// What happened during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub initial: usize,
    pub added: usize,
    pub removed: usize,
    pub missed_removals: usize,
    pub frames: usize,
    pub remaining: usize,
}

pub struct EditSession {
    image: Mat,
    features: FeatureSet,
    config: SessionConfig,
    summary: SessionSummary,
}

impl EditSession {
    /// Seed a session with detector output over the original image.
    pub fn new(image: Mat, detected: Vec<Feature>, config: SessionConfig) -> Self {
        let summary = SessionSummary {
            initial: detected.len(),
            remaining: detected.len(),
            ..SessionSummary::default()
        };
        Self {
            image,
            features: FeatureSet::from(detected),
            config,
            summary,
        }
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn image(&self) -> &Mat {
        &self.image
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Append a feature with the default radius. Overlaps are allowed.
    pub fn add_feature(&mut self, x: i32, y: i32) -> Feature {
        let feature = Feature::new(x, y, self.config.default_radius);
        self.features.push(feature);
        self.summary.added += 1;
        self.summary.remaining = self.features.len();
        tracing::debug!(x, y, radius = feature.radius, "Added feature");
        feature
    }

    /// Remove the first feature whose center is closer than its radius plus
    /// the removal tolerance. At most one feature goes per call.
    pub fn remove_feature(&mut self, x: i32, y: i32) -> Option<Feature> {
        let removed = self
            .features
            .remove_first_within(x, y, self.config.removal_tolerance);
        match removed {
            Some(feature) => {
                self.summary.removed += 1;
                tracing::debug!(x = feature.x, y = feature.y, radius = feature.radius, "Removed feature");
            }
            None => {
                self.summary.missed_removals += 1;
                tracing::debug!(x, y, "No feature within reach of removal click");
            }
        }
        self.summary.remaining = self.features.len();
        removed
    }

    /// Apply one gesture. Returns `false` once the session should end.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Add { x, y } => {
                self.add_feature(x, y);
                true
            }
            SessionEvent::Remove { x, y } => {
                self.remove_feature(x, y);
                true
            }
            SessionEvent::Finish => false,
        }
    }

    /// Draw every current feature over a copy of the source image.
    pub fn render(&self) -> PipelineResult<Mat> {
        let mut frame = self.image.try_clone()?;
        let outline = Scalar::new(OUTLINE_COLOR.0, OUTLINE_COLOR.1, OUTLINE_COLOR.2, 0.0);
        let center = Scalar::new(CENTER_COLOR.0, CENTER_COLOR.1, CENTER_COLOR.2, 0.0);

        for feature in &self.features {
            let at = Point::new(feature.x, feature.y);
            imgproc::circle(&mut frame, at, feature.radius, outline, OUTLINE_THICKNESS, imgproc::LINE_8, 0)?;
            imgproc::circle(&mut frame, at, CENTER_RADIUS, center, CENTER_THICKNESS, imgproc::LINE_8, 0)?;
        }

        Ok(frame)
    }

    /// Write the current overlay to an image file.
    pub fn save_overlay(&self, path: &Path) -> PipelineResult<()> {
        let frame = self.render()?;
        let written = imgcodecs::imwrite(&path.to_string_lossy(), &frame, &Vector::new())?;
        if !written {
            return Err(opencv::Error::new(
                opencv::core::StsError,
                format!("could not write overlay to {}", path.display()),
            )
            .into());
        }
        tracing::info!(path = %path.display(), "Overlay saved");
        Ok(())
    }

    /// Present, then handle gestures until the surface reports `Finish`.
    ///
    /// Each gesture is applied and re-rendered before the next one is read.
    pub fn run<S: InteractiveSurface + ?Sized>(&mut self, surface: &mut S) -> PipelineResult<SessionSummary> {
        surface.present(&self.render()?)?;
        self.summary.frames += 1;

        loop {
            let event = surface.next_event()?;
            if !self.apply(event) {
                break;
            }
            surface.present(&self.render()?)?;
            self.summary.frames += 1;
        }

        tracing::info!(
            initial = self.summary.initial,
            added = self.summary.added,
            removed = self.summary.removed,
            remaining = self.summary.remaining,
            "Edit session finished"
        );
        Ok(self.summary.clone())
    }

    /// End the session and hand over the final feature set.
    pub fn into_features(self) -> FeatureSet {
        self.features
    }
}
