//! Stage spans for pipeline runs
//!
//! Each stage of a run (detection, edit session, clustering, export) is
//! wrapped in a [`StageSpan`] so its counts and timing land on one span,
//! tagged with the run's correlation id.

use std::time::Instant;
use tracing::{field, span, Level, Span};

pub struct StageSpan {
    span: Span,
    start_time: Instant,
    stage: &'static str,
}

impl StageSpan {
    /// Open a span for `stage`, picking up the thread's correlation id.
    pub fn new(stage: &'static str) -> Self {
        let span = match crate::logging::get_correlation_id() {
            Some(corr_id) => span!(
                Level::INFO,
                "pipeline_stage",
                stage = stage,
                correlation_id = %corr_id,
                items_in = field::Empty,
                items_out = field::Empty,
                success = field::Empty,
                execution_time_ms = field::Empty
            ),
            None => span!(
                Level::INFO,
                "pipeline_stage",
                stage = stage,
                items_in = field::Empty,
                items_out = field::Empty,
                success = field::Empty,
                execution_time_ms = field::Empty
            ),
        };

        Self {
            span,
            start_time: Instant::now(),
            stage,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_counts(&self, items_in: usize, items_out: usize) {
        self.span.record("items_in", items_in);
        self.span.record("items_out", items_out);
        tracing::debug!(
            parent: &self.span,
            items_in = items_in,
            items_out = items_out,
            "{} counts",
            self.stage
        );
    }

    /// Close out the stage with its outcome and elapsed time.
    pub fn finish(self, success: bool, description: &str) {
        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        self.span.record("success", success);
        self.span.record("execution_time_ms", elapsed_ms);

        if success {
            tracing::info!(
                parent: &self.span,
                execution_time_ms = elapsed_ms,
                "{} completed: {}",
                self.stage,
                description
            );
        } else {
            tracing::warn!(
                parent: &self.span,
                execution_time_ms = elapsed_ms,
                "{} failed: {}",
                self.stage,
                description
            );
        }
    }
}
