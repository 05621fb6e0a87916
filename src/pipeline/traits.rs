use crate::pipeline::{Feature, PipelineResult};
use crate::session::SessionEvent;
use opencv::core::Mat;
use std::path::PathBuf;

/// Turns a decoded raster into candidate tube features.
pub trait FeatureDetector {
    /// Returns the name of the detector for logging
    fn name(&self) -> &str;

    /// Detect features in a BGR image. An empty vector means the image was
    /// valid but nothing was found.
    fn detect(&self, image: &Mat) -> PipelineResult<Vec<Feature>>;
}

/// Rendering surface plus pointer/key input for the edit session.
pub trait InteractiveSurface {
    /// Show a freshly rendered frame.
    fn present(&mut self, frame: &Mat) -> PipelineResult<()>;

    /// Block until the next user gesture.
    fn next_event(&mut self) -> PipelineResult<SessionEvent>;
}

/// Chooses where the table goes. `None` means the user cancelled.
pub trait DestinationPicker {
    fn choose(&mut self, default_extension: &str) -> PipelineResult<Option<PathBuf>>;
}

/// User-facing messages (acknowledgements and failures).
pub trait Notifier {
    fn info(&mut self, message: &str);
    fn warn(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Writes messages to stdout/stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&mut self, message: &str) {
        println!("{}", message);
    }

    fn warn(&mut self, message: &str) {
        eprintln!("warning: {}", message);
    }

    fn error(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }
}
