#![allow(dead_code)]

pub mod synthetic_image;

use tube_layout::Notifier;

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub infos: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
