use crate::pipeline::{InteractiveSurface, PipelineError, PipelineResult};
use crate::session::SessionEvent;
use opencv::core::Mat;
use opencv::highgui;
use opencv::prelude::*;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// OpenCV highgui window driving an edit session.
///
/// The mouse callback is registered once when the window opens and only
/// forwards gestures into a channel; the session applies them on its own
/// thread between frames.
pub struct HighGuiSurface {
    window: String,
    events: Receiver<SessionEvent>,
    quit_key: char,
    event_wait_ms: i32,
}

impl HighGuiSurface {
    pub fn open(window: &str, quit_key: char, event_wait_ms: i32) -> PipelineResult<Self> {
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)?;

        let (tx, rx) = mpsc::channel();
        highgui::set_mouse_callback(
            window,
            Some(Box::new(move |event, x, y, _flags| {
                let gesture = match event {
                    highgui::EVENT_LBUTTONDOWN => SessionEvent::Add { x, y },
                    highgui::EVENT_RBUTTONDOWN => SessionEvent::Remove { x, y },
                    _ => return,
                };
                // Receiver only goes away with the surface itself.
                let _ = tx.send(gesture);
            })),
        )?;

        tracing::info!(window, quit_key = %quit_key, "Editor window opened: left click adds, right click removes");
        Ok(Self {
            window: window.to_string(),
            events: rx,
            quit_key,
            event_wait_ms,
        })
    }

    fn window_closed(&self) -> PipelineResult<bool> {
        let visible = highgui::get_window_property(&self.window, highgui::WND_PROP_VISIBLE)?;
        Ok(reports_closed(visible))
    }
}

/// Only an explicit 0 means the window is gone. Backends without the
/// visibility property answer -1, which leaves the window open.
fn reports_closed(visible: f64) -> bool {
    visible == 0.0
}

impl InteractiveSurface for HighGuiSurface {
    fn present(&mut self, frame: &Mat) -> PipelineResult<()> {
        highgui::imshow(&self.window, frame)?;
        Ok(())
    }

    fn next_event(&mut self) -> PipelineResult<SessionEvent> {
        loop {
            match self.events.try_recv() {
                Ok(event) => return Ok(event),
                Err(TryRecvError::Disconnected) => return Ok(SessionEvent::Finish),
                Err(TryRecvError::Empty) => {}
            }

            // wait_key blocks in the GUI event loop; mouse callbacks fire from
            // inside it, so queued gestures are checked after every return.
            let key = highgui::wait_key(self.event_wait_ms)?;
            if key >= 0 && char::from((key & 0xFF) as u8) == self.quit_key {
                tracing::debug!("Quit key pressed");
                return Ok(SessionEvent::Finish);
            }
            if self.window_closed()? {
                tracing::debug!("Editor window closed");
                return Ok(SessionEvent::Finish);
            }
        }
    }
}

impl Drop for HighGuiSurface {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.window) {
            tracing::warn!(error = %e, "Failed to destroy editor window");
        }
    }
}

/// Replays a fixed list of gestures, then reports `Finish`.
#[derive(Default)]
pub struct ScriptedSurface {
    events: VecDeque<SessionEvent>,
    frames_presented: usize,
    last_frame: Option<Mat>,
}

impl ScriptedSurface {
    pub fn new(events: Vec<SessionEvent>) -> Self {
        Self {
            events: events.into(),
            ..Self::default()
        }
    }

    /// Load gestures from a JSON array such as
    /// `[{"action": "add", "x": 10, "y": 20}, {"action": "finish"}]`.
    pub fn from_json_file(path: &Path) -> PipelineResult<Self> {
        let script_error = |source: anyhow::Error| PipelineError::EditScript {
            path: path.to_path_buf(),
            source,
        };
        let content = std::fs::read_to_string(path).map_err(|e| script_error(e.into()))?;
        let events: Vec<SessionEvent> =
            serde_json::from_str(&content).map_err(|e| script_error(e.into()))?;
        tracing::debug!(path = %path.display(), events = events.len(), "Loaded edit script");
        Ok(Self::new(events))
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    pub fn last_frame(&self) -> Option<&Mat> {
        self.last_frame.as_ref()
    }

    pub fn remaining_events(&self) -> usize {
        self.events.len()
    }
}

impl InteractiveSurface for ScriptedSurface {
    fn present(&mut self, frame: &Mat) -> PipelineResult<()> {
        self.frames_presented += 1;
        self.last_frame = Some(frame.try_clone()?);
        Ok(())
    }

    fn next_event(&mut self) -> PipelineResult<SessionEvent> {
        Ok(self.events.pop_front().unwrap_or(SessionEvent::Finish))
    }
}
