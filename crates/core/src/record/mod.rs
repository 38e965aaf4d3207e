use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    render::{RenderItem, Renderer, Transition},
    BeamVizError, Result,
};

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_path: String,
    pub fps: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_path: String::new(),
            fps: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCall {
    Display { items: Vec<RenderItem> },
    Animate { transition: Transition, run_time: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedCall {
    pub at_seconds: f64,
    pub first_frame: u64,
    pub call: RenderCall,
}

/// Renderer that keeps every call in submission order so a scene can be
/// replayed by an external engine or inspected in tests.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
    calls: Vec<RecordedCall>,
    elapsed: f64,
    is_recording: bool,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            calls: Vec::new(),
            elapsed: 0.0,
            is_recording: false,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(BeamVizError::msg("recorder is already running"));
        }
        self.calls.clear();
        self.elapsed = 0.0;
        self.is_recording = true;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.is_recording = false;
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_at(self.elapsed)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.calls)?)
    }

    /// Writes the call log to the configured output path.
    pub fn save(&self) -> Result<()> {
        if self.settings.output_path.is_empty() {
            return Err(BeamVizError::msg("recording has no output path"));
        }
        self.save_to(&self.settings.output_path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        tracing::info!(path = ?path.as_ref(), calls = self.calls.len(), "saved recording");
        Ok(())
    }

    fn frame_at(&self, seconds: f64) -> u64 {
        (seconds * self.settings.fps as f64).round() as u64
    }

    fn push(&mut self, call: RenderCall, duration: f64) -> Result<()> {
        if !self.is_recording {
            return Err(BeamVizError::msg("recorder is not running"));
        }
        self.calls.push(RecordedCall {
            at_seconds: self.elapsed,
            first_frame: self.frame_at(self.elapsed),
            call,
        });
        self.elapsed += duration;
        Ok(())
    }
}

impl Renderer for Recorder {
    fn display(&mut self, items: &[RenderItem]) -> Result<()> {
        self.push(
            RenderCall::Display {
                items: items.to_vec(),
            },
            0.0,
        )
    }

    fn animate(&mut self, transition: &Transition, run_time: f64) -> Result<()> {
        self.push(
            RenderCall::Animate {
                transition: transition.clone(),
                run_time,
            },
            run_time,
        )
    }
}
