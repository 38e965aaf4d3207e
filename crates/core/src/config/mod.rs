use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{geometry::Point, shape::Color, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub frame: FrameConfig,
    pub layout: LayoutConfig,
    pub timeline: TimelineConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections fall back to their
    /// defaults so partial files are accepted.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        tracing::debug!(path = ?path.as_ref(), "loaded configuration");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Visible frame in scene units. The origin sits at the frame centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: f64,
    pub height: f64,
    pub fps: u32,
    pub background: Color,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 8.0 * 16.0 / 9.0,
            height: 8.0,
            fps: 30,
            background: Color::BLACK,
        }
    }
}

impl FrameConfig {
    /// Midpoint of the top frame edge.
    pub fn top(&self) -> Point {
        Point::new(0.0, self.height / 2.0)
    }
}

/// Spacing and text metrics used while laying out primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Buffer used by `next_to` when none is given.
    pub default_buff: f64,
    pub small_buff: f64,
    /// Gap an arrow leaves at both of its endpoints.
    pub arrow_buff: f64,
    pub arrow_tip_length: f64,
    /// Estimated advance of one glyph per point of font size.
    pub glyph_width_per_pt: f64,
    /// Estimated line height per point of font size.
    pub line_height_per_pt: f64,
    /// Stroke width for primitives whose style leaves it open.
    pub stroke_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_buff: 0.25,
            small_buff: 0.1,
            arrow_buff: 0.25,
            arrow_tip_length: 0.35,
            glyph_width_per_pt: 0.0055,
            line_height_per_pt: 0.0105,
            stroke_width: 4.0,
        }
    }
}

/// Default durations applied by the timeline builder, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub default_run_time: f64,
    pub default_wait: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_run_time: 1.0,
            default_wait: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "timeline": { "default_wait": 2.5 } }"#).unwrap();

        assert_eq!(config.timeline.default_wait, 2.5);
        assert_eq!(config.timeline.default_run_time, 1.0);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("beamviz-config-{}.json", std::process::id()));
        let mut expected = AppConfig::default();
        expected.frame.fps = 60;
        std::fs::write(&path, expected.to_json().unwrap()).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, expected);
    }

    #[test]
    fn frame_top_is_half_the_height_above_origin() {
        let frame = FrameConfig::default();
        assert_eq!(frame.top(), Point::new(0.0, 4.0));
    }
}
