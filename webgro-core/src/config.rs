use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::input::MotionMode;
use crate::keys::{KeyCode, REFRESH_KEY};
use crate::timer::msec_to_timer;

/// Runtime configuration, usually embedded by the page as a TOML string.
/// Every field is optional in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Id of the canvas element used as the screen.
    pub canvas_id: String,
    pub width: u32,
    pub height: u32,
    /// Frame loop period in milliseconds.
    pub frame_interval_ms: f64,
    /// Key whose default browser action is never suppressed.
    pub refresh_key: KeyCode,
    /// Sum mouse motion over a frame instead of keeping the last event only.
    pub accumulate_motion: bool,
    /// One of error, warn, info, debug, trace.
    pub log_level: String,
    /// Font file registered as the default font when graphics are set up.
    /// Empty uses the browser's `monospace` instead.
    pub font_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_id: "canvas".to_string(),
            width: 640,
            height: 480,
            frame_interval_ms: 1000.0 / 60.0,
            refresh_key: REFRESH_KEY,
            accumulate_motion: true,
            log_level: "info".to_string(),
            font_url: "vga.ttf".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn log_level(&self) -> Result<log::Level> {
        self.log_level
            .parse()
            .map_err(|_| Error::Config(format!("unknown log level `{}`", self.log_level)))
    }

    pub fn frame_interval(&self) -> Duration {
        msec_to_timer(self.frame_interval_ms)
    }

    pub fn motion_mode(&self) -> MotionMode {
        if self.accumulate_motion {
            MotionMode::Accumulate
        } else {
            MotionMode::Overwrite
        }
    }
}
