//! Reader settings
//!
//! JSON, every field optional:
//!
//! ```json
//! {
//!   "sample_rate": 48000.0,
//!   "buffer_size": 256,
//!   "thread_mode": "event",
//!   "brightness": 1.0,
//!   "udp": { "remote_port": 8000 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ls_core::{LsError, LsResult, ThreadMode, UdpConfig, DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE};

/// Stream and reader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Audio sample rate (Hz)
    pub sample_rate: f64,
    /// Audio callback size (samples per channel)
    pub buffer_size: usize,
    pub thread_mode: ThreadMode,
    /// Output brightness 0.0 - 1.0
    pub brightness: f32,
    /// Relay decoded samples over UDP when set
    pub udp: Option<UdpConfig>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            thread_mode: ThreadMode::default(),
            brightness: 1.0,
            udp: None,
        }
    }
}

impl ReaderSettings {
    /// Load and validate settings from a JSON file
    pub fn load_from<P: AsRef<Path>>(path: P) -> LsResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let settings = Self::from_json(&content)
            .map_err(|e| LsError::Settings(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded reader settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> LsResult<Self> {
        let settings: Self = serde_json::from_str(json).map_err(|e| LsError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> LsResult<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(LsError::InvalidParam(format!("sample_rate {}", self.sample_rate)));
        }
        if self.buffer_size == 0 {
            return Err(LsError::InvalidParam("buffer_size 0".into()));
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(LsError::InvalidParam(format!("brightness {}", self.brightness)));
        }
        Ok(())
    }
}
