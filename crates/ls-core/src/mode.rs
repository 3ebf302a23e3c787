//! Reader thread modes

use std::fmt;
use std::str::FromStr;

use crate::LsError;

/// Strategy the reader thread uses to wait for decoded data.
///
/// | Mode  | Jitter       | Realtime safe | CPU     |
/// |-------|--------------|---------------|---------|
/// | Sleep | 1 - 10 ms    | yes           | low     |
/// | Event | 10 - 800 µs  | no            | lowest  |
/// | Loop  | < 1 - 300 µs | yes           | highest |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ThreadMode {
    /// Sleep ~1 ms between polls ("safe")
    #[default]
    Sleep = 0,
    /// Block until the decoder notifies ("efficient")
    Event = 1,
    /// Busy-poll without yielding ("performance")
    Loop = 2,
}

impl ThreadMode {
    pub const ALL: [ThreadMode; 3] = [ThreadMode::Sleep, ThreadMode::Event, ThreadMode::Loop];

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_u8`](Self::as_u8); out-of-range values fall back to `Sleep`.
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Event,
            2 => Self::Loop,
            _ => Self::Sleep,
        }
    }

    /// Only the event mode costs the audio thread a cross-thread wake.
    #[inline]
    pub fn needs_notify(self) -> bool {
        self == Self::Event
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Event => "event",
            Self::Loop => "loop",
        }
    }
}

impl fmt::Display for ThreadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThreadMode {
    type Err = LsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sleep" | "safe" => Ok(Self::Sleep),
            "event" | "efficient" => Ok(Self::Event),
            "loop" | "performance" => Ok(Self::Loop),
            other => Err(LsError::InvalidThreadMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("safe".parse::<ThreadMode>().unwrap(), ThreadMode::Sleep);
        assert_eq!("efficient".parse::<ThreadMode>().unwrap(), ThreadMode::Event);
        assert_eq!("Performance".parse::<ThreadMode>().unwrap(), ThreadMode::Loop);
        assert_eq!("loop".parse::<ThreadMode>().unwrap(), ThreadMode::Loop);
        assert!("turbo".parse::<ThreadMode>().is_err());
    }

    #[test]
    fn test_u8_roundtrip() {
        for mode in ThreadMode::ALL {
            assert_eq!(ThreadMode::from_u8(mode.as_u8()), mode);
            assert_eq!(mode.to_string().parse::<ThreadMode>().unwrap(), mode);
        }
        assert_eq!(ThreadMode::from_u8(9), ThreadMode::Sleep);
    }

    #[test]
    fn test_notify_contract() {
        assert!(!ThreadMode::Sleep.needs_notify());
        assert!(ThreadMode::Event.needs_notify());
        assert!(!ThreadMode::Loop.needs_notify());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ThreadMode::Event).unwrap();
        assert_eq!(json, "\"event\"");
        let mode: ThreadMode = serde_json::from_str("\"loop\"").unwrap();
        assert_eq!(mode, ThreadMode::Loop);
    }
}
