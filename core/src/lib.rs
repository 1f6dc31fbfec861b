//! typewriter-core
//!
//! Keeps a typewriter-animated copy of a text field in sync with the raw
//! edits the user makes to it. Appends and mid-string insertions are
//! revealed one character per tick; deletions and replacements apply at
//! once; text under an input method's composition passes straight through.
//!
//! Public API:
//! - `TypewriterEngine` - the per-field engine (`on_raw_edit`, `force_set_text`, `poll`)
//! - `RawEdit` - the host field's state right after an edit
//! - `EngineListener` / `Display` - settle, overflow and display callbacks
//! - `Config` - character delay and length limit
//! - `driver` - tokio event loop that feeds edits and ticks to an engine
//! - `forms` - boundary to the text generator and keyword validator

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub mod graphemes;

pub mod classifier;
pub use classifier::{classify, EditKind, Plan};

pub mod clock;
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};

pub mod composition;
pub use composition::{Composition, CompositionGuard, Route};

pub mod overflow;
pub use overflow::{Accepted, OverflowPolicy};

pub mod reveal;
pub use reveal::RevealQueue;

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod state;
pub use state::SyncState;

pub mod listener;
pub use listener::{Display, EngineListener, ListenerEvent, NoopListener, RecordingListener};

pub mod engine;
pub use engine::{EditOutcome, ForceSet, Phase, RawEdit, TypewriterEngine};

pub mod driver;
pub use driver::HostEvent;

pub mod forms;
pub use forms::{FieldError, KeywordValidator, KeywordVerdict, TextGenerator};

/// Default delay between revealed characters, in seconds.
pub const DEFAULT_CHARACTER_DELAY: f64 = 0.05;

/// Longest accepted delay between revealed characters, in seconds.
pub const MAX_CHARACTER_DELAY: f64 = 60.0;

/// Length limit of the person-name field in the praise form.
pub const PERSON_NAME_MAX_LENGTH: usize = 15;

/// Length limit of the keywords field in the praise form.
pub const KEYWORDS_MAX_LENGTH: usize = 20;

/// Errors raised while loading or checking a `Config`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("character_delay must be in (0, {max}] seconds, got {0}", max = MAX_CHARACTER_DELAY)]
    InvalidDelay(f64),
    #[error("max_length must be at least 1")]
    ZeroMaxLength,
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Per-field engine configuration.
///
/// ```toml
/// character_delay = 0.05   # seconds between revealed characters
/// max_length = 15          # omit for no limit
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between two revealed characters (> 0)
    pub character_delay: f64,

    /// Maximum accepted length in characters; `None` for unlimited
    pub max_length: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            character_delay: DEFAULT_CHARACTER_DELAY,
            max_length: None,
        }
    }
}

impl Config {
    /// Config for the person-name field.
    pub fn person_name() -> Self {
        Self {
            max_length: Some(PERSON_NAME_MAX_LENGTH),
            ..Self::default()
        }
    }

    /// Config for the keywords field.
    pub fn keywords() -> Self {
        Self {
            max_length: Some(KEYWORDS_MAX_LENGTH),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // NaN fails both comparisons
        let delay = self.character_delay;
        if !(delay > 0.0 && delay <= MAX_CHARACTER_DELAY) {
            return Err(ConfigError::InvalidDelay(delay));
        }
        if self.max_length == Some(0) {
            return Err(ConfigError::ZeroMaxLength);
        }
        Ok(())
    }

    /// Delay between revealed characters.
    ///
    /// Falls back to the default delay for values `validate()` rejects.
    pub fn character_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.character_delay)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_CHARACTER_DELAY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.character_delay(), Duration::from_millis(50));
        assert_eq!(config.max_length, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(Config::person_name().max_length, Some(15));
        assert_eq!(Config::keywords().max_length, Some(20));
    }

    #[test]
    fn test_toml_roundtrip_partial() {
        let config = Config::from_toml_str("max_length = 5\n").unwrap();
        assert_eq!(config.max_length, Some(5));
        assert_eq!(config.character_delay, DEFAULT_CHARACTER_DELAY);

        let text = config.to_toml_string().unwrap();
        assert!(text.contains("max_length = 5"));
    }

    #[test]
    fn test_validate_rejects_bad_delay() {
        let mut config = Config::default();
        config.character_delay = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDelay(_))));
        config.character_delay = -1.0;
        assert!(config.validate().is_err());
        config.character_delay = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_delay() {
        let mut config = Config::default();
        for delay in [1e19, 1e20, f64::INFINITY, MAX_CHARACTER_DELAY + 1.0] {
            config.character_delay = delay;
            assert!(matches!(config.validate(), Err(ConfigError::InvalidDelay(_))));
        }
        config.character_delay = MAX_CHARACTER_DELAY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_character_delay_never_panics() {
        let config = Config {
            character_delay: 1e20,
            max_length: None,
        };
        assert_eq!(config.character_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = Config {
            max_length: Some(0),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroMaxLength)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "typewriter_config_{}.toml",
            std::process::id()
        ));
        let config = Config {
            character_delay: 0.02,
            max_length: Some(8),
        };
        config.save_toml(&path).unwrap();
        let loaded = Config::load_toml(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }
}
