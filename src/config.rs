use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::text::footnotes::DEFAULT_SECTION_THRESHOLD;
use crate::text::ChunkPolicy;
use crate::{Result, SpeechError, SpeechOptions};

/// Pause between one chunk ending and the next being spoken.
///
/// Some engines glitch when a new utterance arrives before they have fully
/// released the previous one.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Footnote handling for new conversions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootnoteConfig {
    /// Read footnotes inline where they are referenced.
    pub read_aloud: bool,
    /// Fraction of the document after which numbered lines count as a
    /// footnote section.
    pub section_threshold: f32,
}

impl Default for FootnoteConfig {
    fn default() -> Self {
        Self {
            read_aloud: false,
            section_threshold: DEFAULT_SECTION_THRESHOLD,
        }
    }
}

/// Everything a [`Narrator`](crate::playback::Narrator) needs besides the
/// speech engine itself.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// {
///   "speech": { "rate": 1.2 },
///   "chunking": { "strategy": "characters", "max_chars": 200 },
///   "footnotes": { "read_aloud": true },
///   "settle_delay_ms": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub speech: SpeechOptions,
    pub chunking: ChunkPolicy,
    pub footnotes: FootnoteConfig,
    pub settle_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speech: SpeechOptions::default(),
            chunking: ChunkPolicy::default(),
            footnotes: FootnoteConfig::default(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SpeechError::Config(format!("Failed to parse JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.speech
            .validate()
            .map_err(|e| SpeechError::Config(e.to_string()))?;
        if !(0.0..=1.0).contains(&self.footnotes.section_threshold) {
            return Err(SpeechError::Config(format!(
                "footnotes.section_threshold {} must be between 0 and 1",
                self.footnotes.section_threshold
            )));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
