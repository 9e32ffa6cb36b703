//! # narrate-rs
//!
//! A Rust library for reading long documents aloud through a speech engine
//! that only accepts one short utterance at a time.
//!
//! ## Features
//!
//! - **Text normalization**: abbreviations, acronyms, ordinals and currency
//!   rewritten so the engine pronounces them correctly
//! - **Footnotes**: trailing footnote sections detected and optionally read
//!   inline where they are referenced
//! - **Sentence-safe chunking**: text split by sentence count or character
//!   budget without ever cutting a sentence in half
//! - **Seekable playback**: pause, resume, stop and seek by chunk or by
//!   percentage on top of any [`SynthesisGateway`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use narrate_rs::{playback::Narrator, config::EngineConfig, SpeechOptions};
//!
//! let mut narrator = Narrator::new(my_gateway, EngineConfig::default());
//! let session = narrator.convert(&document_text, None)?;
//! println!("Reading {} chunks", session.chunk_count);
//!
//! // From the host event loop, whenever the engine reports progress:
//! narrator.handle_event(event)?;
//! # Ok::<(), narrate_rs::SpeechError>(())
//! ```

pub mod config;
mod error;
pub mod playback;
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

pub use error::{Boundary, Result, SpeechError};

/// A voice offered by the speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRef {
    /// Engine-specific identifier (voice URI, espeak voice name, ...)
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// BCP 47 language tag, e.g. `en-US`
    pub lang: String,
    /// Whether the engine marks this voice as its default
    #[serde(default)]
    pub default: bool,
}

/// Per-utterance voice settings.
///
/// Defaults are `rate = 1.0`, `pitch = 1.0`, `volume = 1.0` and the engine's
/// default voice. Ranges follow the usual speech-engine limits: rate
/// 0.1–10, pitch 0–2, volume 0–1.
///
/// ```
/// use narrate_rs::SpeechOptionsBuilder;
///
/// let options = SpeechOptionsBuilder::default().rate(1.25).build().unwrap();
/// assert_eq!(options.pitch, 1.0);
/// assert!(SpeechOptionsBuilder::default().volume(3.0).build().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default, build_fn(validate = "Self::validate_ranges"))]
#[serde(default)]
pub struct SpeechOptions {
    #[builder(setter(into, strip_option))]
    pub voice: Option<VoiceRef>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

impl SpeechOptions {
    /// Check that rate, pitch and volume are within the engine limits.
    pub fn validate(&self) -> Result<()> {
        check_ranges(self.rate, self.pitch, self.volume).map_err(SpeechError::InvalidOption)
    }
}

impl SpeechOptionsBuilder {
    fn validate_ranges(&self) -> std::result::Result<(), String> {
        let defaults = SpeechOptions::default();
        check_ranges(
            self.rate.unwrap_or(defaults.rate),
            self.pitch.unwrap_or(defaults.pitch),
            self.volume.unwrap_or(defaults.volume),
        )
    }
}

fn check_ranges(rate: f32, pitch: f32, volume: f32) -> std::result::Result<(), String> {
    if !(0.1..=10.0).contains(&rate) {
        return Err(format!("rate {rate} must be between 0.1 and 10"));
    }
    if !(0.0..=2.0).contains(&pitch) {
        return Err(format!("pitch {pitch} must be between 0 and 2"));
    }
    if !(0.0..=1.0).contains(&volume) {
        return Err(format!("volume {volume} must be between 0 and 1"));
    }
    Ok(())
}

/// Opaque handle for one utterance issued through a [`SynthesisGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceHandle(pub u64);

/// What the speech engine reported about an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEventKind {
    Started,
    Ended,
    Failed(String),
}

/// A callback from the speech engine, tagged with the utterance it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceEvent {
    pub handle: UtteranceHandle,
    pub kind: UtteranceEventKind,
}

impl UtteranceEvent {
    pub fn started(handle: UtteranceHandle) -> Self {
        Self {
            handle,
            kind: UtteranceEventKind::Started,
        }
    }

    pub fn ended(handle: UtteranceHandle) -> Self {
        Self {
            handle,
            kind: UtteranceEventKind::Ended,
        }
    }

    pub fn failed(handle: UtteranceHandle, reason: impl Into<String>) -> Self {
        Self {
            handle,
            kind: UtteranceEventKind::Failed(reason.into()),
        }
    }
}

/// Common interface for the speech engine that actually produces audio.
///
/// The engine speaks one utterance at a time and reports progress
/// asynchronously: `speak` returns immediately with a handle, and the host
/// later delivers [`UtteranceEvent`]s for that handle to the sequencer.
pub trait SynthesisGateway {
    /// Whether speech synthesis can be used at all on this host.
    fn is_available(&self) -> bool;

    /// Start speaking `text`. Must not block until the utterance ends.
    fn speak(&mut self, text: &str, options: &SpeechOptions) -> Result<UtteranceHandle>;

    /// Suspend the utterance in flight.
    fn pause(&mut self);

    /// Continue a suspended utterance.
    fn resume(&mut self);

    /// Drop the utterance in flight and anything the engine has queued.
    ///
    /// Must be safe to call when nothing is speaking.
    fn cancel_all(&mut self);

    /// List the voices the engine offers.
    ///
    /// Engines often populate this lazily, so an empty list may only mean
    /// "not ready yet". Callers should query again later.
    fn list_voices(&self) -> Vec<VoiceRef>;
}

/// Pick a voice from `voices`.
///
/// `preferred` is matched against the voice id, then the name
/// (case-insensitive), then as a language prefix (`"en"` matches `en-GB`).
/// Without a match the engine default wins, then the first voice.
pub fn select_voice(voices: &[VoiceRef], preferred: Option<&str>) -> Option<VoiceRef> {
    if let Some(wanted) = preferred {
        if let Some(voice) = find_voice(voices, wanted) {
            return Some(voice);
        }
        log::debug!("No voice matches {wanted:?}, falling back to default");
    }

    voices
        .iter()
        .find(|v| v.default)
        .or_else(|| voices.first())
        .cloned()
}

/// Look up a voice by id, name (case-insensitive) or language prefix.
/// Unlike [`select_voice`], there is no fallback.
pub fn find_voice(voices: &[VoiceRef], wanted: &str) -> Option<VoiceRef> {
    let lowered = wanted.to_lowercase();
    voices
        .iter()
        .find(|v| v.id == wanted)
        .or_else(|| voices.iter().find(|v| v.name.to_lowercase() == lowered))
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.lang.to_lowercase().starts_with(&lowered))
        })
        .cloned()
}
