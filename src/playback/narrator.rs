use crate::config::EngineConfig;
use crate::text::{normalize, split, FootnoteExtractor, FootnoteTable};
use crate::{
    find_voice, Result, SpeechError, SpeechOptions, SynthesisGateway, UtteranceEvent, VoiceRef,
};

use super::sequencer::{PlayOutcome, PlaybackSequencer, PlaybackState, Position, Progress};

/// Summary of a document handed to [`Narrator::convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    /// Increases with every successful conversion.
    pub id: u64,
    pub chunk_count: usize,
    /// Footnotes read inline (zero when footnote reading is off).
    pub footnote_count: usize,
}

/// Reads documents aloud: text preparation plus a [`PlaybackSequencer`].
///
/// One narrator serves one reading session at a time; converting a new
/// document replaces the previous one wholesale.
pub struct Narrator<G> {
    sequencer: PlaybackSequencer<G>,
    extractor: FootnoteExtractor,
    config: EngineConfig,
    read_footnotes: bool,
    footnotes: FootnoteTable,
    sessions: u64,
}

impl<G: SynthesisGateway> Narrator<G> {
    pub fn new(gateway: G, config: EngineConfig) -> Self {
        Self {
            sequencer: PlaybackSequencer::new(gateway).with_settle_delay(config.settle_delay()),
            extractor: FootnoteExtractor::new(config.footnotes.section_threshold),
            read_footnotes: config.footnotes.read_aloud,
            footnotes: FootnoteTable::new(),
            sessions: 0,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &PlaybackSequencer<G> {
        &self.sequencer
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        self.sequencer.gateway_mut()
    }

    /// Prepare `text` and start reading it.
    ///
    /// `options` defaults to the configured speech options. Whatever was
    /// playing before is stopped, even if the new document turns out to be
    /// empty.
    pub fn convert(&mut self, text: &str, options: Option<SpeechOptions>) -> Result<SessionHandle> {
        if !self.sequencer.gateway().is_available() {
            return Err(SpeechError::Unavailable);
        }
        let options = options.unwrap_or_else(|| self.config.speech.clone());
        options.validate()?;

        self.stop();

        let (body, footnotes) = if self.read_footnotes {
            let extraction = self.extractor.extract(text);
            let inlined = self.extractor.inline(&extraction.body_text, &extraction.table);
            (inlined, extraction.table)
        } else {
            (text.to_string(), FootnoteTable::new())
        };

        let normalized = normalize(&body);
        let chunks = split(&normalized, self.config.chunking);
        if !chunks.is_speakable() {
            return Err(SpeechError::EmptyDocument);
        }

        self.sessions += 1;
        let session = SessionHandle {
            id: self.sessions,
            chunk_count: chunks.len(),
            footnote_count: footnotes.len(),
        };
        log::info!(
            "Converted document of {} chars into {} chunks ({} footnotes)",
            text.chars().count(),
            session.chunk_count,
            session.footnote_count
        );

        self.footnotes = footnotes;
        self.sequencer.load(chunks);
        self.sequencer.play_from(&options)?;
        Ok(session)
    }

    /// Footnotes of the current session.
    pub fn footnotes(&self) -> &FootnoteTable {
        &self.footnotes
    }

    /// Takes effect on the next [`convert`](Self::convert).
    pub fn set_footnote_reading_enabled(&mut self, enabled: bool) {
        self.read_footnotes = enabled;
    }

    pub fn footnote_reading_enabled(&self) -> bool {
        self.read_footnotes
    }

    pub fn handle_event(&mut self, event: UtteranceEvent) -> Result<Progress> {
        self.sequencer.handle_event(event)
    }

    pub fn continue_after_settle(&mut self) -> Result<Progress> {
        self.sequencer.continue_after_settle()
    }

    /// Retry the current chunk, e.g. after a synthesis failure.
    pub fn play(&mut self) -> Result<PlayOutcome> {
        let options = self.sequencer.options().clone();
        self.sequencer.play_from(&options)
    }

    pub fn pause(&mut self) -> bool {
        self.sequencer.pause()
    }

    pub fn resume(&mut self) -> Result<bool> {
        self.sequencer.resume()
    }

    pub fn stop(&mut self) {
        self.sequencer.stop();
        self.footnotes = FootnoteTable::new();
    }

    pub fn seek_to_percentage(&mut self, percent: f64) -> Result<PlayOutcome> {
        self.sequencer.seek_to_percentage(percent)
    }

    pub fn seek_next_chunk(&mut self) -> Result<PlayOutcome> {
        self.sequencer.seek_next_chunk()
    }

    pub fn seek_previous_chunk(&mut self) -> Result<PlayOutcome> {
        self.sequencer.seek_previous_chunk()
    }

    pub fn seek_relative(&mut self, delta_percent: f64) -> Result<PlayOutcome> {
        self.sequencer.seek_relative(delta_percent)
    }

    pub fn position(&self) -> Position {
        self.sequencer.position()
    }

    pub fn state(&self) -> PlaybackState {
        self.sequencer.state()
    }

    pub fn is_speaking(&self) -> bool {
        self.sequencer.is_speaking()
    }

    pub fn is_paused(&self) -> bool {
        self.sequencer.is_paused()
    }

    pub fn voices(&self) -> Vec<VoiceRef> {
        self.sequencer.voices()
    }

    /// Find a voice by id, name or language tag. `None` when nothing
    /// matches; use [`select_voice`](crate::select_voice) for a fallback.
    pub fn voice_named(&self, name: &str) -> Option<VoiceRef> {
        find_voice(&self.voices(), name)
    }
}
