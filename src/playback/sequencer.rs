use std::time::Duration;

use serde::Serialize;

use crate::config::DEFAULT_SETTLE_DELAY_MS;
use crate::text::ChunkSequence;
use crate::{
    Boundary, Result, SpeechError, SpeechOptions, SynthesisGateway, UtteranceEvent,
    UtteranceEventKind, UtteranceHandle, VoiceRef,
};

/// Coarse playback state, derived from the sequencer's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded.
    Idle,
    /// Loaded, nothing in flight (not started yet, or after a failure).
    Ready,
    /// An utterance is in flight or the next one is about to be issued.
    Speaking,
    Paused,
    /// Every chunk has been spoken.
    Finished,
}

/// Where playback is within the loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub current_index: usize,
    pub total: usize,
    /// `current_index / total` as a whole percentage, rounded down.
    pub percentage: u32,
    pub remaining: usize,
}

/// Result of asking the sequencer to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Started {
        index: usize,
        handle: UtteranceHandle,
    },
    /// Nothing left to speak.
    Finished,
}

/// What the sequencer did with an engine event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The engine started speaking chunk `index`.
    Started { index: usize },
    /// Chunk `index` was issued right after the previous one ended.
    Advanced {
        index: usize,
        handle: UtteranceHandle,
    },
    /// Call [`PlaybackSequencer::continue_after_settle`] after `delay`.
    Settling { delay: Duration },
    Finished,
    /// The event or timer no longer applies (utterance cancelled, paused,
    /// or already superseded by a seek).
    Ignored,
}

/// Drives a [`SynthesisGateway`] through a chunk sequence, one utterance at
/// a time.
///
/// The sequencer never blocks. `play_from` issues a single speak request
/// and returns; the host feeds engine callbacks back in through
/// [`handle_event`](Self::handle_event), which advances to the next chunk.
/// Events carrying a handle other than the one in flight are ignored, so a
/// late "ended" from a cancelled utterance cannot move the position.
pub struct PlaybackSequencer<G> {
    gateway: G,
    chunks: Vec<String>,
    current_index: usize,
    paused: bool,
    active: Option<UtteranceHandle>,
    /// The previous chunk ended and the next one waits for the settle delay.
    settling: bool,
    options: SpeechOptions,
    settle_delay: Duration,
}

impl<G: SynthesisGateway> PlaybackSequencer<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            chunks: Vec::new(),
            current_index: 0,
            paused: false,
            active: None,
            settling: false,
            options: SpeechOptions::default(),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }

    /// Pause inserted between consecutive chunks. Zero issues the next
    /// chunk straight from the "ended" event.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn options(&self) -> &SpeechOptions {
        &self.options
    }

    /// Replace the loaded document. Does not start speaking.
    pub fn load(&mut self, chunks: ChunkSequence) {
        self.cancel();
        self.chunks = if chunks.is_speakable() {
            chunks.into_vec()
        } else {
            Vec::new()
        };
        self.current_index = 0;
        log::debug!("Loaded {} chunks", self.chunks.len());
    }

    /// Speak from the current chunk on with `options`.
    pub fn play_from(&mut self, options: &SpeechOptions) -> Result<PlayOutcome> {
        if !self.gateway.is_available() {
            return Err(SpeechError::Unavailable);
        }
        self.options = options.clone();
        self.speak_current()
    }

    /// Apply an engine callback.
    ///
    /// A failed utterance is reported as [`SpeechError::Synthesis`] and
    /// playback stops on that chunk; calling [`play_from`](Self::play_from)
    /// retries it.
    pub fn handle_event(&mut self, event: UtteranceEvent) -> Result<Progress> {
        if self.active != Some(event.handle) {
            log::debug!(
                "Ignoring {:?} for utterance {:?} that is no longer in flight",
                event.kind,
                event.handle
            );
            return Ok(Progress::Ignored);
        }

        match event.kind {
            UtteranceEventKind::Started => Ok(Progress::Started {
                index: self.current_index,
            }),
            UtteranceEventKind::Ended => {
                self.active = None;
                self.current_index += 1;

                if self.current_index >= self.chunks.len() {
                    self.paused = false;
                    log::info!("Finished reading {} chunks", self.chunks.len());
                    return Ok(Progress::Finished);
                }

                if self.settle_delay.is_zero() && !self.paused {
                    return self.speak_current().map(Progress::from);
                }

                self.settling = true;
                Ok(Progress::Settling {
                    delay: self.settle_delay,
                })
            }
            UtteranceEventKind::Failed(reason) => {
                self.active = None;
                self.paused = false;
                self.settling = false;
                log::warn!(
                    "Speech failed on chunk {}/{}: {reason}",
                    self.current_index + 1,
                    self.chunks.len()
                );
                Err(SpeechError::Synthesis {
                    index: self.current_index,
                    reason,
                })
            }
        }
    }

    /// Issue the chunk that has been waiting out the settle delay.
    ///
    /// Harmless when the wait was overtaken by a seek, pause or stop.
    pub fn continue_after_settle(&mut self) -> Result<Progress> {
        if !self.settling || self.paused {
            return Ok(Progress::Ignored);
        }
        self.speak_current().map(Progress::from)
    }

    /// Suspend playback. Returns `false` if nothing was speaking.
    pub fn pause(&mut self) -> bool {
        if self.paused {
            return false;
        }
        if self.active.is_some() {
            self.gateway.pause();
        } else if !self.settling {
            return false;
        }
        self.paused = true;
        true
    }

    /// Continue after [`pause`](Self::pause). Returns `false` if not paused.
    pub fn resume(&mut self) -> Result<bool> {
        if !self.paused {
            return Ok(false);
        }
        self.paused = false;

        if self.active.is_some() {
            self.gateway.resume();
        } else if self.settling {
            // Paused between chunks: nothing to resume in the engine yet.
            self.speak_current()?;
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    /// Drop the utterance in flight but keep the document and position.
    pub fn cancel(&mut self) {
        self.gateway.cancel_all();
        if let Some(handle) = self.active.take() {
            log::debug!("Cancelled utterance {handle:?}");
        }
        self.settling = false;
        self.paused = false;
    }

    /// Cancel and unload the document.
    pub fn stop(&mut self) {
        self.cancel();
        if !self.chunks.is_empty() {
            log::debug!(
                "Stopped at chunk {}/{}",
                self.current_index,
                self.chunks.len()
            );
        }
        self.chunks.clear();
        self.current_index = 0;
    }

    /// Jump to `percent` of the document. Values above 100 clamp to the
    /// last chunk; negative values are rejected.
    pub fn seek_to_percentage(&mut self, percent: f64) -> Result<PlayOutcome> {
        if self.chunks.is_empty() {
            return Err(SpeechError::NoDocument);
        }
        if percent.is_nan() || percent < 0.0 {
            return Err(SpeechError::InvalidSeek(percent));
        }

        let total = self.chunks.len();
        let percent = percent.min(100.0);
        // The epsilon keeps round-tripped percentages from landing one chunk early.
        let target = (percent / 100.0 * total as f64 + 1e-9).floor() as usize;
        self.jump_to(target.min(total - 1))
    }

    pub fn seek_next_chunk(&mut self) -> Result<PlayOutcome> {
        if self.chunks.is_empty() {
            return Err(SpeechError::NoDocument);
        }
        if self.current_index + 1 >= self.chunks.len() {
            return Err(SpeechError::AtBoundary(Boundary::Last));
        }
        self.jump_to(self.current_index + 1)
    }

    pub fn seek_previous_chunk(&mut self) -> Result<PlayOutcome> {
        if self.chunks.is_empty() {
            return Err(SpeechError::NoDocument);
        }
        if self.current_index == 0 {
            return Err(SpeechError::AtBoundary(Boundary::First));
        }
        self.jump_to(self.current_index - 1)
    }

    /// Move by `delta_percent` relative to the current position.
    pub fn seek_relative(&mut self, delta_percent: f64) -> Result<PlayOutcome> {
        if self.chunks.is_empty() {
            return Err(SpeechError::NoDocument);
        }
        if delta_percent.is_nan() {
            return Err(SpeechError::InvalidSeek(delta_percent));
        }
        let current = self.current_index as f64 / self.chunks.len() as f64 * 100.0;
        self.seek_to_percentage((current + delta_percent).clamp(0.0, 100.0))
    }

    pub fn position(&self) -> Position {
        let total = self.chunks.len();
        if total == 0 {
            return Position::default();
        }
        Position {
            current_index: self.current_index,
            total,
            percentage: (self.current_index * 100 / total) as u32,
            remaining: total - self.current_index,
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.chunks.is_empty() {
            PlaybackState::Idle
        } else if self.paused {
            PlaybackState::Paused
        } else if self.active.is_some() || self.settling {
            PlaybackState::Speaking
        } else if self.current_index >= self.chunks.len() {
            PlaybackState::Finished
        } else {
            PlaybackState::Ready
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.state() == PlaybackState::Speaking
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn voices(&self) -> Vec<VoiceRef> {
        self.gateway.list_voices()
    }

    fn jump_to(&mut self, index: usize) -> Result<PlayOutcome> {
        if !self.gateway.is_available() {
            return Err(SpeechError::Unavailable);
        }
        self.cancel();
        self.current_index = index;
        log::debug!("Seeking to chunk {}/{}", index + 1, self.chunks.len());
        self.speak_current()
    }

    fn speak_current(&mut self) -> Result<PlayOutcome> {
        if self.active.is_some() {
            self.cancel();
        }
        self.settling = false;
        self.paused = false;

        let Some(chunk) = self.chunks.get(self.current_index) else {
            return Ok(PlayOutcome::Finished);
        };
        let handle = self.gateway.speak(chunk, &self.options)?;
        self.active = Some(handle);

        log::debug!(
            "Speaking chunk {}/{} ({} chars)",
            self.current_index + 1,
            self.chunks.len(),
            chunk.chars().count()
        );
        Ok(PlayOutcome::Started {
            index: self.current_index,
            handle,
        })
    }
}

impl From<PlayOutcome> for Progress {
    fn from(outcome: PlayOutcome) -> Self {
        match outcome {
            PlayOutcome::Started { index, handle } => Progress::Advanced { index, handle },
            PlayOutcome::Finished => Progress::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{PlayOutcome, PlaybackSequencer, PlaybackState, Position, Progress};
    use crate::test_support::MockGateway;
    use crate::text::ChunkSequence;
    use crate::{Boundary, SpeechError, SpeechOptions, UtteranceEvent};

    fn chunks(n: usize) -> ChunkSequence {
        ChunkSequence::from((0..n).map(|i| format!("Chunk {i}.")).collect::<Vec<_>>())
    }

    fn loaded(n: usize) -> PlaybackSequencer<MockGateway> {
        let mut seq = PlaybackSequencer::new(MockGateway::new()).with_settle_delay(Duration::ZERO);
        seq.load(chunks(n));
        seq
    }

    fn playing(n: usize) -> PlaybackSequencer<MockGateway> {
        let mut seq = loaded(n);
        seq.play_from(&SpeechOptions::default()).unwrap();
        seq
    }

    fn finish_current(seq: &mut PlaybackSequencer<MockGateway>) -> Progress {
        let event = seq.gateway_mut().finish();
        seq.handle_event(event).unwrap()
    }

    #[test]
    fn load_does_not_start_speaking() {
        let seq = loaded(3);
        assert_eq!(seq.state(), PlaybackState::Ready);
        assert!(seq.gateway().spoken.is_empty());
        assert!(!seq.is_speaking());
    }

    #[test]
    fn blank_sequence_loads_as_idle() {
        let mut seq = PlaybackSequencer::new(MockGateway::new());
        seq.load(ChunkSequence::from(vec![String::new()]));
        assert_eq!(seq.state(), PlaybackState::Idle);
        assert_eq!(
            seq.play_from(&SpeechOptions::default()).unwrap(),
            PlayOutcome::Finished
        );
        assert!(seq.gateway().spoken.is_empty());
    }

    #[test]
    fn plays_every_chunk_in_order() {
        let mut seq = playing(3);
        assert!(seq.is_speaking());

        assert!(matches!(finish_current(&mut seq), Progress::Advanced { index: 1, .. }));
        assert!(matches!(finish_current(&mut seq), Progress::Advanced { index: 2, .. }));
        assert_eq!(finish_current(&mut seq), Progress::Finished);

        assert_eq!(seq.gateway().spoken, vec!["Chunk 0.", "Chunk 1.", "Chunk 2."]);
        assert_eq!(seq.state(), PlaybackState::Finished);
        assert_eq!(seq.gateway().overlaps, 0);
    }

    #[test]
    fn play_from_when_finished_is_a_no_op() {
        let mut seq = playing(1);
        assert_eq!(finish_current(&mut seq), Progress::Finished);
        assert_eq!(
            seq.play_from(&SpeechOptions::default()).unwrap(),
            PlayOutcome::Finished
        );
        assert_eq!(seq.gateway().spoken.len(), 1);
    }

    #[test]
    fn options_are_passed_to_every_chunk() {
        let mut seq = loaded(2);
        let options = SpeechOptions {
            rate: 1.5,
            ..Default::default()
        };
        seq.play_from(&options).unwrap();
        finish_current(&mut seq);
        assert_eq!(seq.gateway().last_options.as_ref().unwrap().rate, 1.5);
    }

    #[test]
    fn started_event_reports_current_chunk() {
        let mut seq = playing(2);
        let handle = seq.gateway().current();
        assert_eq!(
            seq.handle_event(UtteranceEvent::started(handle)).unwrap(),
            Progress::Started { index: 0 }
        );
    }

    #[test]
    fn settle_delay_defers_next_chunk() {
        let mut seq = PlaybackSequencer::new(MockGateway::new())
            .with_settle_delay(Duration::from_millis(100));
        seq.load(chunks(2));
        seq.play_from(&SpeechOptions::default()).unwrap();

        assert_eq!(
            finish_current(&mut seq),
            Progress::Settling {
                delay: Duration::from_millis(100)
            }
        );
        assert!(seq.is_speaking());
        assert_eq!(seq.gateway().spoken.len(), 1);

        assert!(matches!(
            seq.continue_after_settle().unwrap(),
            Progress::Advanced { index: 1, .. }
        ));
        assert_eq!(seq.gateway().spoken.len(), 2);
        assert_eq!(seq.continue_after_settle().unwrap(), Progress::Ignored);
    }

    #[test]
    fn settle_timer_after_seek_is_ignored() {
        let mut seq = PlaybackSequencer::new(MockGateway::new())
            .with_settle_delay(Duration::from_millis(100));
        seq.load(chunks(4));
        seq.play_from(&SpeechOptions::default()).unwrap();
        finish_current(&mut seq);

        seq.seek_to_percentage(75.0).unwrap();
        assert_eq!(seq.continue_after_settle().unwrap(), Progress::Ignored);
        assert_eq!(seq.gateway().spoken, vec!["Chunk 0.", "Chunk 3."]);
    }

    #[test]
    fn late_events_from_cancelled_utterances_are_ignored() {
        let mut seq = playing(3);
        let old = seq.gateway().current();
        seq.seek_next_chunk().unwrap();

        assert_eq!(
            seq.handle_event(UtteranceEvent::ended(old)).unwrap(),
            Progress::Ignored
        );
        assert_eq!(seq.position().current_index, 1);
    }

    #[test]
    fn synthesis_failure_stops_on_the_failed_chunk() {
        let mut seq = playing(3);
        finish_current(&mut seq);

        let event = seq.gateway_mut().fail("voice missing");
        let err = seq.handle_event(event).unwrap_err();
        assert!(matches!(err, SpeechError::Synthesis { index: 1, .. }));
        assert_eq!(seq.state(), PlaybackState::Ready);
        assert_eq!(seq.position().current_index, 1);

        // No automatic retry; the caller decides.
        assert_eq!(seq.gateway().spoken.len(), 2);
        seq.play_from(&SpeechOptions::default()).unwrap();
        assert_eq!(seq.gateway().spoken.last().unwrap(), "Chunk 1.");
    }

    #[test]
    fn rejected_speak_leaves_nothing_in_flight() {
        let mut seq = loaded(2);
        seq.gateway_mut().reject_next = Some("busy".to_string());
        let err = seq.play_from(&SpeechOptions::default()).unwrap_err();
        assert!(matches!(err, SpeechError::Gateway(_)));
        assert_eq!(seq.state(), PlaybackState::Ready);
    }

    #[test]
    fn unavailable_engine_is_rejected_before_any_change() {
        let mut seq = PlaybackSequencer::new(MockGateway::unavailable());
        seq.load(chunks(2));
        assert!(matches!(
            seq.play_from(&SpeechOptions::default()),
            Err(SpeechError::Unavailable)
        ));
        assert!(matches!(seq.seek_next_chunk(), Err(SpeechError::Unavailable)));
        assert_eq!(seq.position().current_index, 0);
        assert!(seq.gateway().spoken.is_empty());
    }

    #[test]
    fn pause_and_resume_go_through_the_engine() {
        let mut seq = playing(2);
        assert!(seq.pause());
        assert!(!seq.pause());
        assert!(seq.is_paused());
        assert!(!seq.is_speaking());
        assert_eq!(seq.state(), PlaybackState::Paused);

        assert!(seq.resume().unwrap());
        assert!(!seq.resume().unwrap());
        assert!(seq.is_speaking());
        assert_eq!(seq.gateway().pauses, 1);
        assert_eq!(seq.gateway().resumes, 1);
    }

    #[test]
    fn pause_when_idle_is_a_no_op() {
        let mut seq = loaded(2);
        assert!(!seq.pause());
        assert!(!seq.resume().unwrap());
        assert_eq!(seq.gateway().pauses, 0);
    }

    #[test]
    fn pause_between_chunks_holds_the_next_one() {
        let mut seq = PlaybackSequencer::new(MockGateway::new())
            .with_settle_delay(Duration::from_millis(100));
        seq.load(chunks(2));
        seq.play_from(&SpeechOptions::default()).unwrap();
        finish_current(&mut seq);

        assert!(seq.pause());
        assert_eq!(seq.continue_after_settle().unwrap(), Progress::Ignored);
        assert_eq!(seq.gateway().spoken.len(), 1);
        assert_eq!(seq.gateway().pauses, 0);

        assert!(seq.resume().unwrap());
        assert_eq!(seq.gateway().spoken.len(), 2);
        assert!(seq.is_speaking());
    }

    #[test]
    fn seek_to_percentage_picks_floor_chunk() {
        let mut seq = playing(4);
        assert!(matches!(
            seq.seek_to_percentage(50.0).unwrap(),
            PlayOutcome::Started { index: 2, .. }
        ));
        assert!(matches!(
            seq.seek_to_percentage(0.0).unwrap(),
            PlayOutcome::Started { index: 0, .. }
        ));
    }

    #[test]
    fn seek_above_hundred_matches_hundred() {
        let mut seq = playing(4);
        seq.seek_to_percentage(100.0).unwrap();
        let at_hundred = seq.position();
        seq.seek_to_percentage(150.0).unwrap();
        assert_eq!(seq.position(), at_hundred);
        assert_eq!(at_hundred.current_index, 3);
    }

    #[test]
    fn negative_seek_is_rejected_without_change() {
        let mut seq = playing(4);
        seq.seek_to_percentage(50.0).unwrap();
        let before = seq.position();
        let spoken = seq.gateway().spoken.len();

        assert!(matches!(
            seq.seek_to_percentage(-10.0),
            Err(SpeechError::InvalidSeek(_))
        ));
        assert!(matches!(
            seq.seek_to_percentage(f64::NAN),
            Err(SpeechError::InvalidSeek(_))
        ));
        assert_eq!(seq.position(), before);
        assert_eq!(seq.gateway().spoken.len(), spoken);
        assert!(seq.is_speaking());
    }

    #[test]
    fn seeking_without_document_fails() {
        let mut seq = PlaybackSequencer::new(MockGateway::new());
        assert!(matches!(seq.seek_to_percentage(10.0), Err(SpeechError::NoDocument)));
        assert!(matches!(seq.seek_next_chunk(), Err(SpeechError::NoDocument)));
        assert!(matches!(seq.seek_previous_chunk(), Err(SpeechError::NoDocument)));
        assert!(matches!(seq.seek_relative(5.0), Err(SpeechError::NoDocument)));
    }

    #[test]
    fn next_chunk_stops_at_last() {
        let mut seq = playing(3);
        seq.seek_next_chunk().unwrap();
        seq.seek_next_chunk().unwrap();
        let spoken = seq.gateway().spoken.len();

        let err = seq.seek_next_chunk().unwrap_err();
        assert!(matches!(err, SpeechError::AtBoundary(Boundary::Last)));
        assert_eq!(err.to_string(), "Already at last chunk");
        assert_eq!(seq.position().current_index, 2);
        assert_eq!(seq.gateway().spoken.len(), spoken);
    }

    #[test]
    fn previous_chunk_stops_at_first() {
        let mut seq = playing(3);
        assert!(matches!(
            seq.seek_previous_chunk(),
            Err(SpeechError::AtBoundary(Boundary::First))
        ));
        seq.seek_next_chunk().unwrap();
        assert!(matches!(
            seq.seek_previous_chunk().unwrap(),
            PlayOutcome::Started { index: 0, .. }
        ));
    }

    #[test]
    fn previous_chunk_after_finish_replays_last() {
        let mut seq = playing(2);
        finish_current(&mut seq);
        finish_current(&mut seq);
        assert_eq!(seq.state(), PlaybackState::Finished);
        assert!(matches!(
            seq.seek_previous_chunk().unwrap(),
            PlayOutcome::Started { index: 1, .. }
        ));
    }

    #[test]
    fn seek_relative_moves_by_percent_and_clamps() {
        let mut seq = playing(4);
        assert!(matches!(
            seq.seek_relative(25.0).unwrap(),
            PlayOutcome::Started { index: 1, .. }
        ));
        assert!(matches!(
            seq.seek_relative(50.0).unwrap(),
            PlayOutcome::Started { index: 3, .. }
        ));
        assert!(matches!(
            seq.seek_relative(-200.0).unwrap(),
            PlayOutcome::Started { index: 0, .. }
        ));
    }

    #[test]
    fn seek_relative_by_zero_stays_put() {
        let mut seq = playing(3);
        seq.seek_next_chunk().unwrap();
        assert!(matches!(
            seq.seek_relative(0.0).unwrap(),
            PlayOutcome::Started { index: 1, .. }
        ));
    }

    #[test]
    fn seek_while_paused_resumes_playback() {
        let mut seq = playing(3);
        seq.pause();
        seq.seek_next_chunk().unwrap();
        assert!(!seq.is_paused());
        assert!(seq.is_speaking());
    }

    #[test]
    fn position_is_zero_when_unloaded() {
        let seq = PlaybackSequencer::new(MockGateway::new());
        assert_eq!(
            seq.position(),
            Position {
                current_index: 0,
                total: 0,
                percentage: 0,
                remaining: 0
            }
        );
    }

    #[test]
    fn position_tracks_progress() {
        let mut seq = playing(4);
        finish_current(&mut seq);
        assert_eq!(
            seq.position(),
            Position {
                current_index: 1,
                total: 4,
                percentage: 25,
                remaining: 3
            }
        );
    }

    #[test]
    fn stop_while_speaking_unloads() {
        let mut seq = playing(3);
        seq.stop();
        assert!(!seq.is_speaking());
        assert_eq!(seq.position().total, 0);
        assert_eq!(seq.state(), PlaybackState::Idle);
        assert!(seq.gateway().in_flight.is_none());
    }

    #[test]
    fn stop_and_cancel_are_safe_in_any_state() {
        let mut seq = PlaybackSequencer::new(MockGateway::new());
        seq.stop();
        seq.stop();
        seq.cancel();
        seq.cancel();
        assert_eq!(seq.state(), PlaybackState::Idle);

        let mut seq = playing(2);
        seq.cancel();
        seq.cancel();
        assert_eq!(seq.state(), PlaybackState::Ready);
        assert_eq!(seq.chunks().len(), 2);
        assert_eq!(seq.position().current_index, 0);
    }

    #[test]
    fn never_more_than_one_utterance_in_flight() {
        let mut seq = playing(6);
        seq.seek_to_percentage(40.0).unwrap();
        seq.pause();
        seq.seek_next_chunk().unwrap();
        seq.play_from(&SpeechOptions::default()).unwrap();
        finish_current(&mut seq);
        seq.resume().unwrap();
        seq.seek_relative(-30.0).unwrap();
        seq.play_from(&SpeechOptions::default()).unwrap();
        seq.seek_previous_chunk().unwrap();
        finish_current(&mut seq);
        seq.seek_to_percentage(100.0).unwrap();

        assert_eq!(seq.gateway().overlaps, 0);
        assert!(seq.gateway().in_flight.is_some());
    }
}
