use crate::{
    Result, SpeechError, SpeechOptions, SynthesisGateway, UtteranceEvent, UtteranceHandle,
    VoiceRef,
};

/// In-memory speech engine that records what it was asked to do.
#[derive(Debug, Default)]
pub struct MockGateway {
    pub unavailable: bool,
    pub voices: Vec<VoiceRef>,
    /// Rejects the next `speak` call with this reason.
    pub reject_next: Option<String>,
    pub spoken: Vec<String>,
    pub last_options: Option<SpeechOptions>,
    pub in_flight: Option<UtteranceHandle>,
    /// `speak` calls made while another utterance was still in flight.
    pub overlaps: usize,
    pub pauses: usize,
    pub resumes: usize,
    pub cancels: usize,
    next_id: u64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Complete the utterance in flight, as the engine would.
    pub fn finish(&mut self) -> UtteranceEvent {
        let handle = self.in_flight.take().expect("nothing in flight");
        UtteranceEvent::ended(handle)
    }

    /// Fail the utterance in flight.
    pub fn fail(&mut self, reason: &str) -> UtteranceEvent {
        let handle = self.in_flight.take().expect("nothing in flight");
        UtteranceEvent::failed(handle, reason)
    }

    pub fn current(&self) -> UtteranceHandle {
        self.in_flight.expect("nothing in flight")
    }
}

impl SynthesisGateway for MockGateway {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn speak(&mut self, text: &str, options: &SpeechOptions) -> Result<UtteranceHandle> {
        if let Some(reason) = self.reject_next.take() {
            return Err(SpeechError::Gateway(reason));
        }
        if self.in_flight.is_some() {
            self.overlaps += 1;
        }
        self.next_id += 1;
        let handle = UtteranceHandle(self.next_id);
        self.in_flight = Some(handle);
        self.spoken.push(text.to_string());
        self.last_options = Some(options.clone());
        Ok(handle)
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn resume(&mut self) {
        self.resumes += 1;
    }

    fn cancel_all(&mut self) {
        self.cancels += 1;
        self.in_flight = None;
    }

    fn list_voices(&self) -> Vec<VoiceRef> {
        self.voices.clone()
    }
}
