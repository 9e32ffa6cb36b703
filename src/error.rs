use std::fmt;

/// Which end of the chunk sequence a chunk seek ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    First,
    Last,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::First => f.write_str("first"),
            Boundary::Last => f.write_str("last"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SpeechError {
    #[error("Speech synthesis is not available. Check that a speech engine is installed.")]
    Unavailable,
    #[error("No document loaded. Call convert() first.")]
    NoDocument,
    #[error("Nothing to speak: the document contains no readable text")]
    EmptyDocument,
    #[error("Seek target {0}% is outside 0-100%")]
    InvalidSeek(f64),
    #[error("Already at {0} chunk")]
    AtBoundary(Boundary),
    #[error("Invalid speech option: {0}")]
    InvalidOption(String),
    #[error("Speech synthesis failed on chunk {index}: {reason}")]
    Synthesis { index: usize, reason: String },
    #[error("Speech engine rejected the utterance: {0}")]
    Gateway(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Config(String),
}

impl SpeechError {
    /// Precondition failures leave the playback state untouched and can be
    /// retried once the caller fixes the input.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SpeechError::Unavailable
                | SpeechError::NoDocument
                | SpeechError::EmptyDocument
                | SpeechError::InvalidSeek(_)
                | SpeechError::AtBoundary(_)
                | SpeechError::InvalidOption(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SpeechError>;
