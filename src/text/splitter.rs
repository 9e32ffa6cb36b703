use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalizer::add_natural_pauses;

/// Default number of sentences spoken per utterance.
pub const DEFAULT_SENTENCES_PER_CHUNK: usize = 3;

/// Text closed by one or more `. ! ?` (plus any closing quotes) that is
/// followed by whitespace or the end of input, so `3.50` stays whole.
static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s).+?[.!?]+["'”’)\]]*(?:\s|$)"#).expect("Invalid sentence regex")
});

/// How large a chunk may grow before it is handed to the speech engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ChunkPolicy {
    /// At most `max_sentences` whole sentences per chunk.
    Sentences { max_sentences: usize },
    /// Whole sentences up to `max_chars` characters. A single longer
    /// sentence still becomes one chunk.
    Characters { max_chars: usize },
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        ChunkPolicy::Sentences {
            max_sentences: DEFAULT_SENTENCES_PER_CHUNK,
        }
    }
}

/// Ordered, immutable chunks of a document in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkSequence {
    chunks: Vec<String>,
}

impl ChunkSequence {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.chunks.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.chunks
    }

    /// False for the single blank chunk produced from empty input.
    pub fn is_speakable(&self) -> bool {
        self.chunks.iter().any(|c| !c.trim().is_empty())
    }

    pub fn into_vec(self) -> Vec<String> {
        self.chunks
    }
}

impl From<Vec<String>> for ChunkSequence {
    fn from(chunks: Vec<String>) -> Self {
        Self { chunks }
    }
}

/// Split normalized text into sentence-safe chunks.
///
/// Pause punctuation is inserted first (see [`add_natural_pauses`]). A
/// sentence is never cut in half; trailing text without a terminator
/// becomes the last sentence. Text with no terminator at all is returned
/// as one chunk, and empty input yields one blank chunk.
pub fn split(text: &str, policy: ChunkPolicy) -> ChunkSequence {
    if text.trim().is_empty() {
        return ChunkSequence::from(vec![text.to_string()]);
    }

    let paused = add_natural_pauses(text);
    if !SENTENCE_RE.is_match(&paused) {
        log::debug!("No sentence terminator found, using a single chunk");
        return ChunkSequence::from(vec![paused.trim().to_string()]);
    }

    let sentences = split_sentences(&paused);
    let chunks = match policy {
        ChunkPolicy::Sentences { max_sentences } => group_by_count(&sentences, max_sentences.max(1)),
        ChunkPolicy::Characters { max_chars } => group_by_length(&sentences, max_chars.max(1)),
    };

    log::debug!(
        "Split {} sentences into {} chunks ({policy:?})",
        sentences.len(),
        chunks.len()
    );
    ChunkSequence::from(chunks)
}

/// Break text into trimmed sentences, keeping any unterminated tail.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last = 0;

    for m in SENTENCE_RE.find_iter(text) {
        // Start from `last` so stray leading terminators stay attached.
        let sentence = text[last..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        last = m.end();
    }

    let tail = text[last..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

fn group_by_count(sentences: &[&str], max_sentences: usize) -> Vec<String> {
    sentences
        .chunks(max_sentences)
        .map(|group| group.join(" ").trim().to_string())
        .collect()
}

fn group_by_length(sentences: &[&str], max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut running = String::new();
    let mut running_len = 0usize;

    for sentence in sentences {
        let sentence_len = sentence.chars().count();
        if !running.is_empty() && running_len + 1 + sentence_len > max_chars {
            chunks.push(std::mem::take(&mut running));
            running_len = 0;
        }

        if running.is_empty() {
            running.push_str(sentence);
            running_len = sentence_len;
        } else {
            running.push(' ');
            running.push_str(sentence);
            running_len += 1 + sentence_len;
        }
    }

    if !running.is_empty() {
        chunks.push(running);
    }
    chunks
}
