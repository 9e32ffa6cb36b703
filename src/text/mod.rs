//! Text preparation for speech.
//!
//! Raw extracted text goes through three stages before it reaches the
//! speech engine:
//!
//! 1. [`FootnoteExtractor`] cuts a trailing footnote section off the body
//!    and can read each note where it is referenced.
//! 2. [`normalize`] rewrites abbreviations, acronyms, ordinals and currency
//!    for correct pronunciation.
//! 3. [`split`] inserts pause punctuation and breaks the text into
//!    sentence-safe chunks under a [`ChunkPolicy`].
//!
//! ```
//! use narrate_rs::text::{normalize, split, ChunkPolicy};
//!
//! let text = normalize("Dr. Who arrived. He left on the 3rd. The end.");
//! let chunks = split(&text, ChunkPolicy::Sentences { max_sentences: 2 });
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks.get(0), Some("Doctor Who arrived. He left on the third."));
//! ```

pub mod footnotes;
pub mod normalizer;
pub mod splitter;

pub use footnotes::{
    find_markers, fold_marker, Extraction, FootnoteExtractor, FootnoteMarker, FootnoteTable,
};
pub use normalizer::{add_natural_pauses, normalize};
pub use splitter::{split, split_sentences, ChunkPolicy, ChunkSequence};
