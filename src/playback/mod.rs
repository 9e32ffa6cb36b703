//! Sequenced playback over a [`SynthesisGateway`](crate::SynthesisGateway).
//!
//! [`PlaybackSequencer`] owns the chunk sequence and position and keeps at
//! most one utterance in flight. [`Narrator`] puts text preparation in
//! front of it and is what most hosts use.
//!
//! # Host event loop
//!
//! The speech engine reports progress asynchronously. The host forwards
//! each callback to [`Narrator::handle_event`] and, when it returns
//! [`Progress::Settling`], calls [`Narrator::continue_after_settle`] once
//! the delay has passed:
//!
//! ```ignore
//! match narrator.handle_event(event)? {
//!     Progress::Settling { delay } => schedule(delay, || narrator.continue_after_settle()),
//!     Progress::Finished => show_done(),
//!     _ => {}
//! }
//! ```

pub mod narrator;
pub mod sequencer;

pub use narrator::{Narrator, SessionHandle};
pub use sequencer::{PlayOutcome, PlaybackSequencer, PlaybackState, Position, Progress};
