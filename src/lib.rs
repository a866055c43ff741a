//! Lifetone - sonification core for Life-like cellular automata
//!
//! Design principles:
//! - The automaton owns grid content only and knows nothing about sound
//! - Grids are handed out as read-only snapshots after every step
//! - One voice per live cell, owned by an explicit registry (no globals)
//! - Voices are controlled by fire-and-forget commands, never shared state
//! - No locks: the control side is single-threaded, the audio thread only
//!   sees a lock-free command queue
//!
//! A driver (timer, GUI) runs the loop:
//!
//! ```
//! use lifetone::{command_queue, AutomatonEngine, Grid, VoiceManager};
//!
//! let (backend, mut audio_rx) = command_queue(1024);
//! let mut engine = AutomatonEngine::new(20, 20);
//! let mut voices = VoiceManager::new(backend);
//!
//! engine.toggle_cell(5, 5);
//! engine.toggle_cell(5, 6);
//! engine.toggle_cell(5, 7);
//! voices.reconcile(&Grid::new(20, 20), engine.grid()).unwrap();
//!
//! for _ in 0..4 {
//!     let previous = engine.grid().clone();
//!     let current = engine.step();
//!     voices.reconcile(&previous, current).unwrap();
//!
//!     // On the audio thread:
//!     for _command in audio_rx.drain() { /* start/stop/retune oscillators */ }
//! }
//!
//! assert_eq!(voices.active_voices(), engine.grid().population());
//! ```

mod automaton;
mod error;
mod grid;
mod preset;
mod rules;
mod voice;
pub mod backend;

pub use automaton::AutomatonEngine;
pub use backend::{
    command_queue, AudioBackend, CommandReceiver, QueueBackend, VoiceCommand, VoiceHandle,
    Waveform, DEFAULT_QUEUE_CAPACITY,
};
pub use error::{PresetError, VoiceError};
pub use grid::{CellId, Grid};
pub use preset::{GridSize, Preset};
pub use rules::RuleSet;
pub use voice::{map_frequency, Reconciliation, SoundParameters, Voice, VoiceManager};
