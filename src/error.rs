//! Error types.
//!
//! Only caller contract violations and malformed input surface as errors.
//! State drift between the voice registry and the grid is absorbed and
//! logged instead.

/// Errors reported by [`VoiceManager`](crate::VoiceManager).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    /// `reconcile` was handed two grids of different sizes. This means the
    /// driver resized the automaton without shutting the voices down first.
    #[error("cannot reconcile grids of different dimensions: previous {previous:?}, current {current:?}")]
    DimensionMismatch {
        /// `(rows, cols)` of the previous grid
        previous: (usize, usize),
        /// `(rows, cols)` of the current grid
        current: (usize, usize),
    },
}

/// Errors reading or writing a [`Preset`](crate::Preset).
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    /// The preset text is not valid JSON of the expected shape.
    #[error("invalid preset: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
