//! Preset data - the persisted shape of a session's settings.
//!
//! The crate does not touch the filesystem. A preset layer reads or writes
//! the JSON text and uses [`Preset::from_json`] / [`Preset::to_json`] to
//! exchange it with the core.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::automaton::AutomatonEngine;
use crate::backend::{AudioBackend, Waveform};
use crate::error::{PresetError, VoiceError};
use crate::grid::Grid;
use crate::rules::RuleSet;
use crate::voice::{SoundParameters, VoiceManager};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridSize {
    fn default() -> Self {
        Self { rows: 20, cols: 20 }
    }
}

/// Rules, grid size and sound settings of a session.
///
/// Missing fields take their defaults; unknown fields (colours, UI state)
/// are ignored.
///
/// ```
/// use lifetone::{Preset, Waveform};
///
/// let preset = Preset::from_json(r##"{
///     "rules": { "birth": [3, 6], "survival": [2, 3] },
///     "waveform": "Square",
///     "live_color": "#00ff00"
/// }"##).unwrap();
///
/// assert_eq!(preset.rules.to_string(), "B36/S23");
/// assert_eq!(preset.waveform, Waveform::Square);
/// assert_eq!(preset.grid_size.rows, 20);
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub rules: RuleSet,
    pub grid_size: GridSize,
    /// `[min, max]` in Hz
    pub frequency_range: (f32, f32),
    pub amplitude: f32,
    pub waveform: Waveform,
    pub smooth_transitions: bool,
}

impl Default for Preset {
    fn default() -> Self {
        let sound = SoundParameters::default();
        Self {
            rules: RuleSet::default(),
            grid_size: GridSize::default(),
            frequency_range: sound.frequency_range,
            amplitude: sound.amplitude,
            waveform: sound.waveform,
            smooth_transitions: sound.smooth_transitions,
        }
    }
}

impl Preset {
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON with four-space indentation.
    pub fn to_json(&self) -> Result<String, PresetError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Snapshot the current settings of an engine and its voice manager.
    pub fn capture<B: AudioBackend>(engine: &AutomatonEngine, voices: &VoiceManager<B>) -> Self {
        let (rows, cols) = engine.dimensions();
        let sound = voices.parameters();
        Self {
            rules: engine.rules().clone(),
            grid_size: GridSize { rows, cols },
            frequency_range: sound.frequency_range,
            amplitude: sound.amplitude,
            waveform: sound.waveform,
            smooth_transitions: sound.smooth_transitions,
        }
    }

    pub fn sound_parameters(&self) -> SoundParameters {
        SoundParameters {
            frequency_range: self.frequency_range,
            amplitude: self.amplitude,
            waveform: self.waveform,
            smooth_transitions: self.smooth_transitions,
        }
    }

    /// Apply this preset to a running session.
    ///
    /// Sound settings go through the manager's setters, so active voices are
    /// retuned and restarted as usual. If the grid size changes, every voice
    /// is shut down before the resize and the surviving cells are sounded
    /// afresh on the new grid.
    pub fn apply<B: AudioBackend>(
        &self,
        engine: &mut AutomatonEngine,
        voices: &mut VoiceManager<B>,
    ) -> Result<(), VoiceError> {
        let GridSize { rows, cols } = self.grid_size;
        let resized = engine.dimensions() != (rows, cols);
        if resized {
            voices.shutdown();
            engine.resize(rows, cols);
        }

        engine.set_rule_set(self.rules.clone());

        voices.set_smooth_transitions(self.smooth_transitions);
        voices.set_frequency_range(self.frequency_range.0, self.frequency_range.1);
        voices.set_amplitude(self.amplitude);
        voices.set_waveform(self.waveform);

        if resized {
            voices.reconcile(&Grid::new(rows, cols), engine.grid())?;
        }

        debug!(rules = %self.rules, rows, cols, resized, "preset applied");
        Ok(())
    }
}
