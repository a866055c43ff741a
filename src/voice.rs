//! Voice lifecycle - keeps one sounding voice per live cell.
//!
//! The [`VoiceManager`] owns a registry of active voices keyed by cell. Each
//! generation the driver hands it the grid before and after the step; born
//! cells get a voice, dead cells lose theirs. Parameter changes (frequency
//! range, amplitude, waveform) are pushed to every active voice.

use hashbrown::HashMap;
use tracing::{debug, error, info, trace, warn};

use crate::backend::{AudioBackend, VoiceHandle, Waveform};
use crate::error::VoiceError;
use crate::grid::{CellId, Grid};

/// Sound settings shared by every voice of a [`VoiceManager`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SoundParameters {
    /// `(min, max)` in Hz
    pub frequency_range: (f32, f32),
    /// Steady-state level, `0.0..=1.0`
    pub amplitude: f32,
    pub waveform: Waveform,
    /// Fade voices in and out instead of switching them instantly
    pub smooth_transitions: bool,
}

impl Default for SoundParameters {
    fn default() -> Self {
        Self {
            frequency_range: (200.0, 1000.0),
            amplitude: 0.5,
            waveform: Waveform::Sine,
            smooth_transitions: true,
        }
    }
}

/// Pitch of a cell.
///
/// The column sweeps the whole range, the row adds a half-weighted offset on
/// top: `min + span * col/cols + 0.5 * span * row/rows`. A zero dimension
/// contributes nothing.
pub fn map_frequency(range: (f32, f32), dimensions: (usize, usize), cell: CellId) -> f32 {
    let (min, max) = range;
    let (rows, cols) = dimensions;
    let span = max - min;

    let ratio = |pos: usize, len: usize| {
        if len == 0 {
            0.0
        } else {
            pos as f32 / len as f32
        }
    };

    min + span * ratio(cell.col, cols) + 0.5 * span * ratio(cell.row, rows)
}

/// One sounding oscillator bound to a cell.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Voice {
    cell: CellId,
    frequency: f32,
    amplitude: f32,
    waveform: Waveform,
    fading: bool,
    handle: VoiceHandle,
}

impl Voice {
    #[inline]
    pub fn cell(&self) -> CellId {
        self.cell
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    #[inline]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Whether the voice was started with a fade-in.
    #[inline]
    pub fn fading(&self) -> bool {
        self.fading
    }

    #[inline]
    pub fn handle(&self) -> VoiceHandle {
        self.handle
    }
}

/// What a [`VoiceManager::reconcile`] call changed.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Reconciliation {
    /// Voices started
    pub born: usize,
    /// Voices stopped
    pub died: usize,
}

impl Reconciliation {
    /// True if no voice was started or stopped.
    pub fn is_empty(&self) -> bool {
        self.born == 0 && self.died == 0
    }
}

/// Keeps a registry of active voices in sync with the live cells of a grid.
///
/// After every successful [`reconcile`](Self::reconcile) the registry holds
/// exactly one voice per live cell of the `current` grid, provided `previous`
/// was the grid of the preceding call.
///
/// The manager is single-threaded; backend calls are fire-and-forget. Drop
/// (or [`shutdown`](Self::shutdown)) stops every remaining voice, so the
/// backend is always silenced before it is torn down.
///
/// # Example
///
/// ```
/// use lifetone::{command_queue, AutomatonEngine, VoiceManager};
///
/// let (backend, mut audio_rx) = command_queue(256);
/// let mut engine = AutomatonEngine::new(8, 8);
/// let mut voices = VoiceManager::new(backend);
///
/// for &(r, c) in &[(3, 2), (3, 3), (3, 4)] {
///     engine.toggle_cell(r, c);
/// }
///
/// // Sound the hand-drawn cells, then step
/// voices.reconcile(&lifetone::Grid::new(8, 8), engine.grid()).unwrap();
/// let previous = engine.grid().clone();
/// let current = engine.step();
/// let changes = voices.reconcile(&previous, current).unwrap();
///
/// assert_eq!((changes.born, changes.died), (2, 2));
/// assert_eq!(voices.active_voices(), 3);
/// # let _ = audio_rx.drain().count();
/// ```
pub struct VoiceManager<B: AudioBackend> {
    backend: B,
    params: SoundParameters,
    voices: HashMap<CellId, Voice>,
    /// Dimensions of the last reconciled grid, used for frequency mapping
    dimensions: Option<(usize, usize)>,
}

impl<B: AudioBackend> VoiceManager<B> {
    /// Create a manager with default [`SoundParameters`].
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            params: SoundParameters::default(),
            voices: HashMap::new(),
            dimensions: None,
        }
    }

    /// Start from the given parameters (builder pattern).
    pub fn with_parameters(mut self, mut params: SoundParameters) -> Self {
        params.amplitude = sanitize_amplitude(params.amplitude);
        params.frequency_range =
            sanitize_range(params.frequency_range, SoundParameters::default().frequency_range);
        self.params = params;
        self
    }

    #[inline]
    pub fn parameters(&self) -> &SoundParameters {
        &self.params
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Number of sounding voices.
    #[inline]
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn voice(&self, cell: CellId) -> Option<&Voice> {
        self.voices.get(&cell)
    }

    /// All active voices, in no particular order.
    pub fn voices(&self) -> impl Iterator<Item = &Voice> + '_ {
        self.voices.values()
    }

    pub fn is_sounding(&self, cell: CellId) -> bool {
        self.voices.contains_key(&cell)
    }

    /// Pitch the given cell would sound at, using the dimensions of the last
    /// reconciled grid. `None` before the first reconcile.
    pub fn frequency_for(&self, cell: CellId) -> Option<f32> {
        self.dimensions
            .map(|dims| map_frequency(self.params.frequency_range, dims, cell))
    }

    /// Bring the voice registry in line with a generation change.
    ///
    /// Cells that went dead→alive get a new voice, alive→dead cells have
    /// theirs stopped. Unchanged cells issue no commands, so
    /// `reconcile(g, g)` is silent.
    ///
    /// A born cell that already has a voice and a dying cell without one are
    /// both ignored (with a warning for the latter).
    ///
    /// # Errors
    ///
    /// [`VoiceError::DimensionMismatch`] if the grids differ in size. Nothing
    /// is started or stopped in that case.
    pub fn reconcile(&mut self, previous: &Grid, current: &Grid) -> Result<Reconciliation, VoiceError> {
        if previous.dimensions() != current.dimensions() {
            let err = VoiceError::DimensionMismatch {
                previous: previous.dimensions(),
                current: current.dimensions(),
            };
            error!(%err, "reconcile rejected");
            return Err(err);
        }

        if let Some(dims) = self.dimensions {
            if dims != current.dimensions() && !self.voices.is_empty() {
                warn!(
                    stale = self.voices.len(),
                    ?dims,
                    current = ?current.dimensions(),
                    "grid dimensions changed without a voice shutdown"
                );
            }
        }
        self.dimensions = Some(current.dimensions());

        let mut summary = Reconciliation::default();
        for cell in current.coords() {
            let was_alive = previous.is_alive(cell.row, cell.col);
            let is_alive = current.is_alive(cell.row, cell.col);

            match (was_alive, is_alive) {
                (false, true) => {
                    if self.start(cell) {
                        summary.born += 1;
                    }
                }
                (true, false) => {
                    if self.stop(cell) {
                        summary.died += 1;
                    }
                }
                _ => {}
            }
        }

        let population = current.population();
        if self.voices.len() != population {
            warn!(
                voices = self.voices.len(),
                population,
                "voice registry out of step with live cells"
            );
        }

        debug!(
            born = summary.born,
            died = summary.died,
            active = self.voices.len(),
            "voices reconciled"
        );
        Ok(summary)
    }

    /// Change the frequency range and retune every active voice in place.
    ///
    /// A non-finite bound is ignored and the current one kept.
    pub fn set_frequency_range(&mut self, min: f32, max: f32) {
        let (min, max) = sanitize_range((min, max), self.params.frequency_range);
        self.params.frequency_range = (min, max);
        debug!(min, max, "frequency range changed");

        let dims = match self.dimensions {
            Some(dims) => dims,
            None => return,
        };

        for voice in self.voices.values_mut() {
            voice.frequency = map_frequency((min, max), dims, voice.cell);
            self.backend.set_voice_frequency(voice.handle, voice.frequency);
        }
    }

    /// Change the amplitude of every active voice. Clamped to `0.0..=1.0`.
    pub fn set_amplitude(&mut self, amplitude: f32) {
        let amplitude = sanitize_amplitude(amplitude);
        self.params.amplitude = amplitude;
        debug!(amplitude, "amplitude changed");

        for voice in self.voices.values_mut() {
            voice.amplitude = amplitude;
            self.backend.set_voice_amplitude(voice.handle, amplitude);
        }
    }

    /// Change the waveform.
    ///
    /// Backends cannot swap the timbre of a running oscillator, so every
    /// active voice is stopped and immediately restarted with the new
    /// waveform at the same cell, frequency and amplitude. The stop/start
    /// pair is issued even if the waveform did not change.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.params.waveform = waveform;
        let smooth = self.params.smooth_transitions;
        debug!(%waveform, restarting = self.voices.len(), "waveform changed");

        for voice in self.voices.values_mut() {
            self.backend.stop_voice(voice.handle, smooth);
            voice.handle =
                self.backend
                    .start_voice(waveform, voice.frequency, voice.amplitude, smooth);
            voice.waveform = waveform;
            voice.fading = smooth;
        }
    }

    /// Enable or disable fades for voices started or stopped from now on.
    pub fn set_smooth_transitions(&mut self, enabled: bool) {
        self.params.smooth_transitions = enabled;
        debug!(enabled, "smooth transitions changed");
    }

    /// Stop every voice immediately and empty the registry.
    ///
    /// Safe to call repeatedly; a second call issues no commands. Required
    /// around [`AutomatonEngine::resize`](crate::AutomatonEngine::resize),
    /// since voices keyed by old coordinates are unreachable afterwards.
    /// After a shutdown the registry is empty, so the next `reconcile` must
    /// use an all-dead grid as `previous` to sound the cells still alive:
    ///
    /// ```
    /// use lifetone::{command_queue, AutomatonEngine, Grid, VoiceManager};
    ///
    /// let (backend, _audio_rx) = command_queue(64);
    /// let mut engine = AutomatonEngine::new(8, 8);
    /// let mut voices = VoiceManager::new(backend);
    /// for &(r, c) in &[(1, 1), (1, 2), (2, 1), (2, 2)] {
    ///     engine.toggle_cell(r, c);
    /// }
    /// voices.reconcile(&Grid::new(8, 8), engine.grid()).unwrap();
    ///
    /// voices.shutdown();
    /// engine.resize(6, 6);
    /// voices.reconcile(&Grid::new(6, 6), engine.grid()).unwrap();
    /// assert_eq!(voices.active_voices(), 4);
    /// ```
    pub fn shutdown(&mut self) {
        self.dimensions = None;
        if self.voices.is_empty() {
            return;
        }

        let stopped = self.voices.len();
        for (_, voice) in self.voices.drain() {
            self.backend.stop_voice(voice.handle, false);
        }
        info!(stopped, "voices shut down");
    }

    fn start(&mut self, cell: CellId) -> bool {
        if self.voices.contains_key(&cell) {
            trace!(%cell, "voice already sounding");
            return false;
        }

        let frequency = match self.frequency_for(cell) {
            Some(f) => f,
            None => return false,
        };
        let SoundParameters {
            amplitude,
            waveform,
            smooth_transitions,
            ..
        } = self.params;

        let handle = self
            .backend
            .start_voice(waveform, frequency, amplitude, smooth_transitions);
        trace!(%cell, frequency, ?handle, "voice started");

        self.voices.insert(
            cell,
            Voice {
                cell,
                frequency,
                amplitude,
                waveform,
                fading: smooth_transitions,
                handle,
            },
        );
        true
    }

    fn stop(&mut self, cell: CellId) -> bool {
        match self.voices.remove(&cell) {
            Some(voice) => {
                self.backend
                    .stop_voice(voice.handle, self.params.smooth_transitions);
                trace!(%cell, handle = ?voice.handle, "voice stopped");
                true
            }
            None => {
                warn!(%cell, "cell died without a registered voice");
                false
            }
        }
    }
}

impl<B: AudioBackend> Drop for VoiceManager<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn sanitize_amplitude(amplitude: f32) -> f32 {
    if amplitude.is_nan() {
        0.0
    } else {
        amplitude.clamp(0.0, 1.0)
    }
}

fn sanitize_range(range: (f32, f32), fallback: (f32, f32)) -> (f32, f32) {
    let pick = |value: f32, keep: f32| {
        if value.is_finite() {
            value
        } else {
            warn!(value, keep, "non-finite frequency bound ignored");
            keep
        }
    };
    (pick(range.0, fallback.0), pick(range.1, fallback.1))
}
