//! Audio backend capability.
//!
//! The voice manager never synthesizes audio itself. It drives an
//! [`AudioBackend`], which receives fire-and-forget commands and is free to
//! apply them on its own real-time thread. The crate ships one backend,
//! [`QueueBackend`], that forwards every command over a lock-free ring buffer.

use core::fmt;

use serde::{Deserialize, Serialize};

pub mod queue;

pub use queue::{command_queue, CommandReceiver, QueueBackend, VoiceCommand, DEFAULT_QUEUE_CAPACITY};

/// Opaque identifier of a voice inside a backend.
///
/// Handles are only used to address commands. Holding one does not keep a
/// voice alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct VoiceHandle(pub(crate) u64);

impl VoiceHandle {
    /// Raw id, for backends that index their own voice tables with it.
    #[inline]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Oscillator shape of a voice.
///
/// Serialized by name. Unknown names fall back to [`Waveform::Sine`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Square => "Square",
            Waveform::Sawtooth => "Sawtooth",
            Waveform::Triangle => "Triangle",
        }
    }

    /// Look up a waveform by name, falling back to `Sine`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.name() == name)
            .unwrap_or_default()
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Sine
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Waveform {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Waveform> for String {
    fn from(waveform: Waveform) -> Self {
        waveform.name().into()
    }
}

/// Commands the voice manager issues to the audio subsystem.
///
/// Every call is a command submission: implementations must not block
/// waiting for the audio thread, and failures stay inside the backend.
/// The manager does not roll back its own state when a command is lost.
pub trait AudioBackend {
    /// Start a voice, optionally ramping its amplitude up from silence.
    fn start_voice(
        &mut self,
        waveform: Waveform,
        frequency: f32,
        amplitude: f32,
        fade_in: bool,
    ) -> VoiceHandle;

    /// Stop a voice, optionally ramping down before releasing it.
    fn stop_voice(&mut self, handle: VoiceHandle, fade_out: bool);

    fn set_voice_frequency(&mut self, handle: VoiceHandle, frequency: f32);

    fn set_voice_amplitude(&mut self, handle: VoiceHandle, amplitude: f32);
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn start_voice(
        &mut self,
        waveform: Waveform,
        frequency: f32,
        amplitude: f32,
        fade_in: bool,
    ) -> VoiceHandle {
        (**self).start_voice(waveform, frequency, amplitude, fade_in)
    }

    fn stop_voice(&mut self, handle: VoiceHandle, fade_out: bool) {
        (**self).stop_voice(handle, fade_out)
    }

    fn set_voice_frequency(&mut self, handle: VoiceHandle, frequency: f32) {
        (**self).set_voice_frequency(handle, frequency)
    }

    fn set_voice_amplitude(&mut self, handle: VoiceHandle, amplitude: f32) {
        (**self).set_voice_amplitude(handle, amplitude)
    }
}
