//! Ring-buffer backend - forwards voice commands to the audio thread.

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

use crate::backend::{AudioBackend, VoiceHandle, Waveform};

/// Default command queue size, enough for a full 64x64 grid turning over in
/// one generation.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

/// A command for the audio thread.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum VoiceCommand {
    /// Create a voice under `handle` and start it
    Start {
        handle: VoiceHandle,
        waveform: Waveform,
        frequency: f32,
        amplitude: f32,
        fade_in: bool,
    },
    /// Stop and release the voice
    Stop { handle: VoiceHandle, fade_out: bool },
    SetFrequency { handle: VoiceHandle, frequency: f32 },
    SetAmplitude { handle: VoiceHandle, amplitude: f32 },
}

impl VoiceCommand {
    /// The voice this command addresses.
    pub fn handle(&self) -> VoiceHandle {
        match *self {
            VoiceCommand::Start { handle, .. }
            | VoiceCommand::Stop { handle, .. }
            | VoiceCommand::SetFrequency { handle, .. }
            | VoiceCommand::SetAmplitude { handle, .. } => handle,
        }
    }
}

/// Create a connected backend / receiver pair.
///
/// The [`QueueBackend`] goes to the [`VoiceManager`](crate::VoiceManager);
/// the [`CommandReceiver`] is moved to the audio thread, which drains it at
/// the start of every block.
///
/// ```
/// use lifetone::{command_queue, VoiceCommand, VoiceManager, Grid};
///
/// let (backend, mut receiver) = command_queue(64);
/// let mut voices = VoiceManager::new(backend);
///
/// let previous = Grid::new(4, 4);
/// let current = Grid::with_live_cells(4, 4, vec![(0, 0)]);
/// voices.reconcile(&previous, &current).unwrap();
///
/// let commands: Vec<VoiceCommand> = receiver.drain().collect();
/// assert!(matches!(commands[0], VoiceCommand::Start { frequency, .. } if frequency == 200.0));
/// ```
pub fn command_queue(capacity: usize) -> (QueueBackend, CommandReceiver) {
    let (producer, consumer) = RingBuffer::new(capacity);
    let backend = QueueBackend {
        producer,
        next_handle: 0,
        dropped: 0,
    };
    (backend, CommandReceiver { consumer })
}

/// [`AudioBackend`] that pushes every call onto a lock-free queue.
///
/// Handles are allocated here, on the control side, so starting a voice
/// never waits for the audio thread. If the queue is full the command is
/// dropped and counted; see [`dropped_commands`](Self::dropped_commands).
pub struct QueueBackend {
    producer: Producer<VoiceCommand>,
    next_handle: u64,
    dropped: u64,
}

impl QueueBackend {
    /// Send a command to the audio thread.
    ///
    /// Returns `Err(cmd)` if the queue is full (command dropped).
    pub fn send(&mut self, cmd: VoiceCommand) -> Result<(), VoiceCommand> {
        self.producer.push(cmd).map_err(|rtrb::PushError::Full(c)| c)
    }

    /// Number of commands lost to a full queue so far.
    #[inline]
    pub fn dropped_commands(&self) -> u64 {
        self.dropped
    }

    /// Free slots left in the queue.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.producer.slots()
    }

    /// Whether the audio thread dropped its receiver.
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.producer.is_abandoned()
    }

    fn submit(&mut self, cmd: VoiceCommand) {
        if let Err(cmd) = self.send(cmd) {
            self.dropped += 1;
            warn!(?cmd, dropped = self.dropped, "voice command queue full, command dropped");
        }
    }
}

impl AudioBackend for QueueBackend {
    fn start_voice(
        &mut self,
        waveform: Waveform,
        frequency: f32,
        amplitude: f32,
        fade_in: bool,
    ) -> VoiceHandle {
        let handle = VoiceHandle(self.next_handle);
        self.next_handle += 1;

        self.submit(VoiceCommand::Start {
            handle,
            waveform,
            frequency,
            amplitude,
            fade_in,
        });
        handle
    }

    fn stop_voice(&mut self, handle: VoiceHandle, fade_out: bool) {
        self.submit(VoiceCommand::Stop { handle, fade_out });
    }

    fn set_voice_frequency(&mut self, handle: VoiceHandle, frequency: f32) {
        self.submit(VoiceCommand::SetFrequency { handle, frequency });
    }

    fn set_voice_amplitude(&mut self, handle: VoiceHandle, amplitude: f32) {
        self.submit(VoiceCommand::SetAmplitude { handle, amplitude });
    }
}

/// Audio-thread end of a [`command_queue`].
pub struct CommandReceiver {
    consumer: Consumer<VoiceCommand>,
}

impl CommandReceiver {
    /// Pop the oldest pending command.
    #[inline]
    pub fn pop(&mut self) -> Option<VoiceCommand> {
        self.consumer.pop().ok()
    }

    /// Drain every pending command, oldest first. Does not allocate.
    pub fn drain(&mut self) -> impl Iterator<Item = VoiceCommand> + '_ {
        let consumer = &mut self.consumer;
        core::iter::from_fn(move || consumer.pop().ok())
    }

    /// Number of commands waiting.
    #[inline]
    pub fn pending(&self) -> usize {
        self.consumer.slots()
    }

    /// Whether the control side dropped its backend.
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.consumer.is_abandoned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_arrive_in_order() {
        let (mut backend, mut rx) = command_queue(16);

        let a = backend.start_voice(Waveform::Square, 220.0, 0.5, true);
        backend.set_voice_frequency(a, 330.0);
        backend.set_voice_amplitude(a, 0.25);
        backend.stop_voice(a, false);

        let commands: Vec<_> = rx.drain().collect();
        assert_eq!(
            commands,
            vec![
                VoiceCommand::Start {
                    handle: a,
                    waveform: Waveform::Square,
                    frequency: 220.0,
                    amplitude: 0.5,
                    fade_in: true,
                },
                VoiceCommand::SetFrequency { handle: a, frequency: 330.0 },
                VoiceCommand::SetAmplitude { handle: a, amplitude: 0.25 },
                VoiceCommand::Stop { handle: a, fade_out: false },
            ]
        );
        assert!(commands.iter().all(|c| c.handle() == a));
        assert_eq!(rx.pending(), 0);
    }

    #[test]
    fn pop_takes_one_command_at_a_time() {
        let (mut backend, mut rx) = command_queue(4);
        assert_eq!(rx.pop(), None);

        let h = backend.start_voice(Waveform::Sawtooth, 110.0, 0.5, true);
        backend.stop_voice(h, true);
        assert_eq!(rx.pending(), 2);

        assert!(matches!(rx.pop(), Some(VoiceCommand::Start { handle, .. }) if handle == h));
        assert_eq!(rx.pending(), 1);
        assert_eq!(rx.pop(), Some(VoiceCommand::Stop { handle: h, fade_out: true }));
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn handles_are_unique() {
        let (mut backend, _rx) = command_queue(16);
        let a = backend.start_voice(Waveform::Sine, 100.0, 1.0, false);
        let b = backend.start_voice(Waveform::Sine, 100.0, 1.0, false);
        assert_ne!(a, b);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let (mut backend, mut rx) = command_queue(2);

        let h = backend.start_voice(Waveform::Sine, 100.0, 1.0, false);
        backend.set_voice_frequency(h, 200.0);
        assert_eq!(backend.free_slots(), 0);

        backend.set_voice_frequency(h, 300.0);
        backend.stop_voice(h, false);
        assert_eq!(backend.dropped_commands(), 2);

        assert_eq!(rx.drain().count(), 2);
        assert_eq!(backend.free_slots(), 2);
    }

    #[test]
    fn disconnect_is_visible_from_both_ends() {
        let (backend, rx) = command_queue(4);
        assert!(!backend.is_disconnected());
        drop(rx);
        assert!(backend.is_disconnected());

        let (backend, rx) = command_queue(4);
        drop(backend);
        assert!(rx.is_disconnected());
    }
}
