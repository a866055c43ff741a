//! Drives a blinker and a glider for a few generations and prints what the
//! audio side would play.
//!
//! Run with: cargo run --example blinker

use std::collections::HashMap;
use std::thread::{self, sleep};
use std::time::Duration;

use lifetone::{command_queue, AutomatonEngine, Grid, Preset, VoiceCommand, VoiceManager};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let preset = Preset::from_json(r#"{ "grid_size": { "rows": 12, "cols": 12 }, "waveform": "Triangle" }"#)?;
    let (backend, mut audio_rx) = command_queue(lifetone::DEFAULT_QUEUE_CAPACITY);

    let mut engine = AutomatonEngine::new(preset.grid_size.rows, preset.grid_size.cols)
        .with_rules(preset.rules.clone());
    let mut voices = VoiceManager::new(backend).with_parameters(preset.sound_parameters());

    // stand-in for the audio callback: keep a table of sounding oscillators
    let audio = thread::spawn(move || {
        let mut sounding = HashMap::new();
        loop {
            let done = audio_rx.is_disconnected();
            for command in audio_rx.drain() {
                match command {
                    VoiceCommand::Start { handle, frequency, waveform, .. } => {
                        sounding.insert(handle, (waveform, frequency));
                    }
                    VoiceCommand::Stop { handle, .. } => {
                        sounding.remove(&handle);
                    }
                    VoiceCommand::SetFrequency { handle, frequency } => {
                        if let Some(voice) = sounding.get_mut(&handle) {
                            voice.1 = frequency;
                        }
                    }
                    VoiceCommand::SetAmplitude { .. } => {}
                }
            }
            if done {
                break;
            }
            sleep(Duration::from_millis(5));
        }
        sounding.len()
    });

    // blinker
    for &(r, c) in &[(2, 7), (2, 8), (2, 9)] {
        engine.toggle_cell(r, c);
    }
    // glider
    for &(r, c) in &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)] {
        engine.toggle_cell(r, c);
    }
    voices.reconcile(&Grid::new(12, 12), engine.grid())?;

    for _ in 0..16 {
        sleep(Duration::from_millis(100));

        let previous = engine.grid().clone();
        let current = engine.step();
        let changes = voices.reconcile(&previous, current)?;

        println!(
            "generation {} ({}): +{} -{} voices, {} sounding\n{}",
            engine.generation(),
            engine.rules(),
            changes.born,
            changes.died,
            voices.active_voices(),
            engine.grid()
        );
    }

    drop(voices);
    let left = audio.join().map_err(|_| "audio thread panicked")?;
    println!("audio side after shutdown: {} voices", left);

    Ok(())
}
