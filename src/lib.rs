//! MiniSynth: an on-screen piano keyboard driving a real-time sine tone engine.

pub mod app;
pub mod config;
pub mod core;
pub mod messaging;
pub mod ui;
pub mod utils;

pub use crate::config::SynthSettings;
pub use crate::core::audio::{AudioError, OutputStream};
pub use crate::core::oscillator::{FrequencyTable, NoteError, SineOscillator, ToneState};
pub use crate::core::synth::{EngineState, ToneController, ToneEngine};
