mod keyboard;
mod waveform_plot;

pub use keyboard::{Keyboard, KeyEvent, PianoKey};
pub use waveform_plot::WaveformPlot;
