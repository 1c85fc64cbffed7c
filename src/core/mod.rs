pub mod audio;
pub mod oscillator;
pub mod synth;
