// Waveform preview for the display

use crate::core::oscillator::ToneState;
use std::f64::consts::TAU;

/// Number of cycles shown in the preview
pub const PREVIEW_CYCLES: f64 = 2.0;

/// Generate `points` preview points of the current tone.
///
/// X runs over [0, 1) regardless of pitch so every note shows the same number of
/// cycles; silence is a flat line.
pub fn generate_tone_preview(tone: ToneState, amplitude: f32, points: usize) -> Vec<[f32; 2]> {
    let mut result = Vec::with_capacity(points);

    for i in 0..points {
        let x = i as f64 / points as f64;
        let y = match tone {
            ToneState::Silent => 0.0,
            ToneState::Sounding { .. } => amplitude as f64 * (TAU * PREVIEW_CYCLES * x).sin(),
        };
        result.push([x as f32, y as f32]);
    }

    result
}
