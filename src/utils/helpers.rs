use crate::core::oscillator::ToneState;

/// Sharp spellings of the twelve pitch classes, starting at C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Scientific pitch name of a MIDI note, with 60 = C4 and 69 = A4
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

/// Format a frequency value with appropriate unit suffix (Hz, kHz)
pub fn format_frequency(freq: f64) -> String {
    if freq >= 1000.0 {
        format!("{:.2} kHz", freq / 1000.0)
    } else {
        format!("{:.1} Hz", freq)
    }
}

/// One-line description of what the engine is playing
pub fn describe_tone(tone: ToneState) -> String {
    match tone {
        ToneState::Silent => "Silent".to_string(),
        ToneState::Sounding { note, frequency } => {
            format!("{} ({})", note_name(note), format_frequency(frequency))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_scientific_pitch() {
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(127), "G9");
    }

    #[test]
    fn frequencies_pick_a_unit() {
        assert_eq!(format_frequency(440.0), "440.0 Hz");
        assert_eq!(format_frequency(4186.009), "4.19 kHz");
    }

    #[test]
    fn describes_sounding_and_silent() {
        assert_eq!(describe_tone(ToneState::Silent), "Silent");
        assert_eq!(
            describe_tone(ToneState::Sounding {
                note: 69,
                frequency: 440.0
            }),
            "A4 (440.0 Hz)"
        );
    }
}
