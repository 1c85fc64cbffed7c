/// Number of addressable MIDI notes.
pub const NOTE_COUNT: usize = 128;

/// A4, the tuning reference.
pub const REFERENCE_NOTE: i32 = 69;
pub const REFERENCE_PITCH: f64 = 440.0;

/// Error returned when a note number falls outside the MIDI range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteError {
    OutOfRange(i32),
}

impl std::fmt::Display for NoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteError::OutOfRange(note) => {
                write!(f, "note {} is outside the MIDI range 0..=127", note)
            }
        }
    }
}

impl std::error::Error for NoteError {}

/// Equal-tempered frequencies for every MIDI note, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    frequencies: [f64; NOTE_COUNT],
}

impl FrequencyTable {
    pub fn new() -> Self {
        let mut frequencies = [0.0; NOTE_COUNT];
        for (note, frequency) in frequencies.iter_mut().enumerate() {
            *frequency = midi_note_to_freq(note as i32);
        }
        Self { frequencies }
    }

    /// Look up the fundamental frequency of `note` in hertz.
    pub fn frequency_of(&self, note: i32) -> Result<f64, NoteError> {
        usize::try_from(note)
            .ok()
            .and_then(|index| self.frequencies.get(index))
            .copied()
            .ok_or(NoteError::OutOfRange(note))
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.frequencies.iter().copied()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert MIDI note number to frequency in Hz
pub fn midi_note_to_freq(note: i32) -> f64 {
    REFERENCE_PITCH * 2.0f64.powf((note - REFERENCE_NOTE) as f64 / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_pitch_is_exact() {
        let table = FrequencyTable::new();
        assert_eq!(table.frequency_of(69), Ok(440.0));
    }

    #[test]
    fn octaves_double() {
        let table = FrequencyTable::new();
        for note in 0..(NOTE_COUNT as i32 - 12) {
            let low = table.frequency_of(note).unwrap();
            let high = table.frequency_of(note + 12).unwrap();
            assert!((high - 2.0 * low).abs() <= 1e-9 * high, "note {}", note);
        }
    }

    #[test]
    fn strictly_increasing() {
        let table = FrequencyTable::new();
        assert_eq!(table.len(), 128);
        let frequencies: Vec<f64> = table.iter().collect();
        assert!(frequencies.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn middle_c() {
        let table = FrequencyTable::new();
        let c4 = table.frequency_of(60).unwrap();
        assert!((c4 - 261.625_565_300_598_6).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_notes_are_rejected() {
        let table = FrequencyTable::new();
        assert_eq!(table.frequency_of(-1), Err(NoteError::OutOfRange(-1)));
        assert_eq!(table.frequency_of(128), Err(NoteError::OutOfRange(128)));
        assert!(table.frequency_of(127).is_ok());
        assert!(table.frequency_of(0).is_ok());
    }
}
