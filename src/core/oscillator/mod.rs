//! Monophonic sine oscillator shared between the UI thread and the audio callback.

pub mod frequency;

pub use self::frequency::{midi_note_to_freq, FrequencyTable, NoteError, NOTE_COUNT};

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Output level of a full-scale sine, leaving headroom below clipping.
pub const DEFAULT_AMPLITUDE: f32 = 0.3;

// Frequency and phase are only ever read and written together.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Phasor {
    note: Option<u8>,
    frequency: f64,
    phase: u64,
}

impl Phasor {
    const SILENT: Phasor = Phasor {
        note: None,
        frequency: 0.0,
        phase: 0,
    };
}

/// What the oscillator is currently producing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneState {
    Silent,
    Sounding { note: u8, frequency: f64 },
}

/// A render block that could not be synthesised and was replaced by silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFault {
    pub frames: usize,
}

impl std::fmt::Display for RenderFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "render fault, {} frames replaced with silence", self.frames)
    }
}

impl std::error::Error for RenderFault {}

pub struct SineOscillator {
    table: Arc<FrequencyTable>,
    sample_rate: u32,
    amplitude: f64,
    phasor: Mutex<Phasor>,
    render_faults: AtomicU64,
    closed: AtomicBool,
}

impl SineOscillator {
    pub fn new(table: Arc<FrequencyTable>, sample_rate: u32, amplitude: f32) -> Self {
        Self {
            table,
            sample_rate,
            amplitude: amplitude as f64,
            phasor: Mutex::new(Phasor::SILENT),
            render_faults: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude as f32
    }

    pub fn frequency_table(&self) -> &FrequencyTable {
        &self.table
    }

    /// Start sounding `note` from the beginning of a fresh cycle.
    ///
    /// The phase restarts at zero on every note-on, so retriggering while another
    /// note is still sounding jumps straight to the new waveform.
    pub fn note_on(&self, note: i32) -> Result<(), NoteError> {
        let frequency = self.table.frequency_of(note)?;
        *self.lock() = Phasor {
            note: Some(note as u8),
            frequency,
            phase: 0,
        };
        Ok(())
    }

    /// Silence the oscillator. The phase is kept.
    pub fn note_off(&self) {
        let mut phasor = self.lock();
        phasor.note = None;
        phasor.frequency = 0.0;
    }

    pub fn state(&self) -> ToneState {
        let phasor = *self.lock();
        match phasor.note {
            Some(note) if phasor.frequency > 0.0 => ToneState::Sounding {
                note,
                frequency: phasor.frequency,
            },
            _ => ToneState::Silent,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.lock().frequency
    }

    /// Samples rendered since the last note-on.
    pub fn phase(&self) -> u64 {
        self.lock().phase
    }

    /// Set once the output driving this oscillator has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Blocks replaced with silence since construction.
    pub fn render_faults(&self) -> u64 {
        self.render_faults.load(Ordering::Relaxed)
    }

    /// Fill `out` with the next block of mono samples.
    ///
    /// Runs on the audio callback: no allocation, one short lock, never panics.
    /// On a fault the block is left silent and the fault is returned for reporting.
    pub fn render_into(&self, out: &mut [f32]) -> Result<(), RenderFault> {
        let frames = out.len();
        let Phasor {
            frequency, phase, ..
        } = {
            let mut phasor = self.lock();
            let snapshot = *phasor;
            phasor.phase = phasor.phase.wrapping_add(frames as u64);
            snapshot
        };

        if frequency <= 0.0 {
            out.fill(0.0);
            return Ok(());
        }

        let sample_rate = self.sample_rate as f64;
        let mut finite = true;
        for (i, sample) in out.iter_mut().enumerate() {
            let position = phase.wrapping_add(i as u64) as f64;
            // Fractional cycle keeps the sine argument inside one period.
            let cycle = (frequency * position / sample_rate).fract();
            let value = (self.amplitude * (TAU * cycle).sin()) as f32;
            finite &= value.is_finite();
            *sample = value;
        }

        if finite {
            Ok(())
        } else {
            out.fill(0.0);
            self.render_faults.fetch_add(1, Ordering::Relaxed);
            Err(RenderFault { frames })
        }
    }

    /// Render `frame_count` samples into a new buffer.
    pub fn render(&self, frame_count: usize) -> Vec<f32> {
        let mut block = vec![0.0; frame_count];
        // Faults are already counted and the block is silent.
        let _ = self.render_into(&mut block);
        block
    }

    fn lock(&self) -> MutexGuard<'_, Phasor> {
        // The phasor is plain data written as a whole, so a poisoned lock still holds a valid value.
        self.phasor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
