use crossbeam_channel::Sender;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::config::SynthSettings;
use crate::core::audio::{AudioError, CpalOutput, OutputStream};
use crate::core::oscillator::{FrequencyTable, SineOscillator, ToneState};
use crate::messaging::EngineEvent;

/// Lifecycle of a [`ToneEngine`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Closed,
}

/// Main tone engine: one sine voice driven by the UI and pulled by the audio device
pub struct ToneEngine {
    oscillator: Arc<SineOscillator>,
    output: Box<dyn OutputStream>,
    state: EngineState,
}

impl ToneEngine {
    /// Build the frequency table and open the output device described by `settings`.
    ///
    /// Fails with [`AudioError::DeviceUnavailable`] or [`AudioError::StreamBuild`]
    /// when there is no device to play on.
    pub fn open(settings: &SynthSettings, events: Sender<EngineEvent>) -> Result<Self, AudioError> {
        let table = Arc::new(FrequencyTable::new());
        let oscillator = Arc::new(SineOscillator::new(
            table,
            settings.sample_rate,
            settings.amplitude,
        ));
        let output = CpalOutput::open(settings, Arc::clone(&oscillator), events)?;
        Ok(Self::with_output(oscillator, Box::new(output)))
    }

    /// Wrap an already opened output that pulls from `oscillator`.
    pub fn with_output(oscillator: Arc<SineOscillator>, output: Box<dyn OutputStream>) -> Self {
        if output.sample_rate() != oscillator.sample_rate() {
            warn!(
                "Output runs at {} Hz but the oscillator renders at {} Hz",
                output.sample_rate(),
                oscillator.sample_rate()
            );
        }
        Self {
            oscillator,
            output,
            state: EngineState::Idle,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn oscillator(&self) -> &Arc<SineOscillator> {
        &self.oscillator
    }

    pub fn tone(&self) -> ToneState {
        self.oscillator.state()
    }

    /// A `Send + Sync` handle for issuing note-on/note-off from other threads.
    pub fn controller(&self) -> ToneController {
        ToneController {
            oscillator: Arc::clone(&self.oscillator),
        }
    }

    /// Sound `note`. Notes outside 0..=127 are ignored.
    pub fn note_on(&self, note: i32) {
        note_on(&self.oscillator, note);
    }

    pub fn note_off(&self) {
        note_off(&self.oscillator);
    }

    /// Render the next block directly, bypassing the device.
    pub fn render(&self, frame_count: usize) -> Vec<f32> {
        if self.state == EngineState::Closed {
            warn!("render after close returns silence");
            return vec![0.0; frame_count];
        }
        self.oscillator.render(frame_count)
    }

    /// Start streaming. Calling it again while running does nothing.
    pub fn start(&mut self) -> Result<(), AudioError> {
        match self.state {
            EngineState::Running => Ok(()),
            EngineState::Closed => Err(AudioError::Closed),
            EngineState::Idle => {
                self.output.start()?;
                self.state = EngineState::Running;
                info!("Audio stream started at {} Hz", self.output.sample_rate());
                Ok(())
            }
        }
    }

    /// Stop streaming and release the device. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), AudioError> {
        if self.state == EngineState::Closed {
            return Ok(());
        }
        // Terminal even if the driver reports an error while stopping.
        self.state = EngineState::Closed;
        self.oscillator.mark_closed();
        self.output.close()?;
        info!("Audio stream closed");
        Ok(())
    }
}

/// Cloneable control side of a [`ToneEngine`].
///
/// Shares the engine's closed flag, so calls after `close()` are ignored from any thread.
#[derive(Clone)]
pub struct ToneController {
    oscillator: Arc<SineOscillator>,
}

impl ToneController {
    pub fn note_on(&self, note: i32) {
        note_on(&self.oscillator, note);
    }

    pub fn note_off(&self) {
        note_off(&self.oscillator);
    }

    pub fn tone(&self) -> ToneState {
        self.oscillator.state()
    }
}

fn note_on(oscillator: &SineOscillator, note: i32) {
    if oscillator.is_closed() {
        warn!("note_on({}) after close ignored", note);
        return;
    }
    match oscillator.note_on(note) {
        Ok(()) => debug!("note on {}", note),
        Err(err) => debug!("ignoring note on: {}", err),
    }
}

fn note_off(oscillator: &SineOscillator) {
    if oscillator.is_closed() {
        warn!("note_off after close ignored");
        return;
    }
    oscillator.note_off();
    debug!("note off");
}

impl Drop for ToneEngine {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("Failed to close audio output: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oscillator::DEFAULT_AMPLITUDE;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        starts: Cell<usize>,
        closes: Cell<usize>,
    }

    struct RecordingOutput {
        calls: Rc<Calls>,
        fail_close: bool,
    }

    impl OutputStream for RecordingOutput {
        fn sample_rate(&self) -> u32 {
            44100
        }

        fn start(&mut self) -> Result<(), AudioError> {
            self.calls.starts.set(self.calls.starts.get() + 1);
            Ok(())
        }

        fn close(&mut self) -> Result<(), AudioError> {
            self.calls.closes.set(self.calls.closes.get() + 1);
            if self.fail_close {
                Err(AudioError::Playback("device vanished".into()))
            } else {
                Ok(())
            }
        }
    }

    fn recording_engine(fail_close: bool) -> (ToneEngine, Rc<Calls>) {
        let calls = Rc::new(Calls::default());
        let oscillator = Arc::new(SineOscillator::new(
            Arc::new(FrequencyTable::new()),
            44100,
            DEFAULT_AMPLITUDE,
        ));
        let output = RecordingOutput {
            calls: Rc::clone(&calls),
            fail_close,
        };
        (ToneEngine::with_output(oscillator, Box::new(output)), calls)
    }

    #[test]
    fn lifecycle_runs_idle_running_closed() {
        let (mut engine, calls) = recording_engine(false);
        assert_eq!(engine.state(), EngineState::Idle);

        engine.start().unwrap();
        assert_eq!(engine.state(), EngineState::Running);

        engine.close().unwrap();
        assert_eq!(engine.state(), EngineState::Closed);
        assert_eq!(calls.starts.get(), 1);
        assert_eq!(calls.closes.get(), 1);
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let (mut engine, calls) = recording_engine(false);
        engine.start().unwrap();
        engine.start().unwrap();
        assert_eq!(calls.starts.get(), 1);
    }

    #[test]
    fn close_is_idempotent_and_terminal() {
        let (mut engine, calls) = recording_engine(false);
        engine.start().unwrap();
        engine.close().unwrap();
        engine.close().unwrap();
        assert_eq!(calls.closes.get(), 1);
        assert_eq!(engine.start(), Err(AudioError::Closed));
        assert_eq!(engine.state(), EngineState::Closed);
    }

    #[test]
    fn dropping_closes_exactly_once() {
        let (mut engine, calls) = recording_engine(false);
        engine.start().unwrap();
        engine.close().unwrap();
        drop(engine);
        assert_eq!(calls.closes.get(), 1);

        let (engine, calls) = recording_engine(false);
        drop(engine);
        assert_eq!(calls.closes.get(), 1);
    }

    #[test]
    fn failed_close_still_ends_the_engine() {
        let (mut engine, calls) = recording_engine(true);
        engine.start().unwrap();
        assert!(engine.close().is_err());
        assert_eq!(engine.state(), EngineState::Closed);
        engine.close().unwrap();
        drop(engine);
        assert_eq!(calls.closes.get(), 1);
    }

    #[test]
    fn control_calls_reach_the_oscillator() {
        let (mut engine, _calls) = recording_engine(false);
        engine.start().unwrap();

        engine.note_on(69);
        assert_eq!(
            engine.tone(),
            ToneState::Sounding {
                note: 69,
                frequency: 440.0
            }
        );
        engine.note_on(200);
        assert_eq!(engine.oscillator().frequency(), 440.0);

        engine.note_off();
        assert_eq!(engine.tone(), ToneState::Silent);
        assert!(engine.render(64).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn calls_after_close_are_ignored() {
        let (mut engine, _calls) = recording_engine(false);
        engine.start().unwrap();
        engine.note_on(60);
        engine.render(128);
        engine.close().unwrap();

        engine.note_on(72);
        engine.note_off();
        assert!(matches!(engine.tone(), ToneState::Sounding { note: 60, .. }));
        assert_eq!(engine.oscillator().phase(), 128);
        assert!(engine.render(256).iter().all(|&s| s == 0.0));
        assert_eq!(engine.oscillator().phase(), 128);
    }

    #[test]
    fn controller_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ToneController>();

        let (mut engine, _calls) = recording_engine(false);
        engine.start().unwrap();
        let controller = engine.controller();

        std::thread::spawn(move || controller.note_on(69))
            .join()
            .unwrap();
        assert_eq!(
            engine.tone(),
            ToneState::Sounding {
                note: 69,
                frequency: 440.0
            }
        );
    }

    #[test]
    fn controller_calls_after_close_are_ignored() {
        let (mut engine, _calls) = recording_engine(false);
        engine.start().unwrap();
        let controller = engine.controller();
        controller.note_on(60);
        engine.close().unwrap();
        assert!(engine.oscillator().is_closed());

        let tone = std::thread::spawn(move || {
            controller.note_on(72);
            controller.note_off();
            controller.tone()
        })
        .join()
        .unwrap();
        assert!(matches!(tone, ToneState::Sounding { note: 60, .. }));
    }
}
