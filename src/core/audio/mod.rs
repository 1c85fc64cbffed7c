//! Audio output seam between the engine and the platform driver.

mod cpal_output;

pub use self::cpal_output::CpalOutput;

/// Error type for audio device operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No usable output device
    DeviceUnavailable(String),
    /// The device refused the stream configuration
    StreamBuild(String),
    /// Starting or stopping the stream failed
    Playback(String),
    /// The output has already been closed
    Closed,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::DeviceUnavailable(msg) => write!(f, "Output device unavailable: {}", msg),
            AudioError::StreamBuild(msg) => write!(f, "Stream build error: {}", msg),
            AudioError::Playback(msg) => write!(f, "Playback error: {}", msg),
            AudioError::Closed => write!(f, "Audio output is closed"),
        }
    }
}

impl std::error::Error for AudioError {}

/// A driver-owned stream that periodically pulls blocks from the oscillator.
pub trait OutputStream {
    /// Sample rate the stream was opened with.
    fn sample_rate(&self) -> u32;

    /// Begin invoking the render callback.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop the stream and release the device. No render call may happen after this returns.
    fn close(&mut self) -> Result<(), AudioError>;
}
