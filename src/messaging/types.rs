use crate::core::oscillator::RenderFault;

/// Events raised on the audio side and consumed by the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The device reported an error on the stream
    StreamError(String),
    /// A block was replaced with silence
    RenderFault(RenderFault),
}
