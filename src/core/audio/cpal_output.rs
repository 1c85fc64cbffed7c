use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, BuildStreamError, Device, SampleRate, Stream, StreamConfig};
use crossbeam_channel::Sender;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{AudioError, OutputStream};
use crate::config::SynthSettings;
use crate::core::oscillator::SineOscillator;
use crate::messaging::EngineEvent;

/// cpal output stream that renders mono f32 blocks from a shared oscillator.
pub struct CpalOutput {
    stream: Option<Stream>,
    config: StreamConfig,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the configured (or default) output device and build a paused stream.
    pub fn open(
        settings: &SynthSettings,
        oscillator: Arc<SineOscillator>,
        events: Sender<EngineEvent>,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        info!("Using audio host: {}", host.id().name());

        let device = select_output_device(&host, settings.output_device.as_deref())?;
        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "<unnamed>".to_string())
        );

        let mut config = StreamConfig {
            channels: settings.channels.max(1),
            sample_rate: SampleRate(settings.sample_rate),
            buffer_size: BufferSize::Fixed(settings.block_size),
        };
        let running = Arc::new(AtomicBool::new(false));
        let block_size = settings.block_size as usize;

        let stream = match build_stream(
            &device,
            &config,
            block_size,
            Arc::clone(&oscillator),
            events.clone(),
            Arc::clone(&running),
        ) {
            Ok(stream) => stream,
            Err(err) => {
                warn!(
                    "Fixed buffer of {} frames rejected ({}), using the device default",
                    settings.block_size, err
                );
                config.buffer_size = BufferSize::Default;
                build_stream(
                    &device,
                    &config,
                    block_size,
                    oscillator,
                    events,
                    Arc::clone(&running),
                )
                .map_err(|e| AudioError::StreamBuild(e.to_string()))?
            }
        };

        // Some hosts start streams as soon as they are built.
        if let Err(err) = stream.pause() {
            debug!("Could not pause freshly built stream: {}", err);
        }

        info!("Stream config: {:?}", config);
        Ok(Self {
            stream: Some(stream),
            config,
            running,
        })
    }
}

impl OutputStream for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self) -> Result<(), AudioError> {
        let stream = self.stream.as_ref().ok_or(AudioError::Closed)?;
        self.running.store(true, Ordering::Release);
        stream.play().map_err(|e| {
            self.running.store(false, Ordering::Release);
            AudioError::Playback(e.to_string())
        })
    }

    fn close(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Release);
        if let Some(stream) = self.stream.take() {
            let paused = stream.pause();
            // Dropping the stream tears down the callback before we return.
            drop(stream);
            paused.map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}

fn select_output_device(host: &cpal::Host, preferred: Option<&str>) -> Result<Device, AudioError> {
    if let Some(name) = preferred {
        let devices = host
            .output_devices()
            .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;
        for device in devices {
            if device.name().map(|n| n == name).unwrap_or(false) {
                return Ok(device);
            }
        }
        warn!("Output device {:?} not found, falling back to the default device", name);
    }

    host.default_output_device()
        .ok_or_else(|| AudioError::DeviceUnavailable("no output device available".to_string()))
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    block_size: usize,
    oscillator: Arc<SineOscillator>,
    events: Sender<EngineEvent>,
    running: Arc<AtomicBool>,
) -> Result<Stream, BuildStreamError> {
    let channels = config.channels as usize;
    let error_events = events.clone();
    let mut scratch = vec![0.0f32; block_size.max(1)];

    device.build_output_stream(
        config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            fill_output(data, channels, &mut scratch, &oscillator, &running, &events);
        },
        move |err| {
            error!("an error occurred on the audio stream: {}", err);
            let _ = error_events.try_send(EngineEvent::StreamError(err.to_string()));
        },
        None,
    )
}

/// Body of the device callback: fill interleaved `data` from the oscillator.
///
/// Renders at most `scratch.len()` frames at a time so a callback larger than the
/// requested block never allocates; the phase carries across chunks.
fn fill_output(
    data: &mut [f32],
    channels: usize,
    scratch: &mut [f32],
    oscillator: &SineOscillator,
    running: &AtomicBool,
    events: &Sender<EngineEvent>,
) {
    if !running.load(Ordering::Acquire) || channels == 0 || scratch.is_empty() {
        data.fill(0.0);
        return;
    }

    for chunk in data.chunks_mut(scratch.len() * channels) {
        let frames = chunk.len().div_ceil(channels);
        let block = &mut scratch[..frames];
        if let Err(fault) = oscillator.render_into(block) {
            let _ = events.try_send(EngineEvent::RenderFault(fault));
        }

        for (frame, &value) in chunk.chunks_mut(channels).zip(block.iter()) {
            frame.fill(value);
        }
    }
}
