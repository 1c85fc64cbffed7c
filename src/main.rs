use anyhow::{Context, Result};
use eframe::egui;
use log::{info, warn};

use minisynth::app::MiniSynthApp;
use minisynth::config::SynthSettings;
use minisynth::core::synth::ToneEngine;
use minisynth::messaging::EventBus;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting MiniSynth v{}", env!("CARGO_PKG_VERSION"));

    let settings = SynthSettings::load_or_create().unwrap_or_else(|e| {
        warn!("Using default settings: {:#}", e);
        SynthSettings::default()
    });

    // Without an output device there is nothing to play on; fail before opening a window.
    let events = EventBus::new();
    let mut engine =
        ToneEngine::open(&settings, events.sender()).context("Could not open audio output")?;
    engine.start().context("Could not start audio stream")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("MiniSynth v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size(MiniSynthApp::window_size(&settings))
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        "MiniSynth",
        options,
        Box::new(move |_cc| Ok(Box::new(MiniSynthApp::new(engine, events, &settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))
}
