use eframe::egui;
use log::{debug, error, warn};

use crate::config::SynthSettings;
use crate::core::synth::ToneEngine;
use crate::messaging::{EngineEvent, EventBus};
use crate::ui::components::{KeyEvent, Keyboard, WaveformPlot};
use crate::utils::{audio_visualizer, helpers};

/// Events handled per frame; the rest wait for the next repaint
const MAX_EVENTS_PER_FRAME: usize = 32;
const PREVIEW_POINTS: usize = 256;
const PREVIEW_HEIGHT: f32 = 120.0;
const HEADER_HEIGHT: f32 = 200.0;

// Main app state
pub struct MiniSynthApp {
    engine: ToneEngine,
    events: EventBus,
    keyboard: Keyboard,
    render_faults: u64,
    last_stream_error: Option<String>,
}

impl eframe::App for MiniSynthApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(format!("MiniSynth v{}", env!("CARGO_PKG_VERSION")));
                ui.label("🎹");
                ui.separator();
                ui.label(helpers::describe_tone(self.engine.tone()));
            });

            if self.render_faults > 0 || self.last_stream_error.is_some() {
                ui.horizontal(|ui| {
                    if self.render_faults > 0 {
                        ui.colored_label(
                            egui::Color32::YELLOW,
                            format!("Dropped blocks: {}", self.render_faults),
                        );
                    }
                    if let Some(err) = &self.last_stream_error {
                        ui.colored_label(egui::Color32::RED, format!("Stream error: {}", err));
                    }
                });
            }

            let amplitude = self.engine.oscillator().amplitude();
            let preview = audio_visualizer::generate_tone_preview(
                self.engine.tone(),
                amplitude,
                PREVIEW_POINTS,
            );
            WaveformPlot::new(preview)
                .height(PREVIEW_HEIGHT)
                .y_range(amplitude.max(f32::EPSILON))
                .show(ui, "tone_preview");

            ui.add_space(8.0);

            if let Some(event) = self.keyboard.show(ui) {
                self.apply_key_event(event);
            }
        });

        // Keep polling pointer and keyboard state while keys are held
        ctx.request_repaint();
    }
}

impl MiniSynthApp {
    pub fn new(engine: ToneEngine, events: EventBus, settings: &SynthSettings) -> Self {
        Self {
            engine,
            events,
            keyboard: Keyboard::new(settings.base_note, settings.octaves),
            render_faults: 0,
            last_stream_error: None,
        }
    }

    /// Window size that fits the header, preview and keyboard.
    pub fn window_size(settings: &SynthSettings) -> egui::Vec2 {
        let keyboard = Keyboard::new(settings.base_note, settings.octaves).size();
        egui::vec2(keyboard.x + 16.0, keyboard.y + HEADER_HEIGHT)
    }

    fn apply_key_event(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed(note) => {
                debug!("Key pressed: {}", helpers::note_name(note));
                self.engine.note_on(note as i32);
            }
            KeyEvent::Released(note) => {
                debug!("Key released: {}", helpers::note_name(note));
                self.engine.note_off();
            }
        }
    }

    fn process_events(&mut self) {
        for event in self.events.drain(MAX_EVENTS_PER_FRAME) {
            match event {
                EngineEvent::RenderFault(fault) => {
                    warn!("{}", fault);
                    self.render_faults += 1;
                }
                EngineEvent::StreamError(err) => {
                    self.last_stream_error = Some(err);
                }
            }
        }
    }
}

impl Drop for MiniSynthApp {
    fn drop(&mut self) {
        if let Err(err) = self.engine.close() {
            error!("Failed to close audio output: {}", err);
        }
    }
}
