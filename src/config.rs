use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::core::oscillator::DEFAULT_AMPLITUDE;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_BLOCK_SIZE: u32 = 1024;

/// User-editable settings, stored as JSON in the platform config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthSettings {
    pub sample_rate: u32,
    pub block_size: u32,
    pub channels: u16,
    pub amplitude: f32,
    pub output_device: Option<String>,
    /// Lowest key of the on-screen keyboard
    pub base_note: u8,
    pub octaves: u8,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            channels: 1,
            amplitude: DEFAULT_AMPLITUDE,
            output_device: None,
            base_note: 60,
            octaves: 2,
        }
    }
}

impl SynthSettings {
    pub fn settings_dir() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        path.push("minisynth");
        Ok(path)
    }

    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::settings_dir()?.join("settings.json"))
    }

    /// Load the settings file, writing the defaults the first time so they can be edited.
    pub fn load_or_create() -> Result<Self> {
        let path = Self::settings_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let settings = Self::default();
            settings.save_to(&path)?;
            log::info!("Wrote default settings to {}", path.display());
            Ok(settings)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open settings file {}", path.display()))?;
        let settings: SynthSettings = serde_json::from_reader(file)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        Ok(settings.sanitized())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Keep the keyboard inside the MIDI range, the stream parameters non-zero and
    /// the amplitude at or below the headroom level.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.sample_rate == 0 {
            self.sample_rate = defaults.sample_rate;
        }
        if self.block_size == 0 {
            self.block_size = defaults.block_size;
        }
        self.channels = self.channels.max(1);
        // Peaks stay within the ±DEFAULT_AMPLITUDE headroom bound.
        self.amplitude = self.amplitude.clamp(0.0, DEFAULT_AMPLITUDE);
        self.base_note = self.base_note.min(127);
        let max_octaves = ((127 - self.base_note as u32 + 1) / 12).max(1);
        self.octaves = (self.octaves as u32).clamp(1, max_octaves) as u8;
        self
    }
}
