//! Compression presets and the file-to-file channel pipeline.
//!
//! Each preset is a fixed composition of bandlimiting, an intermediate
//! sample rate, and one degrade step:
//! bandlimit -> downsample -> degrade -> upsample -> clamp.

use std::path::Path;

use log::{debug, info};
use ndarray::{Array1, ArrayView1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::audio::AudioBuffer;
use crate::dsp::{bandlimit, clamp_samples, mulaw_roundtrip, quantize, resample_linear};
use crate::error::{ChanStressError, Result};
use crate::noise::{NoiseSpec, apply_noise};

/// One codec-like degradation profile. Fixed compositions only; callers
/// pick a variant, never its internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    None,
    Voip,
    Pstn,
    Lowbit,
}

impl Preset {
    /// Resolve a CLI selector.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "voip" => Ok(Self::Voip),
            "pstn" => Ok(Self::Pstn),
            "lowbit" => Ok(Self::Lowbit),
            _ => Err(ChanStressError::UnknownPreset(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Voip => "voip",
            Self::Pstn => "pstn",
            Self::Lowbit => "lowbit",
        }
    }
}

enum Degrade {
    Quantize(u32),
    Mulaw,
}

fn run_preset(
    x: ArrayView1<f32>,
    fs: u32,
    lo: f64,
    hi: f64,
    mid_rate: u32,
    degrade: Degrade,
) -> Array1<f32> {
    let y = bandlimit(x, fs, lo, hi);
    let y = resample_linear(y.view(), fs, mid_rate);
    let y = match degrade {
        Degrade::Quantize(bits) => quantize(y.view(), bits),
        Degrade::Mulaw => mulaw_roundtrip(y.view()),
    };
    let y = resample_linear(y.view(), mid_rate, fs);
    clamp_samples(y)
}

/// Apply one compression preset at the buffer level.
pub fn apply_preset(x: ArrayView1<f32>, fs: u32, preset: Preset) -> Array1<f32> {
    match preset {
        Preset::None => x.to_owned(),
        // Mild codec: wide band, 16 kHz intermediate, 12-bit grid.
        Preset::Voip => run_preset(x, fs, 80.0, 7000.0, 16000, Degrade::Quantize(12)),
        // Phone line: 300-3400 Hz, 8 kHz, mu-law round trip.
        Preset::Pstn => run_preset(x, fs, 300.0, 3400.0, 8000, Degrade::Mulaw),
        // Harsh: 6 kHz band, 12 kHz intermediate, 8-bit grid.
        Preset::Lowbit => run_preset(x, fs, 120.0, 6000.0, 12000, Degrade::Quantize(8)),
    }
}

/// Result record for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct ChannelSummary {
    pub preset: Preset,
    pub noise: NoiseSpec,
    pub snr_db: f64,
    pub seed: u64,
    pub sample_rate: u32,
    pub samples: usize,
}

/// Damage a buffer in place of the full file pipeline: preset, then noise.
///
/// The RNG stream is built here from the seed so no caller can accidentally
/// share one across invocations.
pub fn damage_buffer(
    audio: &AudioBuffer,
    preset: Preset,
    noise: NoiseSpec,
    snr_db: f64,
    seed: u64,
) -> AudioBuffer {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let y = apply_preset(audio.samples.view(), audio.sample_rate, preset);
    let y = apply_noise(y.view(), audio.sample_rate, noise, snr_db, &mut rng);
    AudioBuffer::new(y, audio.sample_rate)
}

/// Full pipeline: load, downmix, damage, persist as mono 16-bit PCM at the
/// input's original rate.
pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
    in_wav: P,
    out_wav: Q,
    preset: Preset,
    noise: NoiseSpec,
    snr_db: f64,
    seed: u64,
) -> Result<ChannelSummary> {
    let audio = AudioBuffer::from_wav_file(in_wav.as_ref())?;
    debug!(
        "loaded {}: {} samples at {} Hz",
        in_wav.as_ref().display(),
        audio.len(),
        audio.sample_rate
    );

    let damaged = damage_buffer(&audio, preset, noise, snr_db, seed);
    damaged.write_wav_16bit(out_wav.as_ref())?;
    info!(
        "wrote {} (preset={}, noise={}, snr={} dB)",
        out_wav.as_ref().display(),
        preset.name(),
        noise.name(),
        snr_db
    );

    Ok(ChannelSummary {
        preset,
        noise,
        snr_db,
        seed,
        sample_rate: damaged.sample_rate,
        samples: damaged.len(),
    })
}
