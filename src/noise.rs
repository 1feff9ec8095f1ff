//! Seeded noise models: AWGN, pink, mains hum, impulsive clicks, and a
//! composite mix.
//!
//! Every generator takes the target SNR in dB and a caller-owned seeded
//! RNG, scales noise against the signal RMS, and returns a new clamped
//! buffer. SNR above [`NO_NOISE_SNR_DB`] is the "clean channel" sentinel
//! and returns the input unchanged.

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

use crate::dsp::{clamp_samples, rms};
use crate::error::{ChanStressError, Result};

/// SNRs above this are treated as "no noise".
pub const NO_NOISE_SNR_DB: f64 = 200.0;

const HUM_FREQ_HZ: f64 = 50.0;
const HUM_HARMONICS: usize = 5;
const CLICK_RATE_HZ: f64 = 2.0;
const CLICK_MS: f64 = 3.0;

// Quieter per-component SNR offsets inside the mix.
const MIX_AWGN_OFFSET_DB: f64 = 3.0;
const MIX_HUM_OFFSET_DB: f64 = 6.0;
const MIX_CLICKS_OFFSET_DB: f64 = 6.0;
const MIX_HUM_HARMONICS: usize = 3;
const MIX_CLICK_RATE_HZ: f64 = 1.0;
const MIX_CLICK_MS: f64 = 2.0;

/// One noise model with its fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseSpec {
    Awgn,
    Pink,
    Hum { freq_hz: f64, harmonics: usize },
    Clicks { rate_hz: f64, click_ms: f64 },
    Mix,
}

impl NoiseSpec {
    /// Resolve a CLI selector to a noise model with its default parameters.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "awgn" => Ok(Self::Awgn),
            "pink" => Ok(Self::Pink),
            "hum" => Ok(Self::Hum { freq_hz: HUM_FREQ_HZ, harmonics: HUM_HARMONICS }),
            "clicks" => Ok(Self::Clicks { rate_hz: CLICK_RATE_HZ, click_ms: CLICK_MS }),
            "mix" => Ok(Self::Mix),
            _ => Err(ChanStressError::UnknownNoise(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Awgn => "awgn",
            Self::Pink => "pink",
            Self::Hum { .. } => "hum",
            Self::Clicks { .. } => "clicks",
            Self::Mix => "mix",
        }
    }
}

/// Apply the selected noise model at `snr_db` against `x`.
pub fn apply_noise(
    x: ArrayView1<f32>,
    fs: u32,
    spec: NoiseSpec,
    snr_db: f64,
    rng: &mut ChaCha8Rng,
) -> Array1<f32> {
    match spec {
        NoiseSpec::Awgn => add_awgn(x, snr_db, rng),
        NoiseSpec::Pink => add_pink(x, snr_db, rng),
        NoiseSpec::Hum { freq_hz, harmonics } => add_hum(x, snr_db, fs, freq_hz, harmonics, rng),
        NoiseSpec::Clicks { rate_hz, click_ms } => {
            add_clicks(x, snr_db, fs, rate_hz, click_ms, rng)
        }
        NoiseSpec::Mix => {
            let y = add_awgn(x, snr_db + MIX_AWGN_OFFSET_DB, rng);
            let y = add_hum(
                y.view(),
                snr_db + MIX_HUM_OFFSET_DB,
                fs,
                HUM_FREQ_HZ,
                MIX_HUM_HARMONICS,
                rng,
            );
            let y = add_clicks(
                y.view(),
                snr_db + MIX_CLICKS_OFFSET_DB,
                fs,
                MIX_CLICK_RATE_HZ,
                MIX_CLICK_MS,
                rng,
            );
            clamp_samples(y)
        }
    }
}

fn noise_rms_for(x: ArrayView1<f32>, snr_db: f64) -> f32 {
    let snr_lin = 10.0f64.powf(snr_db / 20.0);
    (rms(x) as f64 / snr_lin) as f32
}

/// Box-Muller transform: one standard normal draw from the uniform RNG.
fn randn(rng: &mut ChaCha8Rng) -> f64 {
    loop {
        let u1: f64 = rng.r#gen();
        let u2: f64 = rng.r#gen();
        if u1 > 1e-30 {
            let r = (-2.0 * u1.ln()).sqrt();
            return r * (2.0 * PI * u2).cos();
        }
    }
}

/// Additive white Gaussian noise.
pub fn add_awgn(x: ArrayView1<f32>, snr_db: f64, rng: &mut ChaCha8Rng) -> Array1<f32> {
    if snr_db > NO_NOISE_SNR_DB {
        return x.to_owned();
    }
    let noise_rms = noise_rms_for(x, snr_db) as f64;
    let y = Array1::from_iter(x.iter().map(|&s| s + (randn(rng) * noise_rms) as f32));
    clamp_samples(y)
}

/// Low-biased noise: white Gaussian through a one-pole smoother.
pub fn add_pink(x: ArrayView1<f32>, snr_db: f64, rng: &mut ChaCha8Rng) -> Array1<f32> {
    if snr_db > NO_NOISE_SNR_DB {
        return x.to_owned();
    }
    let a = 0.98f64;
    let mut acc = 0.0f64;
    let mut pink = Array1::<f32>::zeros(x.len());
    for p in pink.iter_mut() {
        acc = a * acc + (1.0 - a) * randn(rng);
        *p = acc as f32;
    }
    let scale = noise_rms_for(x, snr_db) / rms(pink.view());
    let y = Array1::from_iter(x.iter().zip(pink.iter()).map(|(&s, &p)| s + p * scale));
    clamp_samples(y)
}

/// Mains-style interference: harmonics of `freq_hz` with 1/k amplitudes
/// and one shared random phase per call.
pub fn add_hum(
    x: ArrayView1<f32>,
    snr_db: f64,
    fs: u32,
    freq_hz: f64,
    harmonics: usize,
    rng: &mut ChaCha8Rng,
) -> Array1<f32> {
    if snr_db > NO_NOISE_SNR_DB {
        return x.to_owned();
    }
    let phase = rng.r#gen::<f64>() * 2.0 * PI;
    let mut hum = Array1::<f32>::zeros(x.len());
    for k in 1..=harmonics {
        let w = 2.0 * PI * freq_hz * k as f64 / fs as f64;
        let amp = 1.0 / k as f64;
        for (i, h) in hum.iter_mut().enumerate() {
            *h += (amp * (w * i as f64 + phase).sin()) as f32;
        }
    }
    let scale = noise_rms_for(x, snr_db) / rms(hum.view());
    let y = Array1::from_iter(x.iter().zip(hum.iter()).map(|(&s, &h)| s + h * scale));
    clamp_samples(y)
}

/// Impulsive interference: exponentially decaying pulses at random
/// positions and amplitudes. Overlapping pulses sum.
pub fn add_clicks(
    x: ArrayView1<f32>,
    snr_db: f64,
    fs: u32,
    rate_hz: f64,
    click_ms: f64,
    rng: &mut ChaCha8Rng,
) -> Array1<f32> {
    if snr_db > NO_NOISE_SNR_DB {
        return x.to_owned();
    }
    let n = x.len();
    let expected = (rate_hz * n as f64 / fs as f64) as usize;
    let pulse_len = ((fs as f64 * click_ms / 1000.0) as usize).max(1);

    let mut clicks = Array1::<f32>::zeros(n);
    for _ in 0..expected {
        let pos = rng.gen_range(0..(n.saturating_sub(pulse_len)).max(1));
        let amp = rng.gen_range(-1.0f64..1.0);
        for i in 0..pulse_len.min(n - pos) {
            // exp(-t) over t in [0, 6], endpoint included.
            let t = if pulse_len > 1 {
                6.0 * i as f64 / (pulse_len - 1) as f64
            } else {
                0.0
            };
            clicks[pos + i] += (amp * (-t).exp()) as f32;
        }
    }

    let click_rms = rms(clicks.view());
    if click_rms < 1e-9 {
        // All pulses landed at negligible energy; adding nothing beats
        // dividing by near-zero.
        log::warn!("click energy negligible, returning input unchanged");
        return x.to_owned();
    }

    let scale = noise_rms_for(x, snr_db) / click_rms;
    let y = Array1::from_iter(x.iter().zip(clicks.iter()).map(|(&s, &c)| s + c * scale));
    clamp_samples(y)
}
