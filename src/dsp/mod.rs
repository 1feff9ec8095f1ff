//! Signal processing leaves: filtering, resampling, bit-depth and
//! companding degradation, plus the small numeric helpers every stage
//! shares.

pub mod biquad;
pub mod mulaw;
pub mod quantize;
pub mod resample;

pub use biquad::{Biquad, bandlimit};
pub use mulaw::mulaw_roundtrip;
pub use quantize::quantize;
pub use resample::resample_linear;

use ndarray::{Array1, ArrayView1};

/// RMS with a small floor so silent buffers never divide by zero downstream.
pub fn rms(x: ArrayView1<f32>) -> f32 {
    if x.is_empty() {
        return 1e-12;
    }
    let sum_sq: f64 = x.iter().map(|&s| (s as f64) * (s as f64)).sum();
    ((sum_sq / x.len() as f64).sqrt() + 1e-12) as f32
}

/// Clamp every sample into [-1, 1].
pub fn clamp_samples(x: Array1<f32>) -> Array1<f32> {
    x.mapv_into(|s| s.clamp(-1.0, 1.0))
}
