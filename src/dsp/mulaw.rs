//! G.711-style mu-law companding round trip.
//!
//! Approximates 8-bit telephone-codec artifacts: each sample is scaled to
//! 16-bit PCM, companded into one inverted byte, and expanded back.

use ndarray::{Array1, ArrayView1};

const BIAS: i32 = 0x84;
const CLIP: i32 = 32635;

/// Compand one sample into an 8-bit mu-law byte.
pub fn linear_to_mulaw(x: f32) -> u8 {
    let pcm = (x.clamp(-1.0, 1.0) * 32767.0).round() as i32;
    let sign: i32 = if pcm < 0 { 1 } else { 0 };
    let mut mag = if sign != 0 { -pcm } else { pcm };
    mag = mag.min(CLIP) + BIAS;

    // Exponent is the position of the top set bit, scanned down from bit 14.
    let mut exp = 7;
    let mut mask = 0x4000;
    while exp > 0 && (mag & mask) == 0 {
        exp -= 1;
        mask >>= 1;
    }

    let mant = (mag >> (exp + 3)) & 0x0F;
    (!((sign << 7) | (exp << 4) | mant) & 0xFF) as u8
}

/// Expand one mu-law byte back to a float sample.
pub fn mulaw_to_linear(u: u8) -> f32 {
    let u = (!u) as i32 & 0xFF;
    let sign = (u & 0x80) != 0;
    let exp = (u >> 4) & 0x07;
    let mant = u & 0x0F;
    let mag = ((mant << 3) + BIAS) << exp;
    let pcm = if sign { -(mag - BIAS) } else { mag - BIAS };
    pcm as f32 / 32767.0
}

/// Run every sample through the encode/decode round trip.
pub fn mulaw_roundtrip(x: ArrayView1<f32>) -> Array1<f32> {
    x.mapv(|s| mulaw_to_linear(linear_to_mulaw(s)))
}
