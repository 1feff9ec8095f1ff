//! Bit-depth reduction by uniform re-leveling.

use ndarray::{Array1, ArrayView1};

/// Requantize samples onto a `2^bits - 1` level grid.
///
/// `bits >= 16` is the identity; below that, each clamped sample is mapped
/// to [0, 1], rounded to the nearest grid level, and mapped back.
pub fn quantize(x: ArrayView1<f32>, bits: u32) -> Array1<f32> {
    if bits >= 16 {
        return x.to_owned();
    }
    let levels = ((1u32 << bits) - 1) as f32;
    x.mapv(|s| {
        let s = s.clamp(-1.0, 1.0);
        let y = ((s * 0.5 + 0.5) * levels).round() / levels;
        ((y - 0.5) * 2.0).clamp(-1.0, 1.0)
    })
}
