//! Linear-interpolation sample-rate conversion.

use ndarray::{Array1, ArrayView1};

/// Resample `x` from `fs_in` to `fs_out` by linear interpolation.
///
/// Output length is `round(duration * fs_out)` with
/// `duration = n_in / fs_in`; both rates share one virtual time axis over
/// `[0, duration)`, so output sample `i` reads input position
/// `i * n_in / n_out`. Positions at or past the last input sample hold the
/// final input value.
pub fn resample_linear(x: ArrayView1<f32>, fs_in: u32, fs_out: u32) -> Array1<f32> {
    if fs_in == fs_out {
        return x.to_owned();
    }

    let n_in = x.len();
    if n_in == 0 {
        return Array1::zeros(0);
    }

    let dur = n_in as f64 / fs_in as f64;
    let n_out = (dur * fs_out as f64).round() as usize;
    if n_out <= 1 {
        // Degenerate output grid: a single sample, never an error.
        return Array1::from(vec![x[0]]);
    }

    let step = n_in as f64 / n_out as f64;
    let mut y = Array1::zeros(n_out);
    for i in 0..n_out {
        let pos = i as f64 * step;
        let idx = pos.floor() as usize;
        y[i] = if idx >= n_in - 1 {
            x[n_in - 1]
        } else {
            let frac = (pos - idx as f64) as f32;
            x[idx] + (x[idx + 1] - x[idx]) * frac
        };
    }
    y
}
