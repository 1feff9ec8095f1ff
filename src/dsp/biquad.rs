//! RBJ cookbook biquad filter and the telephony-style bandlimiter built
//! from a highpass/lowpass pair.

use ndarray::{Array1, ArrayView1};
use std::f64::consts::PI;

/// Butterworth-like quality factor used by every bandlimiting stage.
pub const DEFAULT_Q: f64 = 0.707;

/// Single second-order IIR section, direct-form II transposed.
///
/// Coefficients are fixed at construction; z1/z2 start at zero and persist
/// only across calls on the same instance.
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn new(b0: f64, b1: f64, b2: f64, a1: f64, a2: f64) -> Self {
        Self { b0, b1, b2, a1, a2, z1: 0.0, z2: 0.0 }
    }

    /// RBJ lowpass at cutoff `f0` Hz.
    pub fn lowpass(fs: f64, f0: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * f0 / fs;
        let alpha = w0.sin() / (2.0 * q);
        let c = w0.cos();

        let b0 = (1.0 - c) / 2.0;
        let b1 = 1.0 - c;
        let b2 = (1.0 - c) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * c;
        let a2 = 1.0 - alpha;
        Self::new(b0 / a0, b1 / a0, b2 / a0, a1 / a0, a2 / a0)
    }

    /// RBJ highpass at cutoff `f0` Hz.
    pub fn highpass(fs: f64, f0: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * f0 / fs;
        let alpha = w0.sin() / (2.0 * q);
        let c = w0.cos();

        let b0 = (1.0 + c) / 2.0;
        let b1 = -(1.0 + c);
        let b2 = (1.0 + c) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * c;
        let a2 = 1.0 - alpha;
        Self::new(b0 / a0, b1 / a0, b2 / a0, a1 / a0, a2 / a0)
    }

    /// Filter a buffer, carrying z1/z2 across consecutive calls.
    ///
    /// Output is not clamped; clamping happens at pipeline boundaries.
    pub fn process(&mut self, x: ArrayView1<f32>) -> Array1<f32> {
        let mut y = Array1::zeros(x.len());
        let (mut z1, mut z2) = (self.z1, self.z2);
        for (i, &s) in x.iter().enumerate() {
            let xi = s as f64;
            let yi = self.b0 * xi + z1;
            z1 = self.b1 * xi - self.a1 * yi + z2;
            z2 = self.b2 * xi - self.a2 * yi;
            y[i] = yi as f32;
        }
        self.z1 = z1;
        self.z2 = z2;
        y
    }
}

/// Emulate a narrowband channel: highpass at `lo` Hz, then lowpass at `hi` Hz.
///
/// Both sections are freshly constructed per call, so no state leaks
/// between buffers.
pub fn bandlimit(x: ArrayView1<f32>, fs: u32, lo: f64, hi: f64) -> Array1<f32> {
    let mut hp = Biquad::highpass(fs as f64, lo, DEFAULT_Q);
    let mut lp = Biquad::lowpass(fs as f64, hi, DEFAULT_Q);
    let y = hp.process(x);
    lp.process(y.view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::rms;

    fn tone(freq: f64, fs: f64, n: usize) -> Array1<f32> {
        Array1::from_iter((0..n).map(|i| {
            let t = i as f64 / fs;
            (2.0 * PI * freq * t).sin() as f32
        }))
    }

    #[test]
    fn test_lowpass_passes_low_attenuates_high() {
        let fs = 8000.0;
        let n = 8000;

        let mut lp = Biquad::lowpass(fs, 1000.0, DEFAULT_Q);
        let low_out = lp.process(tone(100.0, fs, n).view());

        let mut lp = Biquad::lowpass(fs, 1000.0, DEFAULT_Q);
        let high_out = lp.process(tone(3500.0, fs, n).view());

        assert!(rms(low_out.view()) > 0.6);
        assert!(rms(high_out.view()) < 0.1);
    }

    #[test]
    fn test_highpass_attenuates_low() {
        let fs = 8000.0;
        let n = 8000;

        let mut hp = Biquad::highpass(fs, 1000.0, DEFAULT_Q);
        let low_out = hp.process(tone(100.0, fs, n).view());

        let mut hp = Biquad::highpass(fs, 1000.0, DEFAULT_Q);
        let high_out = hp.process(tone(3500.0, fs, n).view());

        assert!(rms(low_out.view()) < 0.1);
        assert!(rms(high_out.view()) > 0.6);
    }

    #[test]
    fn test_state_persists_across_calls() {
        // Filtering one buffer must equal filtering it in two halves with
        // the same instance.
        let fs = 8000.0;
        let x = tone(440.0, fs, 1000);

        let mut whole = Biquad::lowpass(fs, 2000.0, DEFAULT_Q);
        let y_whole = whole.process(x.view());

        let mut split = Biquad::lowpass(fs, 2000.0, DEFAULT_Q);
        let y_a = split.process(x.slice(ndarray::s![..500]));
        let y_b = split.process(x.slice(ndarray::s![500..]));

        for i in 0..500 {
            assert!((y_whole[i] - y_a[i]).abs() < 1e-6);
            assert!((y_whole[500 + i] - y_b[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fresh_filter_starts_from_zero_state() {
        let fs = 8000.0;
        let x = tone(440.0, fs, 500);
        let mut f1 = Biquad::lowpass(fs, 2000.0, DEFAULT_Q);
        let mut f2 = Biquad::lowpass(fs, 2000.0, DEFAULT_Q);
        let _ = f1.process(x.view());
        let y1 = f2.process(x.view());
        let mut f3 = Biquad::lowpass(fs, 2000.0, DEFAULT_Q);
        let y3 = f3.process(x.view());
        assert_eq!(y1, y3);
    }

    #[test]
    fn test_bandlimit_attenuates_out_of_band() {
        let fs = 44100;
        let n = 44100;
        let in_band = bandlimit(tone(1000.0, fs as f64, n).view(), fs, 300.0, 3400.0);
        let below = bandlimit(tone(60.0, fs as f64, n).view(), fs, 300.0, 3400.0);
        let above = bandlimit(tone(9000.0, fs as f64, n).view(), fs, 300.0, 3400.0);

        let r_in = rms(in_band.view());
        assert!(r_in > 0.5);
        assert!(rms(below.view()) < r_in * 0.5);
        assert!(rms(above.view()) < r_in * 0.5);
    }
}
