//! The damage matrix: one `Case` per (preset, noise, snr, seed) row.

use std::path::Path;

use serde::Deserialize;

use crate::channel::Preset;
use crate::error::{ChanStressError, Result};
use crate::noise::NoiseSpec;

/// One row of the stress matrix. Immutable once constructed; the slug
/// derives the output filename.
#[derive(Debug, Clone)]
pub struct Case {
    pub preset: Preset,
    pub noise: NoiseSpec,
    pub snr_db: f64,
    pub seed: u64,
}

impl Case {
    fn new(preset: Preset, noise: NoiseSpec, snr_db: f64, seed: u64) -> Self {
        Self { preset, noise, snr_db, seed }
    }

    /// Filename stem, e.g. `03_voip_mix_snr18_seed123`.
    pub fn slug(&self, index: usize) -> String {
        format!(
            "{:02}_{}_{}_snr{}_seed{}",
            index,
            self.preset.name(),
            self.noise.name(),
            fmt_snr(self.snr_db),
            self.seed
        )
    }
}

/// Trailing-zero-free SNR rendering: 18.0 -> "18", 22.5 -> "22.5".
fn fmt_snr(snr: f64) -> String {
    if snr.fract() == 0.0 {
        format!("{}", snr as i64)
    } else {
        format!("{}", snr)
    }
}

/// The built-in matrix: clean baselines, then each preset against the
/// noise models it is most likely to meet.
pub fn default_cases() -> Vec<Case> {
    let hum = NoiseSpec::Hum { freq_hz: 50.0, harmonics: 5 };
    let clicks = NoiseSpec::Clicks { rate_hz: 2.0, click_ms: 3.0 };
    vec![
        Case::new(Preset::None, NoiseSpec::Awgn, 40.0, 123),
        Case::new(Preset::None, NoiseSpec::Awgn, 25.0, 123),
        Case::new(Preset::Voip, NoiseSpec::Mix, 22.0, 123),
        Case::new(Preset::Voip, NoiseSpec::Mix, 18.0, 123),
        Case::new(Preset::Voip, NoiseSpec::Pink, 18.0, 123),
        Case::new(Preset::Pstn, NoiseSpec::Mix, 18.0, 123),
        Case::new(Preset::Pstn, hum, 20.0, 123),
        Case::new(Preset::Lowbit, NoiseSpec::Mix, 22.0, 123),
        Case::new(Preset::Lowbit, clicks, 25.0, 123),
    ]
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    cases: Vec<CaseRow>,
}

#[derive(Debug, Deserialize)]
struct CaseRow {
    preset: String,
    noise: String,
    snr: f64,
    seed: u64,
}

/// Load a replacement matrix from a TOML file of `[[cases]]` tables.
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<Case>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let file: CaseFile = toml::from_str(&content)
        .map_err(|e| ChanStressError::harness(format!("Failed to parse case file: {e}")))?;

    file.cases
        .iter()
        .map(|row| {
            Ok(Case::new(
                Preset::from_name(&row.preset)?,
                NoiseSpec::from_name(&row.noise)?,
                row.snr,
                row.seed,
            ))
        })
        .collect()
}
