//! Command-line surface of the channel tool and the typed job built from it.

use clap::Parser;
use std::path::PathBuf;

use crate::channel::Preset;
use crate::error::Result;
use crate::noise::NoiseSpec;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "chanstress",
    about = "Channel stress test: codec-like compression + noise damage",
    version
)]
pub struct Args {
    /// Input WAV file
    pub in_wav: PathBuf,

    /// Output WAV file (mono 16-bit PCM at the input's rate)
    pub out_wav: PathBuf,

    #[arg(long, default_value = "voip", help = "Compression preset: none|voip|pstn|lowbit")]
    pub preset: String,

    #[arg(long, default_value = "mix", help = "Noise type: awgn|pink|hum|clicks|mix")]
    pub noise: String,

    #[arg(long, default_value = "18.0", help = "Target SNR in dB")]
    pub snr: f64,

    #[arg(long, default_value = "123", help = "Random seed")]
    pub seed: u64,

    #[arg(short, long, help = "Enable verbose output mode")]
    pub verbose: bool,
}

/// A validated channel invocation: selector strings resolved to closed
/// variants before any file is touched.
#[derive(Debug, Clone)]
pub struct ChannelJob {
    pub in_wav: PathBuf,
    pub out_wav: PathBuf,
    pub preset: Preset,
    pub noise: NoiseSpec,
    pub snr_db: f64,
    pub seed: u64,
}

impl ChannelJob {
    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Self {
            in_wav: args.in_wav.clone(),
            out_wav: args.out_wav.clone(),
            preset: Preset::from_name(&args.preset)?,
            noise: NoiseSpec::from_name(&args.noise)?,
            snr_db: args.snr,
            seed: args.seed,
        })
    }
}
