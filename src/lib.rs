//! ChanStress - Channel Damage Simulator for Audio Steganography
//!
//! Applies codec-like compression presets and additive noise models to
//! encoded audio, so a sender/receiver pair can be stress-tested against
//! realistic transmission damage.

pub mod audio;
pub mod channel;
pub mod config;
pub mod dsp;
pub mod error;
pub mod harness;
pub mod noise;

pub use channel::{ChannelSummary, Preset};
pub use config::{Args, ChannelJob};
pub use error::{ChanStressError, Result};
pub use noise::NoiseSpec;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

pub fn init_logging(verbose: bool) {
    unsafe {
        std::env::set_var("RUST_LOG", if verbose { "debug" } else { "info" });
    }
    env_logger::Builder::from_env("RUST_LOG")
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .ok();
}
