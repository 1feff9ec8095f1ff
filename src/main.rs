//! ChanStress - Channel Damage CLI

use clap::Parser;
use std::process;

use chanstress::{Args, ChannelJob, Result, channel, init_logging};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    // Selector validation happens before any file is opened or written.
    let job = ChannelJob::from_args(args)?;

    let summary = channel::process_file(
        &job.in_wav,
        &job.out_wav,
        job.preset,
        job.noise,
        job.snr_db,
        job.seed,
    )?;

    println!(
        "OK: wrote {} (preset={}, noise={}, snr={} dB, fs={}, seed={})",
        job.out_wav.display(),
        summary.preset.name(),
        summary.noise.name(),
        summary.snr_db,
        summary.sample_rate,
        summary.seed
    );
    Ok(())
}
