//! StressRun - full encrypt -> channel damage -> decrypt matrix
//!
//! Runs the external sender once, damages the encoded signal through every
//! case of the matrix, feeds each damaged WAV to the external receiver,
//! and prints a pass/fail report against the original plaintext.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;

use chanstress::harness::runner::render_report;
use chanstress::harness::{StressRunner, default_cases, load_cases};
use chanstress::init_logging;

#[derive(Debug, Parser)]
#[command(
    name = "stressrun",
    about = "Encrypt -> channel stress (noise + compression) -> decrypt, save WAVs, compare with the plaintext",
    version
)]
struct Args {
    #[arg(long, default_value = "sender", help = "Sender executable path")]
    sender: PathBuf,

    #[arg(long, default_value = "receiver", help = "Receiver executable path")]
    receiver: PathBuf,

    #[arg(long, default_value = "message.txt", help = "Plaintext file")]
    text: PathBuf,

    #[arg(long, help = "Optional cover WAV passed to the sender")]
    cover: Option<PathBuf>,

    #[arg(long, default_value = ".", help = "Directory the sender/receiver run in")]
    workdir: PathBuf,

    #[arg(long, default_value = "runs", help = "Output folder root")]
    outdir: PathBuf,

    #[arg(long, default_value = "300", help = "Timeout seconds per external command")]
    timeout: u64,

    #[arg(long, help = "TOML file overriding the built-in case matrix")]
    cases: Option<PathBuf>,

    #[arg(long, help = "Parallel case workers (default: logical CPUs)")]
    jobs: Option<usize>,

    #[arg(short, long, help = "Enable verbose output mode")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let plaintext = std::fs::read_to_string(&args.text)
        .with_context(|| format!("reading plaintext {}", args.text.display()))?
        .trim()
        .to_string();
    if plaintext.is_empty() {
        bail!("plaintext file {} is empty", args.text.display());
    }

    if let Some(cover) = &args.cover {
        if !cover.exists() {
            bail!("cover wav not found: {}", cover.display());
        }
    }

    let cases = match &args.cases {
        Some(path) => load_cases(path)
            .with_context(|| format!("loading case matrix {}", path.display()))?,
        None => default_cases(),
    };

    let runner = StressRunner {
        sender: args.sender,
        receiver: args.receiver,
        plaintext,
        cover: args.cover,
        workdir: args.workdir,
        outdir: args.outdir,
        timeout: Duration::from_secs(args.timeout),
        jobs: args.jobs.unwrap_or_else(num_cpus::get),
    };

    let outcomes = runner.run(&cases)?;
    println!("{}", render_report(&outcomes));

    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    println!(
        "{} of {} cases survived the channel",
        outcomes.len() - failed,
        outcomes.len()
    );
    Ok(())
}
