//! Matrix execution: encode once, damage per case, decode, compare.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::audio::AudioBuffer;
use crate::channel::damage_buffer;
use crate::error::{ChanStressError, Result};
use crate::harness::cases::Case;
use crate::harness::similarity::{
    normalize_text, parse_receiver_output, similarity_quick, word_count,
};

/// Exit-status sentinel for cases where the engine (not the receiver)
/// failed, matching the reporting convention of the original harness.
const ENGINE_FAILED_RC: i32 = 999;

/// Captured output of one bounded external invocation.
#[derive(Debug)]
struct CmdOutput {
    status: i32,
    stdout: String,
    stderr: String,
    timed_out: bool,
}

/// Run a command with a wall-clock bound. Stdout/stderr are drained on
/// reader threads so a chatty child can never fill the pipe and stall.
fn run_cmd(program: &Path, args: &[String], cwd: &Path, timeout: Duration) -> Result<CmdOutput> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            ChanStressError::harness(format!("Failed to run {}: {e}", program.display()))
        })?;

    let mut stdout_pipe = child.stdout.take().expect("stdout piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr piped");
    let out_handle = thread::spawn(move || {
        let mut buf = String::new();
        let _ = stdout_pipe.read_to_string(&mut buf);
        buf
    });
    let err_handle = thread::spawn(move || {
        let mut buf = String::new();
        let _ = stderr_pipe.read_to_string(&mut buf);
        buf
    });

    let deadline = Instant::now() + timeout;
    let mut timed_out = false;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status.code().unwrap_or(-1),
            None if Instant::now() >= deadline => {
                warn!("{} timed out after {:?}, killing", program.display(), timeout);
                let _ = child.kill();
                let _ = child.wait();
                timed_out = true;
                break -1;
            }
            None => thread::sleep(Duration::from_millis(50)),
        }
    };

    let stdout = out_handle.join().unwrap_or_default();
    let stderr = err_handle.join().unwrap_or_default();
    Ok(CmdOutput { status, stdout, stderr, timed_out })
}

/// Per-case evaluation record.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub label: String,
    pub wav: PathBuf,
    pub receiver_rc: i32,
    pub exact_match: bool,
    pub similarity: f64,
    pub decoded_len: usize,
    pub decoded_words: usize,
    pub receiver_stderr: String,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.exact_match && self.receiver_rc == 0
    }

    fn report_line(&self) -> String {
        format!(
            "{}  {:<35}  sim={:.4}  rc={}  wav={}",
            if self.passed() { "PASS" } else { "FAIL" },
            self.label,
            self.similarity,
            self.receiver_rc,
            self.wav
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        )
    }

    fn engine_failure(label: String, wav: PathBuf, message: String) -> Self {
        Self {
            label,
            wav,
            receiver_rc: ENGINE_FAILED_RC,
            exact_match: false,
            similarity: 0.0,
            decoded_len: 0,
            decoded_words: 0,
            receiver_stderr: message,
        }
    }
}

/// Drives sender -> damage matrix -> receiver -> report.
pub struct StressRunner {
    pub sender: PathBuf,
    pub receiver: PathBuf,
    pub plaintext: String,
    pub cover: Option<PathBuf>,
    pub workdir: PathBuf,
    pub outdir: PathBuf,
    pub timeout: Duration,
    pub jobs: usize,
}

impl StressRunner {
    /// Run the whole matrix; returns the base sanity row followed by one
    /// outcome per case, in matrix order.
    pub fn run(&self, cases: &[Case]) -> Result<Vec<CaseOutcome>> {
        for (path, name) in [(&self.sender, "sender"), (&self.receiver, "receiver")] {
            if !path.exists() {
                return Err(ChanStressError::harness(format!(
                    "{name} not found: {}",
                    path.display()
                )));
            }
        }

        debug!("plaintext: {} words", word_count(&self.plaintext));

        let out_root = self.outdir.join(run_id()?);
        std::fs::create_dir_all(&out_root)?;

        // 1) Sender: encrypt + encode to encoded_signal.wav.
        let mut sender_args = vec![self.plaintext.clone()];
        if let Some(cover) = &self.cover {
            sender_args.push(cover.display().to_string());
        }
        let sent = run_cmd(&self.sender, &sender_args, &self.workdir, self.timeout)?;
        if sent.status != 0 {
            return Err(ChanStressError::harness(format!(
                "sender failed (rc={}): {}",
                sent.status,
                sent.stderr.trim()
            )));
        }

        let base_wav = self.workdir.join("encoded_signal.wav");
        if !base_wav.exists() {
            return Err(ChanStressError::harness(
                "sender ran but encoded_signal.wav not found in the working directory",
            ));
        }
        let base_copy = out_root.join("00_base_encoded_signal.wav");
        std::fs::copy(&base_wav, &base_copy)?;

        // 2) Receiver on the undamaged signal: sanity row.
        let mut outcomes = vec![self.decode_and_evaluate("base".to_string(), &base_copy)?];

        // 3) Damage matrix. Cases are independent (own RNG, own filters),
        //    so they run in parallel; results keep matrix order.
        let base_audio = AudioBuffer::from_wav_file(&base_copy)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.max(1))
            .build()
            .map_err(|e| ChanStressError::harness(format!("Thread pool: {e}")))?;

        let case_outcomes: Vec<CaseOutcome> = pool.install(|| {
            cases
                .par_iter()
                .enumerate()
                .map(|(i, case)| self.run_case(i + 1, case, &base_audio, &out_root))
                .collect()
        });
        outcomes.extend(case_outcomes);

        Ok(outcomes)
    }

    fn run_case(
        &self,
        index: usize,
        case: &Case,
        base_audio: &AudioBuffer,
        out_root: &Path,
    ) -> CaseOutcome {
        let label = case.slug(index);
        let wav_path = out_root.join(format!("{label}.wav"));
        info!("channel: {label}");

        let damaged = damage_buffer(base_audio, case.preset, case.noise, case.snr_db, case.seed);
        if let Err(e) = damaged.write_wav_16bit(&wav_path) {
            return CaseOutcome::engine_failure(label, wav_path, format!("engine failed: {e}"));
        }

        match self.decode_and_evaluate(label.clone(), &wav_path) {
            Ok(outcome) => outcome,
            Err(e) => CaseOutcome::engine_failure(label, wav_path, format!("receiver failed: {e}")),
        }
    }

    fn decode_and_evaluate(&self, label: String, wav: &Path) -> Result<CaseOutcome> {
        let args = vec![wav.display().to_string()];
        let out = run_cmd(&self.receiver, &args, &self.workdir, self.timeout)?;

        let decoded = if out.status == 0 && !out.timed_out {
            parse_receiver_output(&out.stdout)
        } else {
            String::new()
        };

        let exact = normalize_text(&decoded) == normalize_text(&self.plaintext);
        let similarity = if decoded.is_empty() {
            0.0
        } else {
            similarity_quick(&self.plaintext, &decoded)
        };

        Ok(CaseOutcome {
            label,
            wav: wav.to_path_buf(),
            receiver_rc: out.status,
            exact_match: exact,
            similarity,
            decoded_len: decoded.chars().count(),
            decoded_words: word_count(&decoded),
            receiver_stderr: out.stderr,
        })
    }
}

/// Render one PASS/FAIL line per outcome.
pub fn render_report(outcomes: &[CaseOutcome]) -> String {
    outcomes
        .iter()
        .map(CaseOutcome::report_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn run_id() -> Result<String> {
    let fmt = format_description!("[year][month][day]_[hour][minute][second]");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&fmt)
        .map_err(|e| ChanStressError::harness(format!("Failed to format run id: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_shape() {
        let id = run_id().unwrap();
        assert_eq!(id.len(), 15);
        assert_eq!(&id[8..9], "_");
    }

    #[test]
    fn test_report_line_pass_and_fail() {
        let pass = CaseOutcome {
            label: "01_none_awgn_snr40_seed123".into(),
            wav: PathBuf::from("/runs/x/01_none_awgn_snr40_seed123.wav"),
            receiver_rc: 0,
            exact_match: true,
            similarity: 1.0,
            decoded_len: 10,
            decoded_words: 2,
            receiver_stderr: String::new(),
        };
        let line = pass.report_line();
        assert!(line.starts_with("PASS"));
        assert!(line.contains("sim=1.0000"));
        assert!(line.contains("01_none_awgn_snr40_seed123.wav"));

        let mut fail = pass.clone();
        fail.receiver_rc = 1;
        assert!(fail.report_line().starts_with("FAIL"));
    }

    #[test]
    fn test_engine_failure_outcome() {
        let o = CaseOutcome::engine_failure("x".into(), PathBuf::from("x.wav"), "boom".into());
        assert!(!o.passed());
        assert_eq!(o.receiver_rc, ENGINE_FAILED_RC);
        assert_eq!(o.similarity, 0.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_cmd_captures_output() {
        let out = run_cmd(
            Path::new("/bin/sh"),
            &["-c".into(), "echo hello; echo oops >&2".into()],
            Path::new("."),
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(out.status, 0);
        assert!(!out.timed_out);
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_cmd_times_out() {
        let out = run_cmd(
            Path::new("/bin/sh"),
            &["-c".into(), "sleep 30".into()],
            Path::new("."),
            Duration::from_millis(200),
        )
        .unwrap();
        assert!(out.timed_out);
        assert_ne!(out.status, 0);
    }
}
