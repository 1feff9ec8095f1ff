//! End-to-end tests of the chanstress CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::f64::consts::PI;
use std::path::Path;
use tempfile::TempDir;

fn write_test_wav(path: &Path, fs: u32, secs: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: fs,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let n = (fs as f64 * secs) as usize;
    for i in 0..n {
        let t = i as f64 / fs as f64;
        let sample = 0.5 * (2.0 * PI * 1000.0 * t).sin();
        writer.write_sample((sample * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn damages_a_wav_and_reports_parameters() {
    let dir = TempDir::new().unwrap();
    let in_wav = dir.path().join("in.wav");
    let out_wav = dir.path().join("out.wav");
    write_test_wav(&in_wav, 8000, 0.5);

    Command::cargo_bin("chanstress")
        .unwrap()
        .arg(&in_wav)
        .arg(&out_wav)
        .args(["--preset", "pstn", "--noise", "awgn", "--snr", "30", "--seed", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: wrote"))
        .stdout(predicate::str::contains("preset=pstn"))
        .stdout(predicate::str::contains("noise=awgn"));

    let reader = hound::WavReader::open(&out_wav).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_rate, 8000);
}

#[test]
fn unknown_preset_fails_before_writing_output() {
    let dir = TempDir::new().unwrap();
    let in_wav = dir.path().join("in.wav");
    let out_wav = dir.path().join("out.wav");
    write_test_wav(&in_wav, 8000, 0.2);

    Command::cargo_bin("chanstress")
        .unwrap()
        .arg(&in_wav)
        .arg(&out_wav)
        .args(["--preset", "mp3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown preset"));

    assert!(!out_wav.exists(), "no partial output on selector error");
}

#[test]
fn unknown_noise_fails_before_writing_output() {
    let dir = TempDir::new().unwrap();
    let in_wav = dir.path().join("in.wav");
    let out_wav = dir.path().join("out.wav");
    write_test_wav(&in_wav, 8000, 0.2);

    Command::cargo_bin("chanstress")
        .unwrap()
        .arg(&in_wav)
        .arg(&out_wav)
        .args(["--noise", "thunder"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown noise"));

    assert!(!out_wav.exists());
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let out_wav = dir.path().join("out.wav");

    Command::cargo_bin("chanstress")
        .unwrap()
        .arg(dir.path().join("missing.wav"))
        .arg(&out_wav)
        .assert()
        .failure();

    assert!(!out_wav.exists());
}

#[test]
fn same_parameters_produce_byte_identical_output() {
    let dir = TempDir::new().unwrap();
    let in_wav = dir.path().join("in.wav");
    write_test_wav(&in_wav, 8000, 1.0);

    let out_a = dir.path().join("a.wav");
    let out_b = dir.path().join("b.wav");
    for out in [&out_a, &out_b] {
        Command::cargo_bin("chanstress")
            .unwrap()
            .arg(&in_wav)
            .arg(out)
            .args(["--preset", "voip", "--noise", "mix", "--snr", "18", "--seed", "123"])
            .assert()
            .success();
    }

    let a = std::fs::read(&out_a).unwrap();
    let b = std::fs::read(&out_b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_produce_different_output() {
    let dir = TempDir::new().unwrap();
    let in_wav = dir.path().join("in.wav");
    write_test_wav(&in_wav, 8000, 1.0);

    let out_a = dir.path().join("a.wav");
    let out_b = dir.path().join("b.wav");
    for (out, seed) in [(&out_a, "1"), (&out_b, "2")] {
        Command::cargo_bin("chanstress")
            .unwrap()
            .arg(&in_wav)
            .arg(out)
            .args(["--noise", "awgn", "--snr", "18", "--seed", seed])
            .assert()
            .success();
    }

    assert_ne!(std::fs::read(&out_a).unwrap(), std::fs::read(&out_b).unwrap());
}
