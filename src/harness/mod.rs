//! Stress harness
//!
//! Drives the external sender/receiver pair through the damage matrix:
//! encode once, damage per case through the in-process engine, decode,
//! compare against the original plaintext, and report pass/fail.

pub mod cases;
pub mod runner;
pub mod similarity;

pub use cases::{Case, default_cases, load_cases};
pub use runner::{CaseOutcome, StressRunner};
