//! UPPAAL `verifyta` driver
//!
//! UPPAAL is a model checker for networks of timed automata; `verifyta` is
//! its command-line verifier. This crate locates the binary, runs it on a
//! concrete project/property pair, and parses the three result shapes the
//! plant model produces:
//!
//! - exhaustive queries (`A[] ...`) answered yes/no,
//! - SMC probability estimates with a confidence interval and a value
//!   histogram,
//! - simulation traces as `(time, value)` point series.
//!
//! See: <https://uppaal.org/>

pub mod config;
pub mod detect;
pub mod error;
pub mod exec;
pub mod parse;

pub use config::UppaalConfig;
pub use detect::detect_verifyta;
pub use error::UppaalError;
pub use exec::{run_verifyta, VerifytaOutput};
pub use parse::{
    parse_probability, parse_simulation, satisfaction, IntRange, Interval, ProbabilityEstimate,
    Trajectory, ValueHistogram,
};

#[cfg(test)]
mod tests;
