//! verifyta output parsing
//!
//! verifyta reports every property on stdout. All functions here are
//! line-oriented and accept both LF and CRLF output; verifyta on Windows
//! (and some Linux builds) emits CRLF.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker verifyta prints for a satisfied formula
const SATISFIED: &str = "Formula is satisfied";

/// Whether the run reports the formula as satisfied
pub fn satisfaction(stdout: &str) -> bool {
    stdout.contains(SATISFIED)
}

/// Closed interval of a probability estimate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

/// Integer range of the SMC value histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntRange {
    /// Lower bound
    pub min: i64,
    /// Upper bound
    pub max: i64,
}

/// Histogram of the sampled quantity reported alongside an SMC estimate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueHistogram {
    /// Range of the sampled values
    pub range: IntRange,
    /// Mean of the samples
    pub mean: f64,
    /// Per-bucket sample counts (`steps=1`)
    pub samples: Vec<i64>,
}

/// Parsed SMC probability estimate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilityEstimate {
    /// Probability confidence interval
    pub interval: Interval,
    /// Confidence level as a fraction, e.g. `0.95`
    pub confidence: f64,
    /// Value histogram of the estimated quantity
    pub values: ValueHistogram,
}

/// Parse an SMC probability run
///
/// An unsatisfied or unparseable run yields the zeroed estimate, matching
/// how the campaign reports failed probability properties.
pub fn parse_probability(stdout: &str) -> ProbabilityEstimate {
    if !satisfaction(stdout) {
        return ProbabilityEstimate::default();
    }

    // e.g. "[0.902606,0.952606] (95% CI)"
    let interval_re = Regex::new(r"\[([\d.eE+-]+),\s*([\d.eE+-]+)\]\s+\((\d+)% CI\)")
        .expect("regex compiles");
    // e.g. "Values in [14,22] mean=17.6 steps=1: 3 12 25 30 18 9 2 1"
    let values_re = Regex::new(r"Values in \[(-?\d+),(-?\d+)\] mean=([\d.eE+-]+) steps=1: (.+)")
        .expect("regex compiles");

    let mut estimate = ProbabilityEstimate::default();
    let mut found = false;

    for line in stdout.lines() {
        if let Some(caps) = interval_re.captures(line) {
            let (Ok(min), Ok(max), Ok(percent)) = (
                caps[1].parse::<f64>(),
                caps[2].parse::<f64>(),
                caps[3].parse::<f64>(),
            ) else {
                continue;
            };
            estimate.interval = Interval { min, max };
            estimate.confidence = percent / 100.0;
            found = true;
        } else if let Some(caps) = values_re.captures(line) {
            let (Ok(min), Ok(max), Ok(mean)) = (
                caps[1].parse::<i64>(),
                caps[2].parse::<i64>(),
                caps[3].parse::<f64>(),
            ) else {
                continue;
            };
            estimate.values = ValueHistogram {
                range: IntRange { min, max },
                mean,
                samples: caps[4]
                    .split_whitespace()
                    .filter_map(|s| s.parse().ok())
                    .collect(),
            };
        }
    }

    if found {
        estimate
    } else {
        ProbabilityEstimate::default()
    }
}

/// One plotted quantity of a `simulate` run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    /// The quantity's label as printed by verifyta
    pub name: String,
    /// `(time, value)` samples; time is truncated to whole units
    pub points: Vec<(i64, i64)>,
}

/// Parse the trajectories of a `simulate` run
///
/// verifyta prints each simulated quantity as a label line followed by one
/// or more lines of `(time,value)` pairs. Any line carrying such pairs is
/// treated as point data for the most recently seen label.
pub fn parse_simulation(stdout: &str) -> Vec<Trajectory> {
    let point_re = Regex::new(r"\(([\d.]+),(-?\d+)\)").expect("regex compiles");

    let mut trajectories: Vec<Trajectory> = Vec::new();
    let mut pending_name: Option<String> = None;

    for line in stdout.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let points: Vec<(i64, i64)> = point_re
            .captures_iter(trimmed)
            .filter_map(|caps| {
                // Truncate fractional model time to whole units.
                let t = caps[1].split('.').next()?.parse().ok()?;
                let v = caps[2].parse().ok()?;
                Some((t, v))
            })
            .collect();

        if points.is_empty() {
            if !trimmed.starts_with("Verifying formula")
                && !trimmed.contains("Formula is satisfied")
                && !trimmed.contains("Formula is NOT satisfied")
            {
                pending_name = Some(trimmed.trim_end_matches(':').to_string());
            }
        } else if let Some(name) = pending_name.take() {
            trajectories.push(Trajectory { name, points });
        } else if let Some(last) = trajectories.last_mut() {
            // Continuation of the previous trajectory's point data.
            last.points.extend(points);
        }
    }

    trajectories
}
