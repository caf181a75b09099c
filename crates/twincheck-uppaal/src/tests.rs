//! Tests for the verifyta driver

use super::*;
use std::path::PathBuf;
use std::time::Duration;

const QUERY_SATISFIED: &str = "\
Options for the verification:
  Generating no trace
Verifying formula 1 at /tmp/query_00.txt
 -- Formula is satisfied.
";

const QUERY_VIOLATED: &str = "\
Verifying formula 1 at /tmp/query_01.txt
 -- Formula is NOT satisfied.
";

const PROBABILITY_OUTPUT: &str = "\
Verifying formula 1 at /tmp/probability_00.txt
 -- Formula is satisfied.
(39 runs) Pr(<> ...) in [0.902606,0.952606] (95% CI)
Values in [14,22] mean=17.6 steps=1: 3 12 25 30 18 9 2 1
";

const SIMULATION_OUTPUT: &str = "\
Verifying formula 1 at /tmp/simulation_00.txt
 -- Formula is satisfied.
conveyorBelt.disks:
(0,9) (12.5,8) (31,9) (47.25,10)
station(0).busy:
(0,0) (5,1)
";

#[test]
fn satisfied_query_detected() {
    assert!(satisfaction(QUERY_SATISFIED));
}

#[test]
fn violated_query_detected() {
    // "Formula is NOT satisfied" must not count as satisfaction.
    assert!(!satisfaction(QUERY_VIOLATED));
}

#[test]
fn satisfaction_accepts_crlf() {
    let crlf = QUERY_SATISFIED.replace('\n', "\r\n");
    assert!(satisfaction(&crlf));
}

#[test]
fn probability_interval_parsed() {
    let estimate = parse_probability(PROBABILITY_OUTPUT);
    assert!((estimate.interval.min - 0.902606).abs() < 1e-9);
    assert!((estimate.interval.max - 0.952606).abs() < 1e-9);
    assert!((estimate.confidence - 0.95).abs() < 1e-9);
}

#[test]
fn probability_histogram_parsed() {
    let estimate = parse_probability(PROBABILITY_OUTPUT);
    assert_eq!(estimate.values.range, IntRange { min: 14, max: 22 });
    assert!((estimate.values.mean - 17.6).abs() < 1e-9);
    assert_eq!(estimate.values.samples, vec![3, 12, 25, 30, 18, 9, 2, 1]);
}

#[test]
fn probability_parses_crlf_output() {
    let crlf = PROBABILITY_OUTPUT.replace('\n', "\r\n");
    let estimate = parse_probability(&crlf);
    assert!((estimate.confidence - 0.95).abs() < 1e-9);
    assert_eq!(estimate.values.samples.len(), 8);
}

#[test]
fn unsatisfied_probability_is_zeroed() {
    let estimate = parse_probability(QUERY_VIOLATED);
    assert_eq!(estimate, ProbabilityEstimate::default());
}

#[test]
fn probability_without_interval_is_zeroed() {
    // Satisfied but no CI line anywhere: treat as unparseable.
    let estimate = parse_probability(QUERY_SATISFIED);
    assert_eq!(estimate, ProbabilityEstimate::default());
}

#[test]
fn probability_scientific_notation_bounds() {
    let out = "\
 -- Formula is satisfied.
Pr(<> ...) in [9.5e-05,0.05] (95% CI)
";
    let estimate = parse_probability(out);
    assert!((estimate.interval.min - 9.5e-05).abs() < 1e-12);
    assert!((estimate.interval.max - 0.05).abs() < 1e-9);
}

#[test]
fn simulation_trajectories_parsed() {
    let trajectories = parse_simulation(SIMULATION_OUTPUT);
    assert_eq!(trajectories.len(), 2);
    assert_eq!(trajectories[0].name, "conveyorBelt.disks");
    assert_eq!(
        trajectories[0].points,
        vec![(0, 9), (12, 8), (31, 9), (47, 10)]
    );
    assert_eq!(trajectories[1].name, "station(0).busy");
    assert_eq!(trajectories[1].points, vec![(0, 0), (5, 1)]);
}

#[test]
fn simulation_time_is_truncated() {
    let trajectories = parse_simulation("x:\n(3.99,7)\n");
    assert_eq!(trajectories[0].points, vec![(3, 7)]);
}

#[test]
fn simulation_point_lines_may_wrap() {
    let out = "x:\n(0,1) (1,2)\n(2,3)\n";
    let trajectories = parse_simulation(out);
    assert_eq!(trajectories.len(), 1);
    assert_eq!(trajectories[0].points, vec![(0, 1), (1, 2), (2, 3)]);
}

#[test]
fn simulation_of_empty_output_is_empty() {
    assert!(parse_simulation("").is_empty());
    assert!(parse_simulation(QUERY_SATISFIED).is_empty());
}

#[tokio::test]
async fn detect_fails_for_nonexistent_path() {
    let config = UppaalConfig::default()
        .with_verifyta_path(PathBuf::from("/nonexistent/verifyta"));
    let result = detect_verifyta(&config).await;
    assert!(matches!(result, Err(UppaalError::NotFound(_))));
}

#[tokio::test]
async fn run_fails_for_nonexistent_binary() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("project.xml");
    let property = dir.path().join("query_00.txt");
    std::fs::write(&project, "<nta/>").unwrap();
    std::fs::write(&property, "A[] not deadlock\n").unwrap();

    let result = run_verifyta(
        std::path::Path::new("/nonexistent/verifyta"),
        &project,
        &property,
        Duration::from_secs(5),
    )
    .await;
    assert!(matches!(result, Err(UppaalError::VerificationFailed(_))));
}

#[test]
fn config_defaults() {
    let config = UppaalConfig::default();
    assert!(config.verifyta_path.is_none());
    assert_eq!(config.timeout, Duration::from_secs(300));
}

#[test]
fn config_builders_preserve_values() {
    let config = UppaalConfig::default()
        .with_verifyta_path(PathBuf::from("/opt/uppaal/bin/verifyta"))
        .with_timeout(Duration::from_secs(60));
    assert_eq!(
        config.verifyta_path,
        Some(PathBuf::from("/opt/uppaal/bin/verifyta"))
    );
    assert_eq!(config.timeout, Duration::from_secs(60));
}
