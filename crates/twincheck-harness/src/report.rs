//! Campaign reports
//!
//! Collected run records are assembled into a serializable report keyed by
//! instance label and property tag, both sorted. Simulation trajectories are
//! written out as two-column CSV series and referenced from the report by
//! file name.

use crate::campaign::{Outcome, RunRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use twincheck_model::PropertyKind;
use twincheck_uppaal::{ProbabilityEstimate, Trajectory};

/// Verdict of one exhaustive query run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// The query formula
    pub query: String,
    /// Whether the formula holds
    pub satisfied: bool,
    /// Wall time of the run in seconds
    pub seconds: f64,
}

/// Result of one SMC probability run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityOutcome {
    /// The probability formula
    pub formula: String,
    /// Whether verifyta reported the formula satisfied
    pub satisfied: bool,
    /// Parsed estimate; zeroed when unsatisfied
    pub estimate: ProbabilityEstimate,
    /// Wall time of the run in seconds
    pub seconds: f64,
}

/// Result of one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// The simulate formula
    pub formula: String,
    /// Whether verifyta reported the formula satisfied
    pub satisfied: bool,
    /// Trajectory name to CSV file name, in the results directory
    pub series: BTreeMap<String, String>,
    /// Wall time of the run in seconds
    pub seconds: f64,
}

/// Aggregate counts over all runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignSummary {
    /// Total verifyta runs
    pub runs: usize,
    /// Runs reported satisfied
    pub satisfied: usize,
    /// Runs reported unsatisfied
    pub unsatisfied: usize,
    /// Runs that failed to execute
    pub errors: usize,
}

/// Assembled campaign report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    /// Name of the verified scenario
    pub scenario: String,
    /// Query verdicts by instance label and property tag
    pub queries: BTreeMap<String, BTreeMap<String, QueryOutcome>>,
    /// Probability estimates by instance label and property tag
    pub probabilities: BTreeMap<String, BTreeMap<String, ProbabilityOutcome>>,
    /// Simulation series by instance label and property tag
    pub simulations: BTreeMap<String, BTreeMap<String, SimulationOutcome>>,
    /// Failure messages by instance label and property tag
    pub errors: BTreeMap<String, BTreeMap<String, String>>,
    /// Whether every exhaustive query run is satisfied
    pub all_satisfied: bool,
    /// Aggregate counts
    pub summary: CampaignSummary,
    /// Total verifyta wall time in seconds
    pub total_seconds: f64,
}

impl CampaignReport {
    /// Assemble the report from collected run records
    ///
    /// Records are sorted by (instance label, property tag); simulation
    /// trajectories are written to `results_dir` as `values_{nn}.csv`,
    /// numbered in that order. The directory is only created when there is
    /// at least one trajectory to write.
    pub fn assemble(
        scenario: &str,
        mut records: Vec<RunRecord>,
        results_dir: &Path,
    ) -> std::io::Result<Self> {
        records.sort_by(|a, b| {
            (a.label.as_str(), a.property.tag()).cmp(&(b.label.as_str(), b.property.tag()))
        });

        let mut report = CampaignReport {
            scenario: scenario.to_string(),
            queries: BTreeMap::new(),
            probabilities: BTreeMap::new(),
            simulations: BTreeMap::new(),
            errors: BTreeMap::new(),
            all_satisfied: true,
            summary: CampaignSummary::default(),
            total_seconds: 0.0,
        };
        let mut series_counter = 0usize;

        for record in records {
            let tag = record.property.tag();
            report.summary.runs += 1;
            report.total_seconds += record.seconds;
            match &record.outcome {
                Outcome::Error { .. } => report.summary.errors += 1,
                outcome if outcome.satisfied() => report.summary.satisfied += 1,
                _ => report.summary.unsatisfied += 1,
            }
            if record.property.kind == PropertyKind::Query && !record.outcome.satisfied() {
                report.all_satisfied = false;
            }

            match record.outcome {
                Outcome::Query { satisfied } => {
                    report.queries.entry(record.label).or_default().insert(
                        tag,
                        QueryOutcome {
                            query: record.property.text,
                            satisfied,
                            seconds: record.seconds,
                        },
                    );
                }
                Outcome::Probability {
                    satisfied,
                    estimate,
                } => {
                    report.probabilities.entry(record.label).or_default().insert(
                        tag,
                        ProbabilityOutcome {
                            formula: record.property.text,
                            satisfied,
                            estimate,
                            seconds: record.seconds,
                        },
                    );
                }
                Outcome::Simulation {
                    satisfied,
                    trajectories,
                } => {
                    let series =
                        write_series(results_dir, &trajectories, &mut series_counter)?;
                    report.simulations.entry(record.label).or_default().insert(
                        tag,
                        SimulationOutcome {
                            formula: record.property.text,
                            satisfied,
                            series,
                            seconds: record.seconds,
                        },
                    );
                }
                Outcome::Error { message } => {
                    report
                        .errors
                        .entry(record.label)
                        .or_default()
                        .insert(tag, message);
                }
            }
        }

        Ok(report)
    }

    /// Serialize the report as JSON
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Whether any run failed to execute
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }
}

/// Write each trajectory as a two-column CSV and return name -> file name
fn write_series(
    results_dir: &Path,
    trajectories: &[Trajectory],
    counter: &mut usize,
) -> std::io::Result<BTreeMap<String, String>> {
    let mut series = BTreeMap::new();
    if trajectories.is_empty() {
        return Ok(series);
    }
    std::fs::create_dir_all(results_dir)?;

    for trajectory in trajectories {
        let file_name = format!("values_{:02}.csv", *counter);
        *counter += 1;
        let path = results_dir.join(&file_name);
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "x,y")?;
        for (x, y) in &trajectory.points {
            writeln!(file, "{},{}", x, y)?;
        }
        debug!("wrote {} points to {}", trajectory.points.len(), path.display());
        series.insert(trajectory.name.clone(), file_name);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use twincheck_model::Property;
    use twincheck_uppaal::{IntRange, Interval, ValueHistogram};

    fn property(kind: PropertyKind, index: usize, text: &str) -> Property {
        Property {
            kind,
            index,
            text: text.to_string(),
        }
    }

    fn query_record(label: &str, satisfied: bool) -> RunRecord {
        RunRecord {
            label: label.to_string(),
            property: property(PropertyKind::Query, 0, "A[] not deadlock"),
            outcome: Outcome::Query { satisfied },
            seconds: 1.5,
        }
    }

    #[test]
    fn all_satisfied_requires_every_query() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            query_record("s1-d9-p0-os[3]-sp[2]", true),
            query_record("s2-d9-p0-os[3]-sp[2]", false),
        ];
        let report = CampaignReport::assemble("extensive", records, dir.path()).unwrap();
        assert!(!report.all_satisfied);
        assert_eq!(report.summary.satisfied, 1);
        assert_eq!(report.summary.unsatisfied, 1);
    }

    #[test]
    fn unsatisfied_probability_does_not_fail_the_campaign() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            query_record("s1-d9-p0-os[3]-sp[2]", true),
            RunRecord {
                label: "s1-d9-p0-os[3]-sp[2]".to_string(),
                property: property(PropertyKind::Probability, 0, "Pr[<=1000](<> done)"),
                outcome: Outcome::Probability {
                    satisfied: false,
                    estimate: ProbabilityEstimate::default(),
                },
                seconds: 2.0,
            },
        ];
        let report = CampaignReport::assemble("extensive", records, dir.path()).unwrap();
        assert!(report.all_satisfied);
    }

    #[test]
    fn error_on_a_query_fails_the_campaign() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![RunRecord {
            label: "s1-d9-p0-os[3]-sp[2]".to_string(),
            property: property(PropertyKind::Query, 0, "A[] not deadlock"),
            outcome: Outcome::Error {
                message: "verifyta exited with signal 9".to_string(),
            },
            seconds: 0.0,
        }];
        let report = CampaignReport::assemble("extensive", records, dir.path()).unwrap();
        assert!(!report.all_satisfied);
        assert!(report.has_errors());
        assert_eq!(
            report.errors["s1-d9-p0-os[3]-sp[2]"]["query_00"],
            "verifyta exited with signal 9"
        );
    }

    #[test]
    fn report_keys_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            query_record("s2-d9-p0-os[3]-sp[2]", true),
            query_record("s1-d9-p0-os[3]-sp[2]", true),
        ];
        let report = CampaignReport::assemble("extensive", records, dir.path()).unwrap();
        let labels: Vec<_> = report.queries.keys().cloned().collect();
        assert_eq!(labels, vec!["s1-d9-p0-os[3]-sp[2]", "s2-d9-p0-os[3]-sp[2]"]);
    }

    #[test]
    fn simulation_series_written_as_csv() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![RunRecord {
            label: "s1-d9-p0-os[3]-sp[2]".to_string(),
            property: property(PropertyKind::Simulation, 0, "simulate [<=1000] { disks }"),
            outcome: Outcome::Simulation {
                satisfied: true,
                trajectories: vec![
                    Trajectory {
                        name: "conveyorBelt.disks".to_string(),
                        points: vec![(0, 9), (12, 8)],
                    },
                    Trajectory {
                        name: "station(0).busy".to_string(),
                        points: vec![(0, 0)],
                    },
                ],
            },
            seconds: 3.0,
        }];
        let report = CampaignReport::assemble("extensive", records, dir.path()).unwrap();

        let outcome = &report.simulations["s1-d9-p0-os[3]-sp[2]"]["simulation_00"];
        assert_eq!(outcome.series["conveyorBelt.disks"], "values_00.csv");
        assert_eq!(outcome.series["station(0).busy"], "values_01.csv");

        let csv = std::fs::read_to_string(dir.path().join("values_00.csv")).unwrap();
        assert_eq!(csv, "x,y\n0,9\n12,8\n");
    }

    #[test]
    fn results_dir_not_created_without_series() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        let records = vec![query_record("s1-d9-p0-os[3]-sp[2]", true)];
        CampaignReport::assemble("extensive", records, &results).unwrap();
        assert!(!results.exists());
    }

    #[test]
    fn probability_estimate_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let estimate = ProbabilityEstimate {
            interval: Interval {
                min: 0.902606,
                max: 0.952606,
            },
            confidence: 0.95,
            values: ValueHistogram {
                range: IntRange { min: 14, max: 22 },
                mean: 17.6,
                samples: vec![3, 12, 25],
            },
        };
        let records = vec![RunRecord {
            label: "s1-d9-p0-os[3]-sp[2]".to_string(),
            property: property(PropertyKind::Probability, 0, "Pr[<=1000](<> done)"),
            outcome: Outcome::Probability {
                satisfied: true,
                estimate: estimate.clone(),
            },
            seconds: 2.0,
        }];
        let report = CampaignReport::assemble("extensive", records, dir.path()).unwrap();
        let json = report.to_json(true).unwrap();
        let parsed: CampaignReport = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.probabilities["s1-d9-p0-os[3]-sp[2]"]["probability_00"].estimate,
            estimate
        );
    }
}
