//! Campaign execution
//!
//! Expands a scenario into parameter points, renders project instances into
//! a temporary directory, and drives verifyta over every (instance,
//! property) pair with a semaphore-bounded pool of tokio tasks.

use crate::report::CampaignReport;
use crate::HarnessError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use twincheck_model::{PlantParams, ProjectTemplate, Property, PropertyKind, ScenarioFile};
use twincheck_uppaal::{
    detect_verifyta, parse_probability, parse_simulation, run_verifyta, satisfaction,
    ProbabilityEstimate, Trajectory, UppaalConfig,
};

/// Configuration for an experiment campaign
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    /// verifyta driver configuration
    pub uppaal: UppaalConfig,
    /// Name of the scenario to expand
    pub scenario: String,
    /// Run the exhaustive queries
    pub run_queries: bool,
    /// Run the SMC probability estimates
    pub run_probabilities: bool,
    /// Run the simulation traces
    pub run_simulations: bool,
    /// Maximum concurrent verifyta processes
    pub max_concurrent: usize,
    /// Directory for simulation CSV series
    pub results_dir: PathBuf,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        // Leave one core for the harness itself, as many verifyta runs as
        // the rest can take.
        let workers = std::thread::available_parallelism()
            .map_or(1, |p| p.get().saturating_sub(1).max(1));
        Self {
            uppaal: UppaalConfig::default(),
            scenario: "extensive".to_string(),
            run_queries: true,
            run_probabilities: true,
            run_simulations: true,
            max_concurrent: workers,
            results_dir: PathBuf::from("results"),
        }
    }
}

/// Result of one (instance, property) verification run
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Exhaustive query verdict
    Query {
        /// Whether the formula holds on every run
        satisfied: bool,
    },
    /// SMC probability estimate
    Probability {
        /// Whether verifyta reported the formula satisfied
        satisfied: bool,
        /// Parsed estimate; zeroed when unsatisfied
        estimate: ProbabilityEstimate,
    },
    /// Simulation trace
    Simulation {
        /// Whether verifyta reported the formula satisfied
        satisfied: bool,
        /// Parsed trajectories
        trajectories: Vec<Trajectory>,
    },
    /// verifyta failed or timed out for this pair
    Error {
        /// Failure description
        message: String,
    },
}

impl Outcome {
    /// Whether this run counts as satisfied
    pub fn satisfied(&self) -> bool {
        match self {
            Outcome::Query { satisfied }
            | Outcome::Probability { satisfied, .. }
            | Outcome::Simulation { satisfied, .. } => *satisfied,
            Outcome::Error { .. } => false,
        }
    }
}

/// One collected verification run
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// Instance label of the parameter point
    pub label: String,
    /// The verified property
    pub property: Property,
    /// Parsed outcome
    pub outcome: Outcome,
    /// Wall time of the verifyta run in seconds
    pub seconds: f64,
}

/// An experiment campaign over one scenario
pub struct Campaign {
    config: CampaignConfig,
}

impl Campaign {
    /// Create a campaign with the given configuration
    pub fn new(config: CampaignConfig) -> Self {
        Self { config }
    }

    /// Properties of the template selected by the configuration toggles
    fn selected_properties(&self, template: &ProjectTemplate) -> Vec<Property> {
        template
            .properties()
            .iter()
            .filter(|p| match p.kind {
                PropertyKind::Query => self.config.run_queries,
                PropertyKind::Probability => self.config.run_probabilities,
                PropertyKind::Simulation => self.config.run_simulations,
            })
            .cloned()
            .collect()
    }

    /// Run the campaign
    ///
    /// Expands the configured scenario, verifies every (point, property)
    /// pair, and assembles the report. Individual verifyta failures are
    /// recorded as error outcomes; the campaign itself only fails on
    /// setup problems (missing scenario, missing verifyta, I/O).
    pub async fn run(
        &self,
        template: &ProjectTemplate,
        scenarios: &ScenarioFile,
    ) -> Result<CampaignReport, HarnessError> {
        let verifyta = detect_verifyta(&self.config.uppaal).await?;
        let scenario = scenarios.get(&self.config.scenario)?;
        let points = scenario.points();
        let properties = self.selected_properties(template);

        if points.is_empty() || properties.is_empty() {
            info!(
                scenario = %self.config.scenario,
                "nothing to verify: {} points, {} properties",
                points.len(),
                properties.len()
            );
            return Ok(CampaignReport::assemble(
                &self.config.scenario,
                Vec::new(),
                &self.config.results_dir,
            )?);
        }

        let total = points.len() * properties.len();
        info!(
            scenario = %self.config.scenario,
            points = points.len(),
            properties = properties.len(),
            workers = self.config.max_concurrent,
            "starting campaign: {} verifyta runs",
            total
        );

        // Stage all instances and property files up front; verifyta only
        // reads them, so one project file per parameter point is enough.
        let workdir = tempfile::tempdir()?;
        let mut property_files = Vec::with_capacity(properties.len());
        for property in &properties {
            let path = workdir.path().join(format!("{}.txt", property.tag()));
            std::fs::write(&path, format!("{}\n", property.text))?;
            property_files.push(path);
        }
        let mut project_files = Vec::with_capacity(points.len());
        for params in &points {
            let path = workdir
                .path()
                .join(format!("project_{}.xml", params.label()));
            std::fs::write(&path, template.instantiate(params))?;
            project_files.push(path);
        }

        let records = self
            .verify_all(&verifyta, &points, &properties, &project_files, &property_files, total)
            .await?;

        let report =
            CampaignReport::assemble(&self.config.scenario, records, &self.config.results_dir)?;
        if report.all_satisfied {
            info!("all exhaustive queries are satisfied");
        } else {
            warn!("some exhaustive queries are not satisfied");
        }
        Ok(report)
    }

    /// Run verifyta on every (point, property) pair with bounded parallelism
    async fn verify_all(
        &self,
        verifyta: &std::path::Path,
        points: &[PlantParams],
        properties: &[Property],
        project_files: &[PathBuf],
        property_files: &[PathBuf],
        total: usize,
    ) -> Result<Vec<RunRecord>, HarnessError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let done = Arc::new(AtomicUsize::new(0));
        let verifyta = Arc::new(verifyta.to_path_buf());
        let timeout = self.config.uppaal.timeout;

        let mut handles = Vec::with_capacity(total);
        for (point_idx, params) in points.iter().enumerate() {
            for (prop_idx, property) in properties.iter().enumerate() {
                let semaphore = Arc::clone(&semaphore);
                let done = Arc::clone(&done);
                let verifyta = Arc::clone(&verifyta);
                let label = params.label();
                let property = property.clone();
                let project = project_files[point_idx].clone();
                let query = property_files[prop_idx].clone();

                handles.push(tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return RunRecord {
                                label,
                                property,
                                outcome: Outcome::Error {
                                    message: "worker pool shut down".to_string(),
                                },
                                seconds: 0.0,
                            };
                        }
                    };

                    let record =
                        verify_one(&verifyta, &project, &query, timeout, label, property).await;
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    info!(
                        "[{}/{}] {} {}: {}",
                        finished,
                        total,
                        record.label,
                        record.property.tag(),
                        match &record.outcome {
                            Outcome::Error { message } => format!("error: {}", message),
                            outcome if outcome.satisfied() => "satisfied".to_string(),
                            _ => "not satisfied".to_string(),
                        }
                    );
                    record
                }));
            }
        }

        let mut records = Vec::with_capacity(handles.len());
        for handle in handles {
            records.push(handle.await.map_err(|e| HarnessError::Task(e.to_string()))?);
        }
        Ok(records)
    }
}

/// Run and parse a single (instance, property) pair
async fn verify_one(
    verifyta: &std::path::Path,
    project: &std::path::Path,
    query: &std::path::Path,
    timeout: std::time::Duration,
    label: String,
    property: Property,
) -> RunRecord {
    debug!("verifying {} against {}", property.tag(), label);
    match run_verifyta(verifyta, project, query, timeout).await {
        Ok(output) => {
            let satisfied = satisfaction(&output.stdout);
            let outcome = match property.kind {
                PropertyKind::Query => Outcome::Query { satisfied },
                PropertyKind::Probability => Outcome::Probability {
                    satisfied,
                    estimate: parse_probability(&output.stdout),
                },
                PropertyKind::Simulation => Outcome::Simulation {
                    satisfied,
                    trajectories: parse_simulation(&output.stdout),
                },
            };
            RunRecord {
                label,
                property,
                outcome,
                seconds: output.duration.as_secs_f64(),
            }
        }
        Err(e) => RunRecord {
            label,
            property,
            outcome: Outcome::Error {
                message: e.to_string(),
            },
            seconds: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twincheck_model::{ParamRange, Scenario, SweepSpace, VecRange};

    const TEMPLATE: &str = r#"<nta>
    <system>
placeholder
    </system>
    <queries>
        <query><formula>A[] not deadlock</formula></query>
        <query><formula>Pr[&lt;=1000](&lt;&gt; done)</formula></query>
        <query><formula>simulate [&lt;=1000] { disks }</formula></query>
    </queries>
</nta>
"#;

    fn template() -> ProjectTemplate {
        ProjectTemplate::from_text(TEMPLATE).unwrap()
    }

    #[test]
    fn default_config_keeps_a_core_for_the_harness() {
        let config = CampaignConfig::default();
        assert!(config.max_concurrent >= 1);
        assert_eq!(config.scenario, "extensive");
        assert!(config.run_queries);
        assert!(config.run_probabilities);
        assert!(config.run_simulations);
    }

    #[test]
    fn toggles_filter_properties() {
        let campaign = Campaign::new(CampaignConfig {
            run_probabilities: false,
            run_simulations: false,
            ..CampaignConfig::default()
        });
        let selected = campaign.selected_properties(&template());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].kind, PropertyKind::Query);
    }

    #[test]
    fn all_toggles_select_everything() {
        let campaign = Campaign::new(CampaignConfig::default());
        assert_eq!(campaign.selected_properties(&template()).len(), 3);
    }

    #[test]
    fn error_outcome_is_never_satisfied() {
        let outcome = Outcome::Error {
            message: "boom".into(),
        };
        assert!(!outcome.satisfied());
    }

    #[tokio::test]
    async fn campaign_surfaces_missing_verifyta() {
        let config = CampaignConfig {
            uppaal: UppaalConfig::default()
                .with_verifyta_path(PathBuf::from("/nonexistent/verifyta")),
            ..CampaignConfig::default()
        };
        let scenarios = ScenarioFile::from_json(
            r#"{"extensive": {
                "speed": {"min": 1, "max": 1},
                "disks": {"min": 9, "max": 9},
                "policy": {"min": 0, "max": 0},
                "out_sensors": {"min": [3], "max": [3]},
                "stations_processing": {"min": [2], "max": [2]}
            }}"#,
        )
        .unwrap();
        let result = Campaign::new(config).run(&template(), &scenarios).await;
        assert!(matches!(result, Err(HarnessError::Uppaal(_))));
    }

    #[tokio::test]
    async fn campaign_surfaces_missing_scenario() {
        // Scenario lookup happens after detection; use a scenario file with
        // no scenarios and a bogus verifyta so the earlier failure wins.
        let config = CampaignConfig {
            scenario: "missing".to_string(),
            uppaal: UppaalConfig::default()
                .with_verifyta_path(PathBuf::from("/nonexistent/verifyta")),
            ..CampaignConfig::default()
        };
        let scenarios = ScenarioFile::from_json("{}").unwrap();
        let result = Campaign::new(config).run(&template(), &scenarios).await;
        // Detection fails first with the bogus path.
        assert!(result.is_err());
    }

    #[test]
    fn sweep_expansion_matches_report_keys() {
        let space = SweepSpace {
            speed: ParamRange { min: 1, max: 2 },
            disks: ParamRange { min: 9, max: 9 },
            policy: ParamRange { min: 0, max: 0 },
            out_sensors: VecRange {
                min: vec![3],
                max: vec![3],
            },
            stations_processing: VecRange {
                min: vec![2],
                max: vec![2],
            },
        };
        let scenario = Scenario::Sweep(space);
        let labels: Vec<_> = scenario.points().iter().map(PlantParams::label).collect();
        assert_eq!(labels, vec!["s1-d9-p0-os[3]-sp[2]", "s2-d9-p0-os[3]-sp[2]"]);
    }
}
