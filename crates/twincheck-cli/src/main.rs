//! twincheck CLI
//!
//! Command-line interface for the plant verification harness.
//!
//! # Commands
//!
//! - `twincheck run <config.json> <project.xml>` - Run a verification campaign
//! - `twincheck properties <project.xml>` - List and classify template formulas
//! - `twincheck check-tools` - Check that verifyta is installed

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use twincheck_harness::{Campaign, CampaignConfig, CampaignReport};
use twincheck_model::{ProjectTemplate, PropertyKind, ScenarioFile};
use twincheck_uppaal::{detect_verifyta, UppaalConfig};

#[derive(Parser)]
#[command(name = "twincheck")]
#[command(about = "UPPAAL verification harness for the production plant digital twin")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a verification campaign over a scenario
    Run {
        /// Scenario configuration file (config.json)
        config: PathBuf,
        /// UPPAAL project template (project.xml)
        project: PathBuf,
        /// Path to the verifyta executable (defaults to PATH lookup)
        #[arg(short, long)]
        verifyta: Option<PathBuf>,
        /// Name of the scenario to run
        #[arg(short, long, default_value = "extensive")]
        scenario: String,
        /// Skip the exhaustive queries
        #[arg(long)]
        no_queries: bool,
        /// Skip the SMC probability estimates
        #[arg(long)]
        no_probabilities: bool,
        /// Skip the simulation traces
        #[arg(long)]
        no_simulations: bool,
        /// Print only the summary instead of the full report
        #[arg(long)]
        short: bool,
        /// Timeout per verifyta run in seconds
        #[arg(short, long, default_value = "300")]
        timeout: u64,
        /// Number of concurrent verifyta processes (0 = cpus - 1)
        #[arg(short, long, default_value = "0")]
        jobs: usize,
        /// Directory for simulation CSV series
        #[arg(long, default_value = "results")]
        results_dir: PathBuf,
    },
    /// List and classify the formulas of a project template
    Properties {
        /// UPPAAL project template (project.xml)
        project: PathBuf,
    },
    /// Check that verifyta is installed and usable
    CheckTools {
        /// Path to the verifyta executable (defaults to PATH lookup)
        #[arg(short, long)]
        verifyta: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            project,
            verifyta,
            scenario,
            no_queries,
            no_probabilities,
            no_simulations,
            short,
            timeout,
            jobs,
            results_dir,
        } => {
            run_campaign(RunArgs {
                config,
                project,
                verifyta,
                scenario,
                no_queries,
                no_probabilities,
                no_simulations,
                short,
                timeout,
                jobs,
                results_dir,
            })
            .await
        }
        Commands::Properties { project } => list_properties(&project),
        Commands::CheckTools { verifyta } => check_tools(verifyta).await,
    }
}

struct RunArgs {
    config: PathBuf,
    project: PathBuf,
    verifyta: Option<PathBuf>,
    scenario: String,
    no_queries: bool,
    no_probabilities: bool,
    no_simulations: bool,
    short: bool,
    timeout: u64,
    jobs: usize,
    results_dir: PathBuf,
}

async fn run_campaign(args: RunArgs) -> anyhow::Result<()> {
    let scenarios = ScenarioFile::load(&args.config)?;
    let template = ProjectTemplate::load(&args.project)?;

    let mut uppaal = UppaalConfig::default().with_timeout(Duration::from_secs(args.timeout));
    if let Some(path) = args.verifyta {
        uppaal = uppaal.with_verifyta_path(path);
    }

    let defaults = CampaignConfig::default();
    let config = CampaignConfig {
        uppaal,
        scenario: args.scenario,
        run_queries: !args.no_queries,
        run_probabilities: !args.no_probabilities,
        run_simulations: !args.no_simulations,
        max_concurrent: if args.jobs == 0 {
            defaults.max_concurrent
        } else {
            args.jobs
        },
        results_dir: args.results_dir,
    };

    let report = Campaign::new(config).run(&template, &scenarios).await?;
    if args.short {
        print_summary(&report);
    } else {
        println!("{}", report.to_json(true)?);
    }

    if !report.all_satisfied || report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(report: &CampaignReport) {
    println!("Scenario: {}", report.scenario);
    println!(
        "Runs: {} ({} satisfied, {} unsatisfied, {} errors) in {:.1}s",
        report.summary.runs,
        report.summary.satisfied,
        report.summary.unsatisfied,
        report.summary.errors,
        report.total_seconds
    );
    println!(
        "Exhaustive queries: {}",
        if report.all_satisfied {
            "all satisfied"
        } else {
            "NOT all satisfied"
        }
    );
}

fn list_properties(project: &std::path::Path) -> anyhow::Result<()> {
    let template = ProjectTemplate::load(project)?;
    let properties = template.properties();
    if properties.is_empty() {
        println!("No formulas found in {}", project.display());
        return Ok(());
    }

    for kind in [
        PropertyKind::Query,
        PropertyKind::Probability,
        PropertyKind::Simulation,
    ] {
        let of_kind = template.properties_of(kind);
        if of_kind.is_empty() {
            continue;
        }
        println!("{}:", kind_heading(kind));
        for property in of_kind {
            println!("  {:<16} {}", property.tag(), property.text);
        }
        println!();
    }
    println!("{} formulas total", properties.len());
    Ok(())
}

fn kind_heading(kind: PropertyKind) -> &'static str {
    match kind {
        PropertyKind::Query => "Exhaustive queries",
        PropertyKind::Probability => "Probability estimates",
        PropertyKind::Simulation => "Simulations",
    }
}

async fn check_tools(verifyta: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = UppaalConfig::default();
    if let Some(path) = verifyta {
        config = config.with_verifyta_path(path);
    }

    match detect_verifyta(&config).await {
        Ok(path) => {
            println!("verifyta  OK  ({})", path.display());
            Ok(())
        }
        Err(e) => {
            println!("verifyta  --  {}", e);
            println!("Install UPPAAL and put verifyta on PATH, or pass --verifyta.");
            std::process::exit(1);
        }
    }
}
