use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use preflight::app::ImageReference;
use preflight::app::component_factory::{ComponentFactory, Config};
use preflight::domain::certification::{outcome::Outcome, report::Report};
use preflight::infra::{ConcreteComponentFactory, DockerArchiveImage, FileLogger};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(version, about = "Evaluate container images against certification policy checks")]
struct Cli {
    /// Configuration file, defaults to <config dir>/preflight/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the container policy against an image exported with `docker save`
    CheckContainer {
        #[arg(long)]
        archive: PathBuf,

        /// Directory holding the extracted root filesystem of the image
        #[arg(long)]
        rootfs: PathBuf,
    },
    /// Print every auxiliary image the checks depend on, for pre-pulling
    ListAssets,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let file_logger = match FileLogger::create(&config.log.log_file()) {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("unable to open log file: {e}");
            None
        }
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_logger)
        .init();

    let components = match ConcreteComponentFactory.create_components(config) {
        Ok(components) => components,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::ListAssets => match serde_json::to_string_pretty(&components.assets.assets()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("unable to serialize assets: {e}");
                ExitCode::FAILURE
            }
        },
        Command::CheckContainer { archive, rootfs } => {
            let image = match DockerArchiveImage::open(&archive).await {
                Ok(image) => image,
                Err(e) => {
                    error!("unable to open {}: {e}", archive.display());
                    return ExitCode::FAILURE;
                }
            };
            match image.repo_tags() {
                [] => info!("checking untagged image from {}", archive.display()),
                tags => info!("checking {}", tags.join(", ")),
            }

            let report = components
                .engine
                .run(&ImageReference::new(Arc::new(image), rootfs))
                .await;
            print_report(&report);

            if report.passed_overall() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn print_report(report: &Report) {
    println!(
        "started {}, finished {}",
        report.started_at().to_rfc3339(),
        report.finished_at().to_rfc3339()
    );

    for result in report.results() {
        let status = match result.outcome() {
            Outcome::Passed => "PASSED",
            Outcome::Failed => "FAILED",
            Outcome::Errored(_) => "ERROR",
        };
        println!(
            "{status:<7} {} ({:.2}s)",
            result.check_name(),
            result.elapsed().as_secs_f64()
        );

        if let Some(help) = result.help() {
            println!("        {}", help.message);
            println!("        {}", help.suggestion);
        }
        if let Some(cause) = result.outcome().error() {
            println!("        cause: {cause}");
        }
    }
}
