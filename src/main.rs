//! stagepub - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use stagepub::{
    cli::Args,
    config::{validate_config, Config},
    download::{Dependencies, DownloadCoordinator, DownloadOutcome},
    error::{exit_codes, Error, FailureReason, Result},
    fetch::HttpFetcher,
    fs::StagingArea,
    output::{
        print_banner, print_config_summary, print_error, print_info, print_success,
        print_warning, ConsoleSink,
    },
    permission::PermissionGate,
    platform::{permission_broker, DirectoryBroker},
    publish::Publisher,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::MissingConfig(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::PermissionDenied => ExitCode::from(exit_codes::PERMISSION_DENIED as u8),
                Error::Download(_) | Error::Http(_) => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !args.quiet {
        print_banner();
    }

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        if !args.quiet {
            print_warning(&format!(
                "Configuration file not found: {}",
                config_path.display()
            ));
            print_info("Using default configuration with CLI arguments");
        }
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    if !args.quiet {
        print_config_summary(&config, args.locators.len());
    }

    // Reclaim staging left behind by an interrupted run
    let staging = StagingArea::new(config.staging_root());
    match staging.sweep().await {
        Ok(0) => {}
        Ok(removed) => tracing::info!("Removed {} orphaned staging entries", removed),
        Err(e) => tracing::warn!("Failed to sweep staging area: {}", e),
    }

    let coordinator_deps = build_dependencies(&config, staging)?;
    let (coordinator, mut pump) =
        DownloadCoordinator::new(coordinator_deps, config.publish.subdirectory.clone());
    let mut sink = ConsoleSink::new(args.quiet);

    let mut failed = 0;
    let mut denied = 0;

    for locator in &args.locators {
        if let Err(reason) = coordinator.start(locator) {
            print_warning(&format!("Skipping '{}': {}", locator, reason));
            failed += 1;
            continue;
        }

        match pump.run_until_finished(&mut sink).await {
            Some(DownloadOutcome::Success(name)) => {
                tracing::debug!("Finished {} as {}", locator, name);
            }
            Some(DownloadOutcome::Failure(FailureReason::PermissionDenied)) => {
                denied += 1;
                failed += 1;
            }
            Some(DownloadOutcome::Failure(_)) => failed += 1,
            None => {
                failed += 1;
                break;
            }
        }
    }

    if failed == 0 {
        if !args.quiet {
            print_success(&format!("{} file(s) published", args.locators.len()));
        }
        Ok(())
    } else if denied == failed {
        Err(Error::PermissionDenied)
    } else {
        Err(Error::Download(failed))
    }
}

/// Wire the pipeline collaborators from configuration.
fn build_dependencies(config: &Config, staging: StagingArea) -> Result<Dependencies> {
    let fetcher = HttpFetcher::new(
        &config.network.user_agent,
        Duration::from_secs(config.network.timeout_seconds),
    )?;

    let mut publisher = Publisher::new(config.publish.chunk_size);
    if config.publish.use_broker {
        publisher = publisher.with_broker(Arc::new(DirectoryBroker::new(config.public_root())));
    }
    if let Some(legacy) = &config.publish.legacy_root {
        publisher = publisher.with_legacy_root(legacy.clone());
    }

    Ok(Dependencies {
        permissions: Arc::new(PermissionGate::new(permission_broker(
            config.permissions.mode,
        ))),
        staging: Arc::new(staging),
        fetcher: Arc::new(fetcher),
        publisher: Arc::new(publisher),
    })
}
