//! `bankload run`

use crate::cli::RunArgs;
use anyhow::{Context, Result};
use bankload_config::BankloadConfig;
use bankload_http::{BankClient, HttpConfig};
use bankload_runner::{LoadRunner, RunSummary, StopReason, StopSignal};
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Apply command-line flags on top of the loaded configuration, then
/// validate the result.
pub fn apply_overrides(config: &mut BankloadConfig, args: &RunArgs) -> Result<()> {
    if let Some(host) = &args.host {
        config.target.host = host.clone();
    }
    if let Some(users) = args.users {
        config.load.users = users;
    }
    if let Some(spawn_rate) = args.spawn_rate {
        config.load.spawn_rate = spawn_rate;
    }
    if let Some(run_time) = args.run_time {
        config.load.run_time = Some(Duration::from_secs(run_time));
    }
    if let Some(variant) = args.variant {
        config.scenario.variant = variant;
    }

    config
        .validate_all()
        .context("Invalid configuration after applying command-line flags")
}

/// Run the load test. `config` must already carry the flags from `args`.
pub async fn handle_run(config: BankloadConfig, args: &RunArgs) -> Result<()> {
    let http_config = HttpConfig::from(config.http.clone());
    let client = BankClient::new(&config.target.host, &http_config)
        .with_context(|| format!("Failed to create HTTP client for {}", config.target.host))?;
    info!(host = %config.target.host, "Target configured");

    let stop = StopSignal::new();
    let interrupt = {
        let stop = stop.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    if stop.trigger(StopReason::Interrupted) {
                        info!("Interrupt received, stopping users");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        })
    };

    let runner = LoadRunner::new(Arc::new(client), config.load.clone(), config.scenario.clone());
    let summary = runner.run(stop).await;
    interrupt.abort();
    let summary = summary.context("Load test could not start")?;

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", json);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Load test summary".bold());
    println!("  Variant:            {}", summary.variant);
    println!("  Started at:         {}", summary.started_at.to_rfc3339());
    println!("  Elapsed:            {:.1}s", summary.elapsed.as_secs_f64());
    println!("  Stop reason:        {}", summary.stop_reason);
    println!(
        "  Simulation started: {}",
        if summary.setup.simulation_started {
            "yes".green()
        } else {
            "no".yellow()
        }
    );
    if let Some(shared) = summary.shared_account {
        println!("  Shared account:     {}", shared);
    }
    println!(
        "  Users:              {} spawned, {} with account, {} aborted",
        summary.users_spawned, summary.users_with_account, summary.users_aborted
    );
    if summary.pool_size > 0 {
        println!("  Account pool:       {}", summary.pool_size);
    }
    println!("  Requests/s:         {:.2}", summary.requests_per_second);
    println!();
    print!("{}", summary.stats);

    let total = &summary.stats.total;
    if total.failures > 0 {
        println!(
            "{}",
            format!(
                "{} of {} requests failed ({:.1}%)",
                total.failures,
                total.requests,
                total.error_rate() * 100.0
            )
            .red()
        );
    } else if total.requests > 0 {
        println!("{}", "All requests succeeded".green());
    }
}
