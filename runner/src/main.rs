mod config;

use anyhow::{Context, Result};
use shared::GenerationReport;
use tokio::sync::mpsc::UnboundedSender;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runner=info,sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::from_env()?;
    config.validate().context("Invalid evolution parameters")?;

    tracing::info!(
        "Starting evolution: {} generations, population {}, {} moves per individual",
        config.generations,
        config.population_size,
        config.individual_size
    );

    // The core is synchronous; keep it off the async workers and stream
    // reports back as generations finish
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<GenerationReport>();
    let handle = tokio::task::spawn_blocking(move || {
        sim::run_with(config, |report| {
            forward_report(&tx, report);
        })
    });

    while let Some(report) = rx.recv().await {
        log_generation(&report);
    }

    let result = handle.await.context("Evolution task panicked")??;

    tracing::info!(
        "Best fitness {:.2} after {} generations",
        result.best_fitness,
        result.generations_completed
    );

    let json = serde_json::to_string_pretty(&result).context("Failed to serialize run result")?;
    println!("{}", json);

    Ok(())
}

/// Send a copy of `report` to the logging side; returns false if nobody is listening
fn forward_report(tx: &UnboundedSender<GenerationReport>, report: &GenerationReport) -> bool {
    if tx.send(report.clone()).is_err() {
        tracing::warn!(
            generation = report.generation,
            "Report receiver dropped; generation report lost"
        );
        return false;
    }
    true
}

fn log_generation(report: &GenerationReport) {
    let stats = &report.stats;
    tracing::info!(
        generation = report.generation,
        best = stats.best,
        worst = stats.worst,
        mean = stats.mean,
        median = stats.median,
        std_dev = stats.std_dev,
        convergence = stats.convergence,
        best_ever = report.best_ever,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Generation complete"
    );

    if let Some(breakdown) = &report.best_report {
        tracing::debug!(
            generation = report.generation,
            best_tile = breakdown.best_tile,
            mean_effective_moves = breakdown.mean_effective_moves,
            "Threshold hits: {:?}",
            breakdown.threshold_hits
        );
    }
}
