//! adapot: recompute ada pots and rewards over an epoch range and compare
//! them with the recorded chain state.
//!
//! Chain facts are read from a JSON file. Each settled epoch is compared
//! with the pots the facts record for it, and the last settled epoch is
//! written to a checkpoint so a later run can resume.

mod config;

use std::path::Path;

use adapot_epoch::{CancelToken, Checkpoint, EpochCalculator, EpochRange};
use adapot_provider::{DataProvider, InMemoryProvider};
use adapot_validate::{compare_epoch, ActualEpoch};
use tracing::{info, warn};

use crate::config::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = CliConfig::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("adapot={}", config.logging.log_level).parse()?),
        )
        .init();

    info!("adapot starting");

    // 2. Network and facts
    let network = config.network()?;
    let provider = InMemoryProvider::load(&config.facts_path())?;

    // 3. Range, resumed from the checkpoint when it lines up
    let requested = EpochRange::new(config.run.start_epoch, config.run.end_epoch)?;
    let checkpoint = match config.checkpoint_path() {
        Some(path) => load_checkpoint(&path)?,
        None => None,
    };
    let (range, checkpoint) = match checkpoint {
        Some(checkpoint) => match requested.after(&checkpoint) {
            Some(rest) if rest.start() == checkpoint.last_settled_epoch.saturating_add(1) => {
                info!(
                    last_settled_epoch = checkpoint.last_settled_epoch,
                    "resuming from checkpoint"
                );
                (rest, Some(checkpoint))
            }
            Some(_) => (requested, None),
            None => {
                info!(
                    last_settled_epoch = checkpoint.last_settled_epoch,
                    "checkpoint already covers the range"
                );
                return Ok(());
            }
        },
        None => (requested, None),
    };

    // 4. Run the range off the async runtime until done or interrupted
    let pool_deposit = network.pool_deposit.clone();
    let calculator = EpochCalculator::new(network, provider, config.run.worker_threads)?;
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let mut task = tokio::task::spawn_blocking(move || {
        let outcome = calculator.calculate_range(range, checkpoint, &worker_cancel);
        (calculator, outcome)
    });

    let (calculator, outcome) = tokio::select! {
        joined = &mut task => joined?,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, stopping after the current epoch");
            cancel.cancel();
            task.await?
        }
    };
    let outcome = outcome?;

    // 5. Compare with the recorded pots
    let mut clean = 0usize;
    for result in &outcome.results {
        match calculator.provider().ada_pots(result.epoch)? {
            Some(recorded) => {
                let diff = compare_epoch(result, &ActualEpoch::from_pots(recorded), &pool_deposit);
                diff.report();
                if diff.is_clean() {
                    clean += 1;
                }
            }
            None => info!(epoch = result.epoch, "no recorded pots to compare"),
        }
        for failure in &result.pool_failures {
            warn!(epoch = result.epoch, pool_id = %failure.pool_id, kind = ?failure.kind, "pool failure");
        }
    }

    // 6. Persist the checkpoint
    if let Some(path) = config.checkpoint_path() {
        let json = serde_json::to_string_pretty(&outcome.checkpoint)?;
        std::fs::write(&path, json)?;
        info!(
            path = %path.display(),
            last_settled_epoch = outcome.checkpoint.last_settled_epoch,
            "checkpoint saved"
        );
    }

    info!(
        settled = outcome.results.len(),
        matching = clean,
        cancelled = outcome.cancelled,
        "adapot finished"
    );
    Ok(())
}

fn load_checkpoint(path: &Path) -> anyhow::Result<Option<Checkpoint>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}
