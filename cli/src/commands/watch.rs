use std::time::Duration;

use anyhow::Context;
use domov_common::config::Config;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::commands::search::run_once;
use crate::commands::{Filters, build_service};

/// Repeats the same search every `interval` seconds until `rounds` is reached
/// or the user interrupts. The service is shared across rounds, so plain
/// searches inside the staleness window come from the snapshot.
pub async fn watch(filters: Filters, interval: u64, rounds: Option<u32>, cfg: &Config) -> anyhow::Result<()> {
    let params = filters.to_params().context("invalid search filters")?;
    let service = build_service(cfg)?;

    let mut ticker = time::interval(Duration::from_secs(interval.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut round: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, stopping watch");
                break;
            }
        }

        round += 1;
        info!(round, "Starting watch round");
        run_once(&service, params.clone(), cfg).await?;

        if rounds.is_some_and(|max| round >= max) {
            break;
        }
    }

    Ok(())
}
