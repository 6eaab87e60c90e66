use chrono::Utc;
use tokio::time::{self, Duration};
use tracing::info;

use crate::{dao::AppendStore, error::Error, provider::ListingsSource};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub attempts: u32,
    pub stored: u32,
    pub skipped: u32,
}

/// One fetch followed by a store when the fetch produced data.
///
/// Returns `false` when the cycle was skipped.
pub async fn fetch_store<S: ListingsSource>(
    source: &S,
    store: &mut AppendStore,
) -> Result<bool, Error> {
    match source.fetch().await? {
        Some(data) if !data.is_empty() => {
            store.store(&data)?;
            Ok(true)
        },
        _ => Ok(false),
    }
}

/// Fetches and stores `run_count` times, sleeping `interval_seconds` after
/// every run, the last one included. Skipped cycles do not stop the loop.
pub async fn run<S: ListingsSource>(
    source: &S,
    store: &mut AppendStore,
    interval_seconds: u64,
    run_count: u32,
) -> Result<PollSummary, Error> {
    let mut summary = PollSummary::default();
    let interval = Duration::from_secs(interval_seconds);

    for run in 1..=run_count {
        info!("Run {}/{}: Pulling data at {}", run, run_count, Utc::now());

        summary.attempts += 1;
        if fetch_store(source, store).await? {
            summary.stored += 1;
        } else {
            summary.skipped += 1;
        }

        info!(
            "Run {} completed. Sleeping for {} seconds...",
            run, interval_seconds
        );
        time::sleep(interval).await;
    }

    Ok(summary)
}
