//! shardcache demo workload
//!
//! Drives a read-through workload against the cache so its hit rate and
//! eviction behaviour can be observed from the logs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::task::JoinSet;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shardcache::{Cache, Config};

const WORKERS: usize = 8;
const REQUESTS_PER_WORKER: usize = 5_000;
const KEY_SPACE: usize = 20_000;
const LOADER_LATENCY: Duration = Duration::from_micros(200);

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache
/// 4. Run concurrent workers issuing read-through fetches
/// 5. Log the final statistics as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shardcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, ttl={}s",
        config.capacity, config.ttl_secs
    );

    let cache: Cache<Arc<str>> =
        Cache::from_config(&config).context("failed to build cache from configuration")?;

    let started = Instant::now();
    let mut workers = JoinSet::new();
    for worker in 0..WORKERS {
        let cache = cache.clone();
        workers.spawn(async move { run_worker(worker, cache).await });
    }
    while let Some(result) = workers.join_next().await {
        result.context("worker task panicked")??;
    }

    let stats = cache.stats();
    info!(
        "Workload finished in {:?}: {}",
        started.elapsed(),
        serde_json::to_string(&stats)?
    );
    Ok(())
}

/// Issues fetches over a skewed key space; hot keys repeat often.
async fn run_worker(worker: usize, cache: Cache<Arc<str>>) -> anyhow::Result<()> {
    let mut seed = (worker as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    for _ in 0..REQUESTS_PER_WORKER {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        // Squaring a uniform draw biases it towards zero
        let uniform = (seed % KEY_SPACE as u64) as usize;
        let key = format!("user:{}", uniform * uniform / KEY_SPACE);

        cache.fetch_async(&key, load_user).await?;
    }
    debug!(worker, "Worker done");
    Ok(())
}

/// Stands in for a slow backing store.
async fn load_user(key: String) -> anyhow::Result<Option<Arc<str>>> {
    tokio::time::sleep(LOADER_LATENCY).await;
    Ok(Some(Arc::from(format!("profile for {}", key))))
}
