//! Background table loading.
//!
//! A load runs on tokio's blocking pool and reports back once through a
//! oneshot channel. There is no cancellation.

use anyhow::{Context, Result};
use sift_sheet::{LoadError, LoadOptions, Table};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// A load that has been started and not yet collected
#[derive(Debug)]
pub struct PendingLoad {
    path: PathBuf,
    receiver: oneshot::Receiver<Result<Table, LoadError>>,
}

/// Start loading `path` on the blocking pool
pub fn spawn_load(path: PathBuf, options: LoadOptions) -> PendingLoad {
    let (sender, receiver) = oneshot::channel();
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || {
        let result = Table::load(&task_path, &options);
        if sender.send(result).is_err() {
            debug!("Load of {} finished after the caller went away", task_path.display());
        }
    });
    PendingLoad { path, receiver }
}

impl PendingLoad {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the load to finish
    pub async fn wait(self) -> Result<Table> {
        finish(&self.path, self.receiver.await)
    }

    /// Wait for the load, calling `on_tick` every `period` until it finishes
    pub async fn wait_with_progress<F>(self, period: Duration, mut on_tick: F) -> Result<Table>
    where
        F: FnMut(u64),
    {
        let PendingLoad { path, mut receiver } = self;
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately
        ticker.tick().await;
        let mut ticks = 0;

        loop {
            tokio::select! {
                result = &mut receiver => return finish(&path, result),
                _ = ticker.tick() => {
                    ticks += 1;
                    on_tick(ticks);
                }
            }
        }
    }
}

fn finish(
    path: &Path,
    received: Result<Result<Table, LoadError>, oneshot::error::RecvError>,
) -> Result<Table> {
    let table = received
        .context("Loader stopped before reporting a result")?
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(table)
}
