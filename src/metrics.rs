//! Execution counters for a pipeline.
//!
//! Every [`Pipeline`](crate::Pipeline) keeps a small set of atomic counters
//! that stages bump as they open, spawn workers, produce items and close.
//! [`Pipeline::metrics`](crate::Pipeline::metrics) returns a
//! [`MetricsSnapshot`] that can be printed, turned into JSON or saved to a file.
//!
//! # Example
//!
//! ```no_run
//! use ironstream::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let p = Pipeline::default();
//! let total = range(&p, 0, 1000).parallel().map(|x: i64| x * 2).sum()?;
//! assert_eq!(total, 999_000);
//!
//! let metrics = p.metrics();
//! metrics.print();
//! metrics.save_to_file("metrics.json")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every stage of one pipeline.
#[derive(Debug, Default)]
pub(crate) struct PipelineMetrics {
    stages_opened: AtomicU64,
    stages_closed: AtomicU64,
    workers_spawned: AtomicU64,
    workers_retired: AtomicU64,
    items_produced: AtomicU64,
    faults: AtomicU64,
}

impl PipelineMetrics {
    pub(crate) fn stage_opened(&self) {
        self.stages_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stage_closed(&self) {
        self.stages_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn worker_spawned(&self) {
        self.workers_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn worker_retired(&self) {
        self.workers_retired.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn item_produced(&self) {
        self.items_produced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            stages_opened: self.stages_opened.load(Ordering::Relaxed),
            stages_closed: self.stages_closed.load(Ordering::Relaxed),
            workers_spawned: self.workers_spawned.load(Ordering::Relaxed),
            workers_retired: self.workers_retired.load(Ordering::Relaxed),
            items_produced: self.items_produced.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a pipeline's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Stages created so far, sources included.
    pub stages_opened: u64,
    /// Stages whose every worker has exited.
    pub stages_closed: u64,
    pub workers_spawned: u64,
    pub workers_retired: u64,
    /// Items handed out by source stages.
    pub items_produced: u64,
    /// Failures recorded, panics included.
    pub faults: u64,
}

impl MetricsSnapshot {
    /// Stages that have been opened but not yet closed.
    #[must_use]
    pub fn open_stages(&self) -> u64 {
        self.stages_opened.saturating_sub(self.stages_closed)
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "stages_opened": self.stages_opened,
            "stages_closed": self.stages_closed,
            "workers_spawned": self.workers_spawned,
            "workers_retired": self.workers_retired,
            "items_produced": self.items_produced,
            "faults": self.faults,
        })
    }

    /// Print the counters to stdout in a human-readable format.
    pub fn print(&self) {
        println!("\n========== Pipeline Metrics ==========");
        println!("stages_opened: {}", self.stages_opened);
        println!("stages_closed: {}", self.stages_closed);
        println!("workers_spawned: {}", self.workers_spawned);
        println!("workers_retired: {}", self.workers_retired);
        println!("items_produced: {}", self.items_produced);
        println!("faults: {}", self.faults);
        println!("======================================\n");
    }

    /// Save the counters to a pretty-printed JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        file.write_all(formatted.as_bytes())?;
        Ok(())
    }
}
