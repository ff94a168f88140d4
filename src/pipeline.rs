//! Pipeline handle, configuration and fault domain.
//!
//! Every stream is attached to a [`Pipeline`]. The pipeline carries the
//! configured parallelism, the metrics counters and the abort signal shared by
//! all stages built on it. A failure in any worker aborts the whole pipeline:
//! every stage winds down and the terminal operation returns the first fault.

use crate::link::Tripwire;
use crate::metrics::{MetricsSnapshot, PipelineMetrics};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Execution settings for a [`Pipeline`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of workers a stage fans out to on [`parallel`](crate::Stream::parallel).
    pub parallelism: usize,
    /// Channel capacity of each pull link. `None` sizes links by the
    /// parallelism of the stage that owns them.
    #[serde(default)]
    pub link_capacity: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallelism: num_cpus::get().max(1),
            link_capacity: None,
        }
    }
}

/// Shared handle to a pipeline. Cloning is cheap.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    config: PipelineConfig,
    next_stage_id: AtomicU64,
    fault: Mutex<FaultSlot>,
    abort: Tripwire,
    metrics: PipelineMetrics,
}

#[derive(Default)]
struct FaultSlot {
    first: Option<anyhow::Error>,
    reported: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.inner.config)
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let config = PipelineConfig {
            parallelism: config.parallelism.max(1),
            ..config
        };
        Self {
            inner: Arc::new(PipelineInner {
                config,
                next_stage_id: AtomicU64::new(0),
                fault: Mutex::new(FaultSlot::default()),
                abort: Tripwire::new(),
                metrics: PipelineMetrics::default(),
            }),
        }
    }

    /// Pipeline with the default configuration and a fixed parallelism.
    pub fn with_parallelism(parallelism: usize) -> Self {
        Self::new(PipelineConfig {
            parallelism,
            ..PipelineConfig::default()
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    pub fn parallelism(&self) -> usize {
        self.inner.config.parallelism
    }

    /// Snapshot of the execution counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// `true` when both handles refer to the same pipeline.
    pub fn ptr_eq(&self, other: &Pipeline) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// `true` once any worker of this pipeline has failed.
    pub fn is_aborted(&self) -> bool {
        self.inner.abort.is_tripped()
    }

    pub(crate) fn link_capacity(&self, workers: usize) -> usize {
        self.inner.config.link_capacity.unwrap_or(workers).max(1)
    }

    pub(crate) fn next_stage_id(&self) -> u64 {
        self.inner.next_stage_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn counters(&self) -> &PipelineMetrics {
        &self.inner.metrics
    }

    pub(crate) fn abort_receiver(&self) -> &crossbeam_channel::Receiver<()> {
        self.inner.abort.receiver()
    }

    /// Record a fault and abort every stage of the pipeline. Only the first
    /// fault is kept.
    pub(crate) fn fail(&self, err: anyhow::Error) {
        self.inner.metrics.fault();
        {
            let mut slot = self.inner.fault.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.first.is_none() && !slot.reported {
                warn!(error = %format!("{err:#}"), "pipeline aborted");
                slot.first = Some(err);
            }
        }
        self.inner.abort.trip();
    }

    pub(crate) fn fail_with_panic(&self, stage: &str, payload: &(dyn Any + Send)) {
        self.fail(panic_error(stage, payload));
    }

    /// The recorded fault, if the pipeline was aborted.
    ///
    /// The recorded error is handed out once; later callers get a generic
    /// "aborted" error.
    pub(crate) fn take_fault(&self) -> Option<anyhow::Error> {
        if !self.is_aborted() {
            return None;
        }
        let mut slot = self.inner.fault.lock().unwrap_or_else(PoisonError::into_inner);
        slot.reported = true;
        Some(
            slot.first
                .take()
                .unwrap_or_else(|| anyhow!("pipeline was aborted by an earlier failure")),
        )
    }
}

fn panic_error(stage: &str, payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    anyhow!("worker in stage `{stage}` panicked: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallelism_is_at_least_one() {
        assert_eq!(Pipeline::with_parallelism(0).parallelism(), 1);
        assert!(Pipeline::default().parallelism() >= 1);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config: PipelineConfig = serde_json::from_str(r#"{"parallelism": 3}"#).unwrap();
        assert_eq!(config.parallelism, 3);
        assert_eq!(config.link_capacity, None);
    }

    #[test]
    fn first_fault_wins() {
        let p = Pipeline::with_parallelism(2);
        assert!(p.take_fault().is_none());
        p.fail(anyhow!("first"));
        p.fail(anyhow!("second"));
        assert!(p.is_aborted());
        assert_eq!(p.take_fault().unwrap().to_string(), "first");
        assert!(p.take_fault().unwrap().to_string().contains("aborted"));
    }

    #[test]
    fn panic_payloads_are_described() {
        let err = panic_error("map", &"boom");
        assert_eq!(err.to_string(), "worker in stage `map` panicked: boom");
    }
}
