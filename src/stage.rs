//! Stage engine: worker threads, the one-time close and consumer attachment.
//!
//! A stage owns the downstream side of one link and runs one or more worker
//! threads. Every worker holds its own clone of the upstream puller and of the
//! downstream responder, so a link closes when the last worker holding it
//! retires. The stage itself only tracks how many workers and terminal
//! consumers are still attached and closes exactly once.

use crate::link::{OrderedItem, Puller, Responder, Tripwire, link};
use crate::pipeline::Pipeline;
use anyhow::{Result, anyhow};
use crossbeam_channel::select;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tracing::debug;

pub(crate) struct Stage {
    name: &'static str,
    id: u64,
    pipeline: Pipeline,
    state: Mutex<CloseState>,
    winding_down: Tripwire,
}

#[derive(Debug)]
struct CloseState {
    closed: bool,
    remaining_workers: usize,
    terminal_waiters: usize,
}

impl Stage {
    fn open(pipeline: &Pipeline, name: &'static str, workers: usize) -> Arc<Self> {
        let id = pipeline.next_stage_id();
        pipeline.counters().stage_opened();
        debug!(stage = name, id, workers, "stage opened");
        Arc::new(Self {
            name,
            id,
            pipeline: pipeline.clone(),
            state: Mutex::new(CloseState {
                closed: false,
                remaining_workers: workers,
                terminal_waiters: 0,
            }),
            winding_down: Tripwire::new(),
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CloseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the stage closed. Returns `true` for the call that closed it.
    fn close(&self, state: &mut CloseState, initiator: &'static str) -> bool {
        if state.closed {
            return false;
        }
        state.closed = true;
        self.pipeline.counters().stage_closed();
        debug!(stage = self.name, id = self.id, initiator, "stage closed");
        true
    }

    /// Retire one worker. The last one out closes the stage before its data
    /// sender is released, then keeps the request intake drained.
    fn retire<O: Send + 'static>(&self, responder: Responder<O>) {
        let mut state = self.lock();
        state.remaining_workers = state.remaining_workers.saturating_sub(1);
        self.pipeline.counters().worker_retired();
        if state.remaining_workers > 0 {
            drop(responder);
            return;
        }
        let closed_here = self.close(&mut state, "workers");
        let intake = responder.into_intake();
        drop(state);
        if closed_here {
            let drain = thread::Builder::new()
                .name(format!("ironstream-{}-drain", self.name))
                .spawn(move || for _ in intake.iter() {});
            if let Err(err) = drain {
                debug!(stage = self.name, error = %err, "request drain not started");
            }
        }
    }

    /// Register `n` terminal consumers reading from this stage.
    pub(crate) fn attach_consumers(&self, n: usize) {
        self.lock().terminal_waiters += n;
    }

    /// Detach one terminal consumer. When the last one leaves the stage is
    /// closed from the consumer side and its workers wind down.
    pub(crate) fn release_consumer(&self) {
        let mut state = self.lock();
        state.terminal_waiters = state.terminal_waiters.saturating_sub(1);
        if state.terminal_waiters == 0 {
            self.close(&mut state, "consumers");
            drop(state);
            self.winding_down.trip();
        }
    }
}

/// Handle a worker body gets to its stage: the upstream it reads from and the
/// responder it answers downstream requests with.
pub(crate) struct Worker<U, O> {
    stage: Arc<Stage>,
    index: usize,
    upstream: U,
    responder: Responder<O>,
}

impl<U, O> Worker<U, O> {
    pub(crate) fn pipeline(&self) -> &Pipeline {
        &self.stage.pipeline
    }

    pub(crate) fn upstream(&self) -> &U {
        &self.upstream
    }

    pub(crate) fn upstream_mut(&mut self) -> &mut U {
        &mut self.upstream
    }

    /// Wait for the next downstream request.
    ///
    /// Returns `false` when the consumers are gone, a sibling worker has
    /// retired or the pipeline was aborted.
    pub(crate) fn next_request(&self) -> bool {
        let pipeline = &self.stage.pipeline;
        if pipeline.is_aborted() {
            return false;
        }
        select! {
            recv(self.responder.requests()) -> req => req.is_ok(),
            recv(self.stage.winding_down.receiver()) -> _ => false,
            recv(pipeline.abort_receiver()) -> _ => false,
        }
    }

    /// Answer the current request. Returns `false` when nobody listens anymore.
    pub(crate) fn emit(&self, item: OrderedItem<O>) -> bool {
        self.responder.respond(item)
    }

    /// Pull from a link other than the stage's own upstream.
    pub(crate) fn pull_from<T>(&self, puller: &Puller<T>) -> Option<OrderedItem<T>> {
        if self.stage.pipeline.is_aborted() {
            return None;
        }
        puller.pull()
    }

    /// The fault of `other` if it is a different pipeline that has failed.
    /// Streams built on another pipeline end quietly when it aborts, so
    /// stages reading from them must check explicitly.
    pub(crate) fn foreign_fault(&self, other: &Pipeline) -> Option<anyhow::Error> {
        if other.ptr_eq(&self.stage.pipeline) {
            return None;
        }
        other.take_fault()
    }

    fn finish(self)
    where
        O: Send + 'static,
    {
        let Worker {
            stage,
            index,
            upstream,
            responder,
        } = self;
        drop(upstream);
        stage.winding_down.trip();
        debug!(stage = stage.name, worker = index, "worker retired");
        stage.retire(responder);
    }
}

impl<I, O> Worker<Puller<I>, O> {
    pub(crate) fn pull(&self) -> Option<OrderedItem<I>> {
        self.pull_from(&self.upstream)
    }

    /// Serve requests one upstream item at a time. `step` returning `None`
    /// drops the item and pulls again.
    pub(crate) fn relay(
        &self,
        mut step: impl FnMut(OrderedItem<I>) -> Option<OrderedItem<O>>,
    ) -> Result<()> {
        while self.next_request() {
            let out = loop {
                let Some(item) = self.pull() else {
                    return Ok(());
                };
                if let Some(out) = step(item) {
                    break out;
                }
            };
            if !self.emit(out) {
                break;
            }
        }
        Ok(())
    }
}

impl<I: Send, O: Send> Worker<Puller<I>, O> {
    /// Pull the upstream dry with `fan_out` concurrent pullers and return
    /// every item in arrival order per puller.
    pub(crate) fn drain(&self, fan_out: usize) -> Vec<OrderedItem<I>> {
        let pull_all = move || std::iter::from_fn(|| self.pull()).collect::<Vec<_>>();
        if fan_out <= 1 {
            return pull_all();
        }
        thread::scope(|scope| {
            let handles: Vec<_> = (0..fan_out).map(|_| scope.spawn(pull_all)).collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_default())
                .collect()
        })
    }
}

/// Start a stage of `workers` replicas of `body`, each reading from its own
/// clone of `upstream`.
pub(crate) fn spawn_stage<U, O, F>(
    pipeline: &Pipeline,
    name: &'static str,
    workers: usize,
    upstream: U,
    body: F,
) -> (Arc<Stage>, Puller<O>)
where
    U: Clone + Send + 'static,
    O: Send + 'static,
    F: Fn(&mut Worker<U, O>) -> Result<()> + Send + Sync + 'static,
{
    let workers = workers.max(1);
    let stage = Stage::open(pipeline, name, workers);
    let (puller, responder) = link(pipeline.link_capacity(workers));
    let body = Arc::new(body);
    for index in 0..workers {
        let body = Arc::clone(&body);
        launch(
            &stage,
            index,
            upstream.clone(),
            responder.clone(),
            move |w: &mut Worker<U, O>| body(w),
        );
    }
    (stage, puller)
}

/// Start a single-worker stage that takes ownership of `upstream`.
pub(crate) fn spawn_single<U, O, F>(
    pipeline: &Pipeline,
    name: &'static str,
    upstream: U,
    body: F,
) -> (Arc<Stage>, Puller<O>)
where
    U: Send + 'static,
    O: Send + 'static,
    F: FnOnce(&mut Worker<U, O>) -> Result<()> + Send + 'static,
{
    let stage = Stage::open(pipeline, name, 1);
    let (puller, responder) = link(pipeline.link_capacity(1));
    launch(&stage, 0, upstream, responder, body);
    (stage, puller)
}

fn launch<U, O, F>(stage: &Arc<Stage>, index: usize, upstream: U, responder: Responder<O>, body: F)
where
    U: Send + 'static,
    O: Send + 'static,
    F: FnOnce(&mut Worker<U, O>) -> Result<()> + Send + 'static,
{
    let spare = responder.clone();
    let worker_stage = Arc::clone(stage);
    let spawned = thread::Builder::new()
        .name(format!("ironstream-{}-{index}", stage.name))
        .spawn(move || {
            worker_stage.pipeline.counters().worker_spawned();
            let mut worker = Worker {
                stage: worker_stage,
                index,
                upstream,
                responder,
            };
            match panic::catch_unwind(AssertUnwindSafe(|| body(&mut worker))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    let name = worker.stage.name;
                    worker
                        .stage
                        .pipeline
                        .fail(err.context(format!("stage `{name}` failed")));
                }
                Err(payload) => {
                    let name = worker.stage.name;
                    worker.stage.pipeline.fail_with_panic(name, &*payload);
                }
            }
            worker.finish();
        });
    match spawned {
        Ok(_) => drop(spare),
        Err(err) => {
            stage
                .pipeline
                .fail(anyhow!(err).context(format!("spawning worker for stage `{}`", stage.name)));
            stage.retire(spare);
        }
    }
}
