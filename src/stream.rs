use crate::link::Puller;
use crate::pipeline::Pipeline;
use crate::stage::{Stage, Worker, spawn_single, spawn_stage};
use anyhow::Result;
use std::fmt;
use std::sync::Arc;

/// Bound every stream element satisfies: it must be able to cross threads.
pub trait Element: 'static + Send {}
impl<T> Element for T where T: 'static + Send {}

/// A lazily evaluated sequence of `T` attached to a [`Pipeline`].
///
/// Operators consume the handle and return a new one, so a stream can be
/// used exactly once. Nothing is pulled until a terminal operation runs;
/// dropping a stream without running one releases every stage behind it.
pub struct Stream<T> {
    pub(crate) pipeline: Pipeline,
    pub(crate) stage: Arc<Stage>,
    pub(crate) puller: Puller<T>,
    pub(crate) workers: usize,
    pub(crate) parallel: bool,
    pub(crate) ordered: bool,
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("stage", &self.stage.name())
            .field("workers", &self.workers)
            .field("parallel", &self.parallel)
            .field("ordered", &self.ordered)
            .finish()
    }
}

impl<T: Element> Stream<T> {
    pub(crate) fn from_stage(
        pipeline: &Pipeline,
        (stage, puller): (Arc<Stage>, Puller<T>),
        ordered: bool,
    ) -> Self {
        Self {
            pipeline: pipeline.clone(),
            stage,
            puller,
            workers: 1,
            parallel: false,
            ordered,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Number of workers feeding this stream.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// `true` while the stream promises encounter order to positional
    /// operators such as [`limit`](Stream::limit).
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Give up the encounter-order promise. `limit` and `skip` then accept a
    /// parallel upstream and act on arrival order.
    pub fn unordered(mut self) -> Self {
        self.ordered = false;
        self
    }

    pub(crate) fn into_puller(self) -> Puller<T> {
        self.puller
    }

    /// Append a stage with one replica of `body` per upstream worker.
    pub(crate) fn chain<O, F>(self, name: &'static str, body: F) -> Stream<O>
    where
        O: Element,
        F: Fn(&mut Worker<Puller<T>, O>) -> Result<()> + Send + Sync + 'static,
    {
        let (workers, parallel) = (self.workers, self.parallel);
        self.chain_with(name, workers, parallel, body)
    }

    pub(crate) fn chain_with<O, F>(
        self,
        name: &'static str,
        workers: usize,
        parallel: bool,
        body: F,
    ) -> Stream<O>
    where
        O: Element,
        F: Fn(&mut Worker<Puller<T>, O>) -> Result<()> + Send + Sync + 'static,
    {
        let Stream {
            pipeline,
            puller,
            ordered,
            ..
        } = self;
        let (stage, puller) = spawn_stage(&pipeline, name, workers, puller, body);
        Stream {
            pipeline,
            stage,
            puller,
            workers,
            parallel,
            ordered,
        }
    }

    /// Append a single-worker stage. The result is sequential.
    pub(crate) fn chain_single<O, F>(self, name: &'static str, body: F) -> Stream<O>
    where
        O: Element,
        F: FnOnce(&mut Worker<Puller<T>, O>) -> Result<()> + Send + 'static,
    {
        let Stream {
            pipeline,
            puller,
            ordered,
            ..
        } = self;
        let stage = spawn_single(&pipeline, name, puller, body);
        Stream::from_stage(&pipeline, stage, ordered)
    }
}
