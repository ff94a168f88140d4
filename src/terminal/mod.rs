//! Terminal operations.
//!
//! A terminal attaches one consumer thread per worker of the final stage,
//! lets each consumer fold its share of the items privately and combines the
//! partial results once every consumer is done. If a stage worker failed,
//! the pipeline's first fault is returned instead. A panic inside a terminal
//! closure aborts the pipeline and is then resumed on the calling thread.

mod matching;

use crate::collector::Collector;
use crate::link::{OrderedItem, Puller};
use crate::pipeline::Pipeline;
use crate::stage::Stage;
use crate::stream::{Element, Stream};
use anyhow::Result;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::ops::Add;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// One terminal consumer attached to the final stage.
pub(crate) struct Consumer<T> {
    pipeline: Pipeline,
    stage: Arc<Stage>,
    puller: Puller<T>,
}

impl<T> Consumer<T> {
    pub(crate) fn pull(&self) -> Option<OrderedItem<T>> {
        if self.pipeline.is_aborted() {
            return None;
        }
        self.puller.pull()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(|| self.pull()).map(|item| item.value)
    }
}

impl<T> Drop for Consumer<T> {
    fn drop(&mut self) {
        self.stage.release_consumer();
    }
}

impl<T: Element> Stream<T> {
    /// Run one consumer per seed and return their results.
    pub(crate) fn consume_seeded<A, S, F>(self, seeds: Vec<A>, work: F) -> Result<Vec<S>>
    where
        A: Send,
        S: Send,
        F: Fn(&Consumer<T>, A) -> S + Sync,
    {
        let Stream {
            pipeline,
            stage,
            puller,
            ..
        } = self;
        stage.attach_consumers(seeds.len());
        let consumers: Vec<Consumer<T>> = seeds
            .iter()
            .map(|_| Consumer {
                pipeline: pipeline.clone(),
                stage: Arc::clone(&stage),
                puller: puller.clone(),
            })
            .collect();
        drop(puller);

        let work = &work;
        let outcomes: Vec<thread::Result<S>> = thread::scope(|scope| {
            let handles: Vec<_> = consumers
                .into_iter()
                .zip(seeds)
                .map(|(consumer, seed)| {
                    scope.spawn(move || {
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&consumer, seed)));
                        if let Err(payload) = &outcome {
                            consumer.pipeline.fail_with_panic("terminal", &**payload);
                        }
                        outcome
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().and_then(|outcome| outcome))
                .collect()
        });

        let mut partials = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(partial) => partials.push(partial),
                Err(payload) => panic::resume_unwind(payload),
            }
        }
        if let Some(err) = pipeline.take_fault() {
            return Err(err);
        }
        Ok(partials)
    }

    /// One consumer per worker of the final stage, each starting from `()`.
    fn consume<S, F>(self, work: F) -> Result<Vec<S>>
    where
        S: Send,
        F: Fn(&Consumer<T>) -> S + Sync,
    {
        let n = self.workers;
        self.consume_seeded(vec![(); n], |c, ()| work(c))
    }

    /// Run `action` on every item. Items reach `action` concurrently when
    /// the stream is parallel.
    pub fn for_each<F>(self, action: F) -> Result<()>
    where
        F: Fn(T) + Sync,
    {
        self.consume(|c| c.values().for_each(&action))?;
        Ok(())
    }

    /// Fold with an identity and an associative operator.
    pub fn reduce<F>(self, identity: T, op: F) -> Result<T>
    where
        T: Clone,
        F: Fn(T, T) -> T + Sync,
    {
        let seeds = vec![identity.clone(); self.workers];
        let partials = self.consume_seeded(seeds, |c, acc| c.values().fold(acc, &op))?;
        Ok(partials.into_iter().reduce(&op).unwrap_or(identity))
    }

    /// Fold into a different type: `accumulator` folds items per consumer and
    /// `combiner` merges the partial results.
    pub fn reduce_with<U, A, C>(self, identity: U, accumulator: A, combiner: C) -> Result<U>
    where
        U: Clone + Send,
        A: Fn(U, T) -> U + Sync,
        C: Fn(U, U) -> U,
    {
        let seeds = vec![identity.clone(); self.workers];
        let partials = self.consume_seeded(seeds, |c, acc| c.values().fold(acc, &accumulator))?;
        Ok(partials.into_iter().reduce(combiner).unwrap_or(identity))
    }

    /// Fold without an identity. `None` for an empty stream.
    pub fn reduce_to_option<F>(self, op: F) -> Result<Option<T>>
    where
        F: Fn(T, T) -> T + Sync,
    {
        let partials = self.consume(|c| c.values().reduce(&op))?;
        Ok(partials.into_iter().flatten().reduce(&op))
    }

    pub fn count(self) -> Result<u64> {
        let partials = self.consume(|c| c.values().count() as u64)?;
        Ok(partials.into_iter().sum())
    }

    pub fn sum(self) -> Result<T>
    where
        T: Default + Add<Output = T>,
    {
        let seeds = (0..self.workers).map(|_| T::default()).collect();
        let partials = self.consume_seeded(seeds, |c, acc| c.values().fold(acc, |a, b| a + b))?;
        Ok(partials.into_iter().fold(T::default(), |a, b| a + b))
    }

    /// Smallest item by `cmp`; the earlier one wins a tie.
    pub fn min_by<F>(self, cmp: F) -> Result<Option<T>>
    where
        F: Fn(&T, &T) -> Ordering + Sync,
    {
        let pick = |cur: T, next: T| match cmp(&next, &cur) {
            Ordering::Less => next,
            _ => cur,
        };
        let partials = self.consume(|c| c.values().reduce(pick))?;
        Ok(partials.into_iter().flatten().reduce(pick))
    }

    /// Largest item by `cmp`; the earlier one wins a tie.
    pub fn max_by<F>(self, cmp: F) -> Result<Option<T>>
    where
        F: Fn(&T, &T) -> Ordering + Sync,
    {
        let pick = |cur: T, next: T| match cmp(&next, &cur) {
            Ordering::Greater => next,
            _ => cur,
        };
        let partials = self.consume(|c| c.values().reduce(pick))?;
        Ok(partials.into_iter().flatten().reduce(pick))
    }

    pub fn min(self) -> Result<Option<T>>
    where
        T: Ord,
    {
        self.min_by(Ord::cmp)
    }

    pub fn max(self) -> Result<Option<T>>
    where
        T: Ord,
    {
        self.max_by(Ord::cmp)
    }

    /// Mutable reduction: every consumer fills its own container from
    /// `supplier`, and the containers are merged with `combiner`.
    pub fn collect<A, S, Acc, C>(self, supplier: S, accumulator: Acc, combiner: C) -> Result<A>
    where
        A: Send,
        S: Fn() -> A,
        Acc: Fn(&mut A, T) + Sync,
        C: Fn(A, A) -> A,
    {
        let seeds: Vec<A> = (0..self.workers).map(|_| supplier()).collect();
        let partials = self.consume_seeded(seeds, |c, mut acc| {
            c.values().for_each(|v| accumulator(&mut acc, v));
            acc
        })?;
        Ok(partials
            .into_iter()
            .reduce(combiner)
            .unwrap_or_else(supplier))
    }

    /// Reduce with a [`Collector`] and apply its finisher.
    pub fn collect_with<A, R, C>(self, collector: C) -> Result<R>
    where
        A: Send,
        C: Collector<T, A, R>,
    {
        let acc = self.collect(
            || collector.supply(),
            |acc, v| collector.accumulate(acc, v),
            |a, b| collector.combine(a, b),
        )?;
        Ok(collector.finish(acc))
    }

    /// All items in encounter order, whatever the parallelism.
    pub fn to_vec(self) -> Result<Vec<T>> {
        let partials = self.consume(|c| std::iter::from_fn(|| c.pull()).collect::<Vec<_>>())?;
        let mut items: Vec<OrderedItem<T>> = partials.into_iter().flatten().collect();
        items.par_sort_unstable_by_key(|item| item.seq);
        Ok(items.into_iter().map(|item| item.value).collect())
    }
}
