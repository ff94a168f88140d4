//! Source stages.
//!
//! Every source is a single worker driving a [`Producer`]: one `produce`
//! call per downstream request, numbered from 0. Sources are sequential and
//! ordered, except [`generate`] which has no meaningful encounter order.

mod builder;
mod lines;
mod producer;

pub use builder::StreamBuilder;
pub use lines::FileLines;
pub use producer::{Generate, IterProducer, Iterate, IterateWhile, Producer};

use crate::link::{OrderedItem, Puller};
use crate::pipeline::Pipeline;
use crate::stage::{Worker, spawn_single};
use crate::stream::{Element, Stream};
use anyhow::Result;
use std::ops::{Range, RangeInclusive};
use std::path::Path;

/// Open a source over any [`Producer`].
pub fn from_producer<T, P>(p: &Pipeline, producer: P) -> Stream<T>
where
    T: Element,
    P: Producer<T>,
{
    Stream::from_stage(p, open_source(p, producer), true)
}

fn open_source<T, P>(p: &Pipeline, producer: P) -> (std::sync::Arc<crate::stage::Stage>, Puller<T>)
where
    T: Element,
    P: Producer<T>,
{
    spawn_single(p, "source", producer, |w: &mut Worker<P, T>| {
        let mut seq = 0u64;
        while w.next_request() {
            let Some(value) = w.upstream_mut().produce()? else {
                break;
            };
            w.pipeline().counters().item_produced();
            if !w.emit(OrderedItem::new(seq, value)) {
                break;
            }
            seq += 1;
        }
        Ok(())
    })
}

pub fn from_iter<I>(p: &Pipeline, iter: I) -> Stream<I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Element,
{
    from_producer(p, IterProducer(iter.into_iter()))
}

/// Source over the elements of a vector.
pub fn from_vec<T: Element>(p: &Pipeline, data: Vec<T>) -> Stream<T> {
    from_iter(p, data)
}

pub fn empty<T: Element>(p: &Pipeline) -> Stream<T> {
    from_iter(p, std::iter::empty())
}

/// Infinite, unordered source calling `supplier` for every item.
pub fn generate<T, F>(p: &Pipeline, supplier: F) -> Stream<T>
where
    T: Element,
    F: FnMut() -> T + Send + 'static,
{
    Stream::from_stage(p, open_source(p, Generate(supplier)), false)
}

/// Infinite source `seed, step(seed), step(step(seed)), ...`
pub fn iterate<T, F>(p: &Pipeline, seed: T, step: F) -> Stream<T>
where
    T: Element,
    F: FnMut(&T) -> T + Send + 'static,
{
    from_producer(p, Iterate::new(seed, step))
}

/// Like [`iterate`], ending before the first value failing `has_next`.
pub fn iterate_while<T, P, F>(p: &Pipeline, seed: T, has_next: P, step: F) -> Stream<T>
where
    T: Element,
    P: FnMut(&T) -> bool + Send + 'static,
    F: FnMut(&T) -> T + Send + 'static,
{
    from_producer(p, IterateWhile::new(seed, has_next, step))
}

/// `start..end`
pub fn range<T>(p: &Pipeline, start: T, end: T) -> Stream<T>
where
    T: Element,
    Range<T>: Iterator<Item = T> + Send,
{
    from_iter(p, start..end)
}

/// `start..=end`
pub fn range_closed<T>(p: &Pipeline, start: T, end: T) -> Stream<T>
where
    T: Element,
    RangeInclusive<T>: Iterator<Item = T> + Send,
{
    from_iter(p, start..=end)
}

/// Lines of a text file, read lazily.
///
/// # Errors
///
/// Fails if the file cannot be opened. Read errors later on abort the
/// pipeline and surface from the terminal operation.
pub fn file_lines(p: &Pipeline, path: impl AsRef<Path>) -> Result<Stream<String>> {
    Ok(from_producer(p, FileLines::open(path)?))
}

/// All items of `first` followed by all items of `second`.
///
/// Sequence numbers of `second` are shifted past the largest one `first`
/// produced. The result lives on `first`'s pipeline; if `second` belongs to
/// another pipeline and fails, the failure is carried over.
pub fn concat<T: Element>(first: Stream<T>, second: Stream<T>) -> Stream<T> {
    let ordered = first.ordered && second.ordered;
    let pipeline = first.pipeline.clone();
    let second_pipeline = second.pipeline.clone();
    let upstream = (first.into_puller(), second.into_puller());
    let stage = spawn_single(
        &pipeline,
        "concat",
        upstream,
        move |w: &mut Worker<(Puller<T>, Puller<T>), T>| {
            let mut first_done = false;
            let mut offset = 0u64;
            while w.next_request() {
                let (a, b) = w.upstream();
                let item = loop {
                    if first_done {
                        break w
                            .pull_from(b)
                            .map(|item| OrderedItem::new(offset + item.seq, item.value));
                    }
                    match w.pull_from(a) {
                        Some(item) => {
                            offset = offset.max(item.seq + 1);
                            break Some(item);
                        }
                        None => first_done = true,
                    }
                };
                let Some(item) = item else {
                    if let Some(err) = w.foreign_fault(&second_pipeline) {
                        return Err(err.context("second stream of concat failed"));
                    }
                    break;
                };
                if !w.emit(item) {
                    break;
                }
            }
            Ok(())
        },
    );
    Stream::from_stage(&pipeline, stage, ordered)
}
