//! # ironstream
//!
//! Lazily evaluated, pull-driven **stream pipelines** with bounded internal
//! parallelism. Build a chain of operators (`filter`, `map`, `sorted`,
//! `limit`, ...) on a source, finish it with a terminal operation (`to_vec`,
//! `reduce`, `collect_with`, ...) and the stages run on their own threads,
//! sequentially or fanned out, while encounter order can always be
//! reconstructed.
//!
//! ## Key Features
//!
//! - **Lazy** - nothing is produced until a terminal operation asks for it,
//!   and a source produces one item per downstream request
//! - **Parallel on demand** - [`Stream::parallel`] fans a stage out to the
//!   pipeline's configured parallelism
//! - **Order recovery** - every item carries its encounter position, so
//!   [`Stream::to_vec`] and [`Stream::sorted`] give deterministic results
//! - **Collectors** - grouping, partitioning, joining, statistics and more
//!   in [`collectors`]
//! - **Abort-all failures** - a panicking closure or failing producer stops
//!   every stage and the terminal returns the error
//!
//! ## Quick Start
//!
//! ```
//! use ironstream::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let p = Pipeline::default();
//!
//! let squares = range(&p, 0u64, 1_000)
//!     .parallel()
//!     .filter(|x: &u64| x % 3 == 0)
//!     .map(|x: u64| x * x)
//!     .to_vec()?;
//!
//! assert_eq!(squares[..3], [0, 9, 36]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Pipeline
//!
//! A [`Pipeline`] owns the configuration ([`PipelineConfig`]), the metrics
//! counters and the fault state shared by every stage built on it. Create
//! one with `Pipeline::default()` and pass it to a source.
//!
//! ### Stream
//!
//! A [`Stream<T>`] is a handle to the last stage of a chain. Operators
//! consume the handle and return a new one, so a stream is used exactly
//! once. Dropping a stream without a terminal operation releases its stages.
//!
//! ### Pull links
//!
//! Adjacent stages talk through a request/response handshake: the consumer
//! sends one request, the producer answers with one [`OrderedItem`] or
//! closes. A producer can never run ahead of its consumers.
//!
//! ### Parallelism and order
//!
//! Sources are sequential. After [`parallel`](Stream::parallel), per-item
//! operators run one replica per worker and items arrive in any order.
//! `limit` and `skip` need a single ordered producer: call
//! [`unordered`](Stream::unordered) first to apply them to arrival order.
//!
//! ## Module Organization
//!
//! - [`pipeline`] - pipeline handle and configuration
//! - [`source`] - source functions and the [`Producer`] trait
//! - [`collector`] / [`collectors`] - the collector contract and a library of
//!   collectors
//! - [`metrics`] - execution counters
//! - [`testing`] - helpers for testing pipelines

pub mod collector;
pub mod collectors;
mod link;
pub mod metrics;
mod ops;
pub mod pipeline;
pub mod source;
mod stage;
mod stream;
mod terminal;
pub mod testing;

pub use collector::{Collector, FnCollector, collector_of};
pub use link::OrderedItem;
pub use metrics::MetricsSnapshot;
pub use pipeline::{Pipeline, PipelineConfig};
pub use source::{
    Producer, StreamBuilder, concat, empty, file_lines, from_iter, from_producer, from_vec,
    generate, iterate, iterate_while, range, range_closed,
};
pub use stream::{Element, Stream};
