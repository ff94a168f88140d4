//! Ready-made [`Collector`](crate::Collector)s for
//! [`Stream::collect_with`](crate::Stream::collect_with).
//!
//! - containers: [`to_vec`], [`to_set`], [`to_map`], [`to_unique_map`]
//! - strings: [`joining`]
//! - arithmetic: [`counting`], [`summing`], [`averaging_i64`],
//!   [`averaging_f64`], [`summarizing`]
//! - reductions: [`reducing`], [`reducing_to_option`], [`min_by`], [`max_by`]
//! - adapters: [`mapping`], [`flat_mapping`], [`filtering`]
//! - grouping: [`grouping_by`], [`grouping_by_to_vec`], [`partitioning_by`],
//!   [`partitioning_by_to_vec`]
//!
//! Adapters and grouping collectors wrap a downstream collector, so they
//! compose:
//!
//! ```
//! use ironstream::*;
//! use ironstream::collectors::{counting, grouping_by};
//!
//! # fn main() -> anyhow::Result<()> {
//! let p = Pipeline::default();
//! let words = vec!["a", "bb", "cc", "ddd"];
//! let by_len = from_vec(&p, words)
//!     .parallel()
//!     .collect_with(grouping_by(|w: &&str| w.len(), counting()))?;
//! assert_eq!(by_len[&2], 2);
//! # Ok(())
//! # }
//! ```

mod basic;
mod composite;
mod statistical;

pub use basic::{
    Counting, Joining, Reducing, ReducingToOption, Summing, ToSet, ToVec, counting, joining,
    max_by, min_by, reducing, reducing_to_option, summing, to_set, to_vec,
};
pub use composite::{
    Filtering, FlatMapping, GroupingBy, Mapping, PartitioningBy, ToMap, ToUniqueMap, filtering,
    flat_mapping, grouping_by, grouping_by_to_vec, mapping, partitioning_by,
    partitioning_by_to_vec, to_map, to_unique_map,
};
pub use statistical::{
    AverageAccumulator, AveragingF64, AveragingI64, Summarizing, SummaryStatistics,
    averaging_f64, averaging_i64, summarizing,
};
