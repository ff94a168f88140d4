use crate::link::OrderedItem;
use crate::stream::{Element, Stream};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

impl<T: Element> Stream<T> {
    /// Sort with `cmp`. The sort is stable with respect to encounter order.
    ///
    /// Nothing is pulled until the first request arrives; then the whole
    /// upstream is materialized, so this must not follow an unbounded stream.
    /// The result is a sequential stream numbered `0..n`.
    pub fn sorted_by<F>(self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let fan_out = self.workers;
        self.chain_single("sorted", move |w| {
            if !w.next_request() {
                return Ok(());
            }
            let mut items = w.drain(fan_out);
            if w.pipeline().is_aborted() {
                return Ok(());
            }
            items.par_sort_unstable_by_key(|item| item.seq);
            let mut values: Vec<T> = items.into_iter().map(|item| item.value).collect();
            values.par_sort_by(|a, b| cmp(a, b));

            let mut seq = 0u64;
            for value in values {
                if seq > 0 && !w.next_request() {
                    break;
                }
                if !w.emit(OrderedItem::new(seq, value)) {
                    break;
                }
                seq += 1;
            }
            Ok(())
        })
    }

    /// Sort by the natural order of `T`.
    pub fn sorted(self) -> Self
    where
        T: Ord,
    {
        self.sorted_by(Ord::cmp)
    }

    /// Drop repeated items, keeping the first occurrence to arrive.
    pub fn distinct(self) -> Self
    where
        T: Eq + Hash + Clone,
    {
        self.chain_single("distinct", |w| {
            let mut seen = HashSet::new();
            w.relay(|item| seen.insert(item.value.clone()).then_some(item))
        })
    }
}
