//! The collector contract used by [`Stream::collect_with`](crate::Stream::collect_with).
//!
//! A collector is four functions over an accumulator `A`:
//! - `supply` creates an empty accumulator (one per consumer thread),
//! - `accumulate` folds one item into it,
//! - `combine` merges two accumulators and must be associative,
//! - `finish` turns the merged accumulator into the result `R`.
//!
//! Accumulators are never shared between threads, so implementations need no
//! internal synchronization. Ready-made collectors live in
//! [`collectors`](crate::collectors).

/// Mutable reduction of `T` items into an `R` through an accumulator `A`.
pub trait Collector<T, A, R>: Send + Sync {
    fn supply(&self) -> A;
    fn accumulate(&self, acc: &mut A, item: T);
    fn combine(&self, left: A, right: A) -> A;
    fn finish(&self, acc: A) -> R;
}

/// A collector assembled from four closures. See [`collector_of`].
pub struct FnCollector<S, Acc, C, F> {
    supplier: S,
    accumulator: Acc,
    combiner: C,
    finisher: F,
}

impl<T, A, R, S, Acc, C, F> Collector<T, A, R> for FnCollector<S, Acc, C, F>
where
    S: Fn() -> A + Send + Sync,
    Acc: Fn(&mut A, T) + Send + Sync,
    C: Fn(A, A) -> A + Send + Sync,
    F: Fn(A) -> R + Send + Sync,
{
    fn supply(&self) -> A {
        (self.supplier)()
    }

    fn accumulate(&self, acc: &mut A, item: T) {
        (self.accumulator)(acc, item)
    }

    fn combine(&self, left: A, right: A) -> A {
        (self.combiner)(left, right)
    }

    fn finish(&self, acc: A) -> R {
        (self.finisher)(acc)
    }
}

/// Build a collector from a supplier, an accumulator, a combiner and a
/// finisher.
///
/// ```
/// use ironstream::*;
///
/// # fn main() -> anyhow::Result<()> {
/// let p = Pipeline::default();
/// let longest = collector_of(
///     String::new,
///     |acc: &mut String, s: String| {
///         if s.len() > acc.len() {
///             *acc = s;
///         }
///     },
///     |a: String, b: String| if b.len() > a.len() { b } else { a },
///     |s: String| s.len(),
/// );
/// let words = vec!["go".to_string(), "rust".to_string(), "c".to_string()];
/// assert_eq!(from_vec(&p, words).parallel().collect_with(longest)?, 4);
/// # Ok(())
/// # }
/// ```
pub fn collector_of<S, Acc, C, F>(
    supplier: S,
    accumulator: Acc,
    combiner: C,
    finisher: F,
) -> FnCollector<S, Acc, C, F> {
    FnCollector {
        supplier,
        accumulator,
        combiner,
        finisher,
    }
}
