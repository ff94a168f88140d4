//! Basic collectors: containers, joining, counting, summing, reductions.

use crate::collector::Collector;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::ops::AddAssign;

/* ===================== ToVec ===================== */

/// Collect items into a `Vec`.
///
/// Within one consumer items keep their arrival order; on a parallel stream
/// partial vectors are appended in consumer order, so use
/// [`Stream::to_vec`](crate::Stream::to_vec) when encounter order matters.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToVec;

impl<T: Send> Collector<T, Vec<T>, Vec<T>> for ToVec {
    fn supply(&self) -> Vec<T> {
        Vec::new()
    }

    fn accumulate(&self, acc: &mut Vec<T>, item: T) {
        acc.push(item);
    }

    fn combine(&self, mut left: Vec<T>, right: Vec<T>) -> Vec<T> {
        left.extend(right);
        left
    }

    fn finish(&self, acc: Vec<T>) -> Vec<T> {
        acc
    }
}

pub fn to_vec() -> ToVec {
    ToVec
}

/* ===================== ToSet ===================== */

#[derive(Clone, Copy, Debug, Default)]
pub struct ToSet;

impl<T: Eq + Hash> Collector<T, HashSet<T>, HashSet<T>> for ToSet {
    fn supply(&self) -> HashSet<T> {
        HashSet::new()
    }

    fn accumulate(&self, acc: &mut HashSet<T>, item: T) {
        acc.insert(item);
    }

    fn combine(&self, mut left: HashSet<T>, right: HashSet<T>) -> HashSet<T> {
        left.extend(right);
        left
    }

    fn finish(&self, acc: HashSet<T>) -> HashSet<T> {
        acc
    }
}

/// Collect items into a `HashSet`.
pub fn to_set() -> ToSet {
    ToSet
}

/* ===================== Joining ===================== */

/// Concatenate string-like items with a separator.
///
/// - Accumulator: `Vec<String>`
/// - Output: `String`
#[derive(Clone, Debug)]
pub struct Joining {
    separator: String,
}

impl<T: AsRef<str>> Collector<T, Vec<String>, String> for Joining {
    fn supply(&self) -> Vec<String> {
        Vec::new()
    }

    fn accumulate(&self, acc: &mut Vec<String>, item: T) {
        acc.push(item.as_ref().to_owned());
    }

    fn combine(&self, mut left: Vec<String>, right: Vec<String>) -> Vec<String> {
        left.extend(right);
        left
    }

    fn finish(&self, acc: Vec<String>) -> String {
        acc.join(&self.separator)
    }
}

pub fn joining(separator: impl Into<String>) -> Joining {
    Joining {
        separator: separator.into(),
    }
}

/* ===================== Counting ===================== */

/// Number of items.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counting;

impl<T> Collector<T, u64, u64> for Counting {
    fn supply(&self) -> u64 {
        0
    }

    fn accumulate(&self, acc: &mut u64, _item: T) {
        *acc += 1;
    }

    fn combine(&self, left: u64, right: u64) -> u64 {
        left + right
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}

pub fn counting() -> Counting {
    Counting
}

/* ===================== Summing ===================== */

/// Sum of a numeric projection of each item. `N::default()` when empty.
#[derive(Clone, Copy, Debug)]
pub struct Summing<F>(F);

impl<T, N, F> Collector<T, N, N> for Summing<F>
where
    N: Default + AddAssign,
    F: Fn(&T) -> N + Send + Sync,
{
    fn supply(&self) -> N {
        N::default()
    }

    fn accumulate(&self, acc: &mut N, item: T) {
        *acc += (self.0)(&item);
    }

    fn combine(&self, mut left: N, right: N) -> N {
        left += right;
        left
    }

    fn finish(&self, acc: N) -> N {
        acc
    }
}

pub fn summing<F>(mapper: F) -> Summing<F> {
    Summing(mapper)
}

/* ===================== Reducing ===================== */

/// Fold with an identity and an associative operator.
#[derive(Clone, Debug)]
pub struct Reducing<T, F> {
    identity: T,
    op: F,
}

impl<T, F> Collector<T, T, T> for Reducing<T, F>
where
    T: Clone + Send + Sync,
    F: Fn(T, T) -> T + Send + Sync,
{
    fn supply(&self) -> T {
        self.identity.clone()
    }

    fn accumulate(&self, acc: &mut T, item: T) {
        let current = std::mem::replace(acc, self.identity.clone());
        *acc = (self.op)(current, item);
    }

    fn combine(&self, left: T, right: T) -> T {
        (self.op)(left, right)
    }

    fn finish(&self, acc: T) -> T {
        acc
    }
}

pub fn reducing<T, F>(identity: T, op: F) -> Reducing<T, F> {
    Reducing { identity, op }
}

/// Fold without an identity. `None` when empty.
#[derive(Clone, Copy, Debug)]
pub struct ReducingToOption<F>(F);

impl<T, F> Collector<T, Option<T>, Option<T>> for ReducingToOption<F>
where
    F: Fn(T, T) -> T + Send + Sync,
{
    fn supply(&self) -> Option<T> {
        None
    }

    fn accumulate(&self, acc: &mut Option<T>, item: T) {
        *acc = Some(match acc.take() {
            Some(current) => (self.0)(current, item),
            None => item,
        });
    }

    fn combine(&self, mut left: Option<T>, right: Option<T>) -> Option<T> {
        if let Some(item) = right {
            self.accumulate(&mut left, item);
        }
        left
    }

    fn finish(&self, acc: Option<T>) -> Option<T> {
        acc
    }
}

pub fn reducing_to_option<F>(op: F) -> ReducingToOption<F> {
    ReducingToOption(op)
}

/* ===================== MinBy / MaxBy ===================== */

/// Smallest item by a comparator; the earlier item wins a tie.
pub fn min_by<T, C>(cmp: C) -> ReducingToOption<impl Fn(T, T) -> T + Send + Sync>
where
    C: Fn(&T, &T) -> Ordering + Send + Sync,
{
    ReducingToOption(move |a: T, b: T| match cmp(&b, &a) {
        Ordering::Less => b,
        _ => a,
    })
}

/// Largest item by a comparator; the earlier item wins a tie.
pub fn max_by<T, C>(cmp: C) -> ReducingToOption<impl Fn(T, T) -> T + Send + Sync>
where
    C: Fn(&T, &T) -> Ordering + Send + Sync,
{
    ReducingToOption(move |a: T, b: T| match cmp(&b, &a) {
        Ordering::Greater => b,
        _ => a,
    })
}
