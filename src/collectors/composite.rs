//! Collectors built on top of a downstream collector: adapters, grouping,
//! partitioning and map building.

use super::basic::{ToVec, to_vec};
use crate::collector::Collector;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;

/* ===================== Mapping / FlatMapping / Filtering ===================== */

/// Apply a function to each item before handing it to `downstream`.
#[derive(Clone, Debug)]
pub struct Mapping<F, D> {
    mapper: F,
    downstream: D,
}

impl<T, U, A, R, F, D> Collector<T, A, R> for Mapping<F, D>
where
    F: Fn(T) -> U + Send + Sync,
    D: Collector<U, A, R>,
{
    fn supply(&self) -> A {
        self.downstream.supply()
    }

    fn accumulate(&self, acc: &mut A, item: T) {
        self.downstream.accumulate(acc, (self.mapper)(item));
    }

    fn combine(&self, left: A, right: A) -> A {
        self.downstream.combine(left, right)
    }

    fn finish(&self, acc: A) -> R {
        self.downstream.finish(acc)
    }
}

pub fn mapping<F, D>(mapper: F, downstream: D) -> Mapping<F, D> {
    Mapping { mapper, downstream }
}

/// Expand each item into zero or more items for `downstream`.
#[derive(Clone, Debug)]
pub struct FlatMapping<F, D> {
    mapper: F,
    downstream: D,
}

impl<T, U, I, A, R, F, D> Collector<T, A, R> for FlatMapping<F, D>
where
    F: Fn(T) -> I + Send + Sync,
    I: IntoIterator<Item = U>,
    D: Collector<U, A, R>,
{
    fn supply(&self) -> A {
        self.downstream.supply()
    }

    fn accumulate(&self, acc: &mut A, item: T) {
        for u in (self.mapper)(item) {
            self.downstream.accumulate(acc, u);
        }
    }

    fn combine(&self, left: A, right: A) -> A {
        self.downstream.combine(left, right)
    }

    fn finish(&self, acc: A) -> R {
        self.downstream.finish(acc)
    }
}

pub fn flat_mapping<F, D>(mapper: F, downstream: D) -> FlatMapping<F, D> {
    FlatMapping { mapper, downstream }
}

/// Hand only the items matching `predicate` to `downstream`.
#[derive(Clone, Debug)]
pub struct Filtering<P, D> {
    predicate: P,
    downstream: D,
}

impl<T, A, R, P, D> Collector<T, A, R> for Filtering<P, D>
where
    P: Fn(&T) -> bool + Send + Sync,
    D: Collector<T, A, R>,
{
    fn supply(&self) -> A {
        self.downstream.supply()
    }

    fn accumulate(&self, acc: &mut A, item: T) {
        if (self.predicate)(&item) {
            self.downstream.accumulate(acc, item);
        }
    }

    fn combine(&self, left: A, right: A) -> A {
        self.downstream.combine(left, right)
    }

    fn finish(&self, acc: A) -> R {
        self.downstream.finish(acc)
    }
}

pub fn filtering<P, D>(predicate: P, downstream: D) -> Filtering<P, D> {
    Filtering {
        predicate,
        downstream,
    }
}

/* ===================== GroupingBy ===================== */

/// Group items by a key and reduce each group with `downstream`.
///
/// - Accumulator: `HashMap<K, A>`
/// - Output: `HashMap<K, R>`
#[derive(Clone, Debug)]
pub struct GroupingBy<F, D> {
    classifier: F,
    downstream: D,
}

impl<T, K, A, R, F, D> Collector<T, HashMap<K, A>, HashMap<K, R>> for GroupingBy<F, D>
where
    K: Eq + Hash,
    F: Fn(&T) -> K + Send + Sync,
    D: Collector<T, A, R>,
{
    fn supply(&self) -> HashMap<K, A> {
        HashMap::new()
    }

    fn accumulate(&self, acc: &mut HashMap<K, A>, item: T) {
        let group = acc
            .entry((self.classifier)(&item))
            .or_insert_with(|| self.downstream.supply());
        self.downstream.accumulate(group, item);
    }

    fn combine(&self, mut left: HashMap<K, A>, right: HashMap<K, A>) -> HashMap<K, A> {
        for (key, group) in right {
            let merged = match left.remove(&key) {
                Some(existing) => self.downstream.combine(existing, group),
                None => group,
            };
            left.insert(key, merged);
        }
        left
    }

    fn finish(&self, acc: HashMap<K, A>) -> HashMap<K, R> {
        acc.into_iter()
            .map(|(key, group)| (key, self.downstream.finish(group)))
            .collect()
    }
}

pub fn grouping_by<F, D>(classifier: F, downstream: D) -> GroupingBy<F, D> {
    GroupingBy {
        classifier,
        downstream,
    }
}

/// Group items by a key into vectors.
pub fn grouping_by_to_vec<F>(classifier: F) -> GroupingBy<F, ToVec> {
    grouping_by(classifier, to_vec())
}

/* ===================== PartitioningBy ===================== */

/// Split items on a predicate and reduce both halves with `downstream`.
/// The result always holds both the `false` and the `true` entry.
#[derive(Clone, Debug)]
pub struct PartitioningBy<P, D> {
    predicate: P,
    downstream: D,
}

impl<T, A, R, P, D> Collector<T, (A, A), HashMap<bool, R>> for PartitioningBy<P, D>
where
    P: Fn(&T) -> bool + Send + Sync,
    D: Collector<T, A, R>,
{
    fn supply(&self) -> (A, A) {
        (self.downstream.supply(), self.downstream.supply())
    }

    fn accumulate(&self, acc: &mut (A, A), item: T) {
        if (self.predicate)(&item) {
            self.downstream.accumulate(&mut acc.1, item);
        } else {
            self.downstream.accumulate(&mut acc.0, item);
        }
    }

    fn combine(&self, left: (A, A), right: (A, A)) -> (A, A) {
        (
            self.downstream.combine(left.0, right.0),
            self.downstream.combine(left.1, right.1),
        )
    }

    fn finish(&self, acc: (A, A)) -> HashMap<bool, R> {
        HashMap::from([
            (false, self.downstream.finish(acc.0)),
            (true, self.downstream.finish(acc.1)),
        ])
    }
}

pub fn partitioning_by<P, D>(predicate: P, downstream: D) -> PartitioningBy<P, D> {
    PartitioningBy {
        predicate,
        downstream,
    }
}

pub fn partitioning_by_to_vec<P>(predicate: P) -> PartitioningBy<P, ToVec> {
    partitioning_by(predicate, to_vec())
}

/* ===================== ToMap / ToUniqueMap ===================== */

/// Build a map from a key and a value projection; values sharing a key are
/// combined with `merge`.
#[derive(Clone, Debug)]
pub struct ToMap<KF, VF, M> {
    key: KF,
    value: VF,
    merge: M,
}

impl<KF, VF, M> ToMap<KF, VF, M> {
    fn insert<K, V>(&self, map: &mut HashMap<K, V>, key: K, value: V)
    where
        K: Eq + Hash,
        M: Fn(V, V) -> V,
    {
        let merged = match map.remove(&key) {
            Some(existing) => (self.merge)(existing, value),
            None => value,
        };
        map.insert(key, merged);
    }
}

impl<T, K, V, KF, VF, M> Collector<T, HashMap<K, V>, HashMap<K, V>> for ToMap<KF, VF, M>
where
    K: Eq + Hash,
    KF: Fn(&T) -> K + Send + Sync,
    VF: Fn(T) -> V + Send + Sync,
    M: Fn(V, V) -> V + Send + Sync,
{
    fn supply(&self) -> HashMap<K, V> {
        HashMap::new()
    }

    fn accumulate(&self, acc: &mut HashMap<K, V>, item: T) {
        let key = (self.key)(&item);
        let value = (self.value)(item);
        self.insert(acc, key, value);
    }

    fn combine(&self, mut left: HashMap<K, V>, right: HashMap<K, V>) -> HashMap<K, V> {
        for (key, value) in right {
            self.insert(&mut left, key, value);
        }
        left
    }

    fn finish(&self, acc: HashMap<K, V>) -> HashMap<K, V> {
        acc
    }
}

pub fn to_map<KF, VF, M>(key: KF, value: VF, merge: M) -> ToMap<KF, VF, M> {
    ToMap { key, value, merge }
}

/// Build a map from a key and a value projection.
///
/// # Panics
///
/// Panics when two items map to the same key.
#[derive(Clone, Debug)]
pub struct ToUniqueMap<KF, VF> {
    key: KF,
    value: VF,
}

fn insert_unique<K: Eq + Hash + Debug, V>(map: &mut HashMap<K, V>, key: K, value: V) {
    match map.entry(key) {
        Entry::Occupied(slot) => panic!("duplicate key: {:?}", slot.key()),
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
    }
}

impl<T, K, V, KF, VF> Collector<T, HashMap<K, V>, HashMap<K, V>> for ToUniqueMap<KF, VF>
where
    K: Eq + Hash + Debug,
    KF: Fn(&T) -> K + Send + Sync,
    VF: Fn(T) -> V + Send + Sync,
{
    fn supply(&self) -> HashMap<K, V> {
        HashMap::new()
    }

    fn accumulate(&self, acc: &mut HashMap<K, V>, item: T) {
        let key = (self.key)(&item);
        insert_unique(acc, key, (self.value)(item));
    }

    fn combine(&self, mut left: HashMap<K, V>, right: HashMap<K, V>) -> HashMap<K, V> {
        for (key, value) in right {
            insert_unique(&mut left, key, value);
        }
        left
    }

    fn finish(&self, acc: HashMap<K, V>) -> HashMap<K, V> {
        acc
    }
}

pub fn to_unique_map<KF, VF>(key: KF, value: VF) -> ToUniqueMap<KF, VF> {
    ToUniqueMap { key, value }
}
