//! Statistical collectors: averages and summary statistics.

use crate::collector::Collector;
use serde::{Deserialize, Serialize};
use std::fmt;

/* ===================== AveragingI64 ===================== */

/// Arithmetic mean of an `i64` projection of each item.
///
/// - Accumulator: `(sum_i128, count_u64)`
/// - Output: `f64`
///
/// Empty input produces `0.0`.
#[derive(Clone, Copy, Debug)]
pub struct AveragingI64<F>(F);

impl<T, F> Collector<T, (i128, u64), f64> for AveragingI64<F>
where
    F: Fn(&T) -> i64 + Send + Sync,
{
    fn supply(&self) -> (i128, u64) {
        (0, 0)
    }

    fn accumulate(&self, acc: &mut (i128, u64), item: T) {
        acc.0 += i128::from((self.0)(&item));
        acc.1 += 1;
    }

    fn combine(&self, left: (i128, u64), right: (i128, u64)) -> (i128, u64) {
        (left.0 + right.0, left.1 + right.1)
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (i128, u64)) -> f64 {
        if acc.1 == 0 {
            0.0
        } else {
            acc.0 as f64 / acc.1 as f64
        }
    }
}

pub fn averaging_i64<F>(mapper: F) -> AveragingI64<F> {
    AveragingI64(mapper)
}

/* ===================== AveragingF64 ===================== */

/// Running state of a compensated (Kahan) average.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AverageAccumulator {
    sum: f64,
    compensation: f64,
    simple_sum: f64,
    count: u64,
}

impl AverageAccumulator {
    fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    fn accept(&mut self, value: f64) {
        self.add(value);
        self.simple_sum += value;
        self.count += 1;
    }

    fn merge(&mut self, other: &AverageAccumulator) {
        self.add(other.sum);
        self.add(-other.compensation);
        self.simple_sum += other.simple_sum;
        self.count += other.count;
    }

    /// Compensated sum. Falls back to the plain sum when compensation turned
    /// an infinite total into NaN.
    pub fn sum(&self) -> f64 {
        let total = self.sum - self.compensation;
        if total.is_nan() && self.simple_sum.is_infinite() {
            self.simple_sum
        } else {
            total
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum() / self.count as f64
        }
    }
}

/// Arithmetic mean of an `f64` projection of each item, using compensated
/// summation. Empty input produces `0.0`.
#[derive(Clone, Copy, Debug)]
pub struct AveragingF64<F>(F);

impl<T, F> Collector<T, AverageAccumulator, f64> for AveragingF64<F>
where
    F: Fn(&T) -> f64 + Send + Sync,
{
    fn supply(&self) -> AverageAccumulator {
        AverageAccumulator::default()
    }

    fn accumulate(&self, acc: &mut AverageAccumulator, item: T) {
        acc.accept((self.0)(&item));
    }

    fn combine(&self, mut left: AverageAccumulator, right: AverageAccumulator) -> AverageAccumulator {
        left.merge(&right);
        left
    }

    fn finish(&self, acc: AverageAccumulator) -> f64 {
        acc.average()
    }
}

pub fn averaging_f64<F>(mapper: F) -> AveragingF64<F> {
    AveragingF64(mapper)
}

/* ===================== Summarizing ===================== */

/// Count, sum, min, max and average of a series of `i64` values.
///
/// An empty summary reports `min == i64::MAX`, `max == i64::MIN` and an
/// average of `0.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    count: u64,
    sum: i64,
    min: i64,
    max: i64,
}

impl Default for SummaryStatistics {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0,
            min: i64::MAX,
            max: i64::MIN,
        }
    }
}

impl SummaryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, value: i64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn combine(&mut self, other: &SummaryStatistics) {
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> i64 {
        self.sum
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SummaryStatistics{{count={}, sum={}, min={}, average={:.6}, max={}}}",
            self.count,
            self.sum,
            self.min,
            self.average(),
            self.max
        )
    }
}

/// [`SummaryStatistics`] over an `i64` projection of each item.
#[derive(Clone, Copy, Debug)]
pub struct Summarizing<F>(F);

impl<T, F> Collector<T, SummaryStatistics, SummaryStatistics> for Summarizing<F>
where
    F: Fn(&T) -> i64 + Send + Sync,
{
    fn supply(&self) -> SummaryStatistics {
        SummaryStatistics::default()
    }

    fn accumulate(&self, acc: &mut SummaryStatistics, item: T) {
        acc.accept((self.0)(&item));
    }

    fn combine(&self, mut left: SummaryStatistics, right: SummaryStatistics) -> SummaryStatistics {
        left.combine(&right);
        left
    }

    fn finish(&self, acc: SummaryStatistics) -> SummaryStatistics {
        acc
    }
}

pub fn summarizing<F>(mapper: F) -> Summarizing<F> {
    Summarizing(mapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compensated_sum_keeps_small_terms() {
        let mut acc = AverageAccumulator::default();
        acc.accept(1.0e16);
        for _ in 0..10 {
            acc.accept(1.0);
        }
        acc.accept(-1.0e16);
        assert_eq!(acc.sum(), 10.0);
        assert_eq!(acc.count(), 12);
    }

    #[test]
    fn empty_summary_has_sentinel_bounds() {
        let s = SummaryStatistics::new();
        assert_eq!(s.min(), i64::MAX);
        assert_eq!(s.max(), i64::MIN);
        assert_eq!(s.average(), 0.0);
    }
}
