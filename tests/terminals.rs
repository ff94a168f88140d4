use anyhow::Result;
use ironstream::testing::*;
use ironstream::*;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[test]
fn reduce_sequential_and_parallel_agree() -> Result<()> {
    let p = TestPipeline::new();
    let seq = range(&p, 0u64, 1_000).reduce(0, |a, b| a + b)?;
    let par = range(&p, 0u64, 1_000).parallel().reduce(0, |a, b| a + b)?;
    assert_eq!(seq, 499_500);
    assert_eq!(par, 499_500);
    p.assert_all_stages_closed();
    Ok(())
}

#[test]
fn reduce_empty_returns_identity() -> Result<()> {
    let p = TestPipeline::new();
    assert_eq!(empty::<i64>(&p).parallel().reduce(0, |a, b| a + b)?, 0);
    assert_eq!(empty::<i64>(&p).parallel().reduce(1, |a, b| a * b)?, 1);
    assert_eq!(empty::<i64>(&p).reduce(42, |a, b| a + b)?, 42);
    Ok(())
}

#[test]
fn sum_and_count() -> Result<()> {
    let p = TestPipeline::new();
    assert_eq!(range_closed(&p, 1i64, 100).parallel().sum()?, 5_050);
    assert_eq!(range(&p, 0, 12_345).parallel().count()?, 12_345);
    assert_eq!(empty::<String>(&p).count()?, 0);
    Ok(())
}

#[test]
fn reduce_to_option() -> Result<()> {
    let p = TestPipeline::new();
    let product = range_closed(&p, 1u64, 10)
        .parallel()
        .reduce_to_option(|a, b| a * b)?;
    assert_eq!(product, Some(3_628_800));
    assert_eq!(empty::<u64>(&p).reduce_to_option(|a, b| a * b)?, None);
    Ok(())
}

#[test]
fn reduce_with_changes_type() -> Result<()> {
    let p = TestPipeline::new();
    let words = vec!["alpha", "beta", "gamma", "delta"];
    let total_len = from_vec(&p, words).parallel().reduce_with(
        0usize,
        |acc, w: &str| acc + w.len(),
        |a, b| a + b,
    )?;
    assert_eq!(total_len, 19);
    Ok(())
}

#[test]
fn min_and_max() -> Result<()> {
    let p = TestPipeline::new();
    let data = vec![17, -3, 42, 8, -3, 42];
    assert_eq!(from_vec(&p, data.clone()).parallel().min()?, Some(-3));
    assert_eq!(from_vec(&p, data).parallel().max()?, Some(42));
    assert_eq!(empty::<i32>(&p).min()?, None);
    Ok(())
}

#[test]
fn min_by_keeps_the_earlier_item_on_ties() -> Result<()> {
    let p = TestPipeline::new();
    let pairs = vec![(3, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
    let min = from_vec(&p, pairs.clone()).min_by(|a, b| a.0.cmp(&b.0))?;
    assert_eq!(min, Some((1, 'b')));
    let max = from_vec(&p, pairs)
        .map(|(k, c): (i32, char)| (-k, c))
        .max_by(|a, b| a.0.cmp(&b.0))?;
    assert_eq!(max, Some((-1, 'b')));
    Ok(())
}

#[test]
fn collect_into_set() -> Result<()> {
    let p = TestPipeline::new();
    let set = range(&p, 0, 100).parallel().map(|x: i32| x % 7).collect(
        HashSet::new,
        |acc: &mut HashSet<i32>, x| {
            acc.insert(x);
        },
        |mut a, b| {
            a.extend(b);
            a
        },
    )?;
    assert_eq!(set, (0..7).collect::<HashSet<_>>());
    Ok(())
}

#[test]
fn for_each_visits_every_item() -> Result<()> {
    let p = TestPipeline::new();
    let total = AtomicU64::new(0);
    let seen = Mutex::new(Vec::new());
    range(&p, 0u64, 500).parallel().for_each(|x| {
        total.fetch_add(x, Ordering::Relaxed);
        seen.lock().unwrap().push(x);
    })?;
    assert_eq!(total.load(Ordering::Relaxed), 124_750);
    let seen = seen.into_inner().unwrap();
    assert_collections_unordered_equal(&seen, &(0..500).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn to_vec_on_strings() -> Result<()> {
    let p = TestPipeline::new();
    let out = from_iter(&p, ["x", "y", "z"].map(String::from))
        .parallel()
        .map(|s: String| s.to_uppercase())
        .to_vec()?;
    assert_collections_equal(&out, &["X", "Y", "Z"].map(String::from));
    Ok(())
}
