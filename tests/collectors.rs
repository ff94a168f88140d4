use anyhow::Result;
use ironstream::collectors::*;
use ironstream::testing::*;
use ironstream::*;
use std::collections::{HashMap, HashSet};

const TEXT: &str = "the quick brown fox jumps over the lazy dog";

fn words(p: &TestPipeline) -> Stream<&'static str> {
    from_iter(p, TEXT.split(' '))
}

#[test]
fn grouping_by_length_with_counting() -> Result<()> {
    let p = TestPipeline::new();
    let by_len = words(&p)
        .parallel()
        .collect_with(grouping_by(|w: &&str| w.len(), counting()))?;
    let expected = HashMap::from([(3, 4), (4, 2), (5, 3)]);
    assert_maps_equal(&by_len, &expected);
    p.assert_all_stages_closed();
    Ok(())
}

#[test]
fn grouping_by_to_vec_on_parallel_stream() -> Result<()> {
    let p = TestPipeline::new();
    let groups = words(&p)
        .parallel()
        .collect_with(grouping_by_to_vec(|w: &&str| w.chars().next()))?;
    let expected = HashMap::from([
        (Some('t'), vec!["the", "the"]),
        (Some('q'), vec!["quick"]),
        (Some('b'), vec!["brown"]),
        (Some('f'), vec!["fox"]),
        (Some('j'), vec!["jumps"]),
        (Some('o'), vec!["over"]),
        (Some('l'), vec!["lazy"]),
        (Some('d'), vec!["dog"]),
    ]);
    assert_groups_equal(&groups, &expected);
    Ok(())
}

#[test]
fn grouping_with_mapping_into_set() -> Result<()> {
    let p = TestPipeline::new();
    let groups = words(&p).collect_with(grouping_by(
        |w: &&str| w.len(),
        mapping(|w: &str| w.to_uppercase(), to_set()),
    ))?;
    assert_eq!(
        groups[&3],
        HashSet::from(["THE", "FOX", "DOG"].map(String::from))
    );
    Ok(())
}

#[test]
fn partitioning_always_has_both_keys() -> Result<()> {
    let p = TestPipeline::new();
    let parts = range(&p, 0, 10)
        .parallel()
        .collect_with(partitioning_by(|x: &i32| x % 2 == 0, counting()))?;
    assert_eq!(parts[&true], 5);
    assert_eq!(parts[&false], 5);

    let parts = range(&p, 0, 10).collect_with(partitioning_by_to_vec(|x: &i32| *x > 100))?;
    assert!(parts[&true].is_empty());
    assert_collections_equal(&parts[&false], &(0..10).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn to_map_merges_duplicates() -> Result<()> {
    let p = TestPipeline::new();
    let lengths = words(&p).parallel().collect_with(to_map(
        |w: &&str| w.len(),
        |_w: &str| 1u32,
        |a: u32, b: u32| a + b,
    ))?;
    assert_maps_equal(&lengths, &HashMap::from([(3, 4), (4, 2), (5, 3)]));
    Ok(())
}

#[test]
fn to_unique_map() -> Result<()> {
    let p = TestPipeline::new();
    let map = range(&p, 0, 5).parallel().collect_with(ironstream::collectors::to_unique_map(
        |x: &i32| *x,
        |x: i32| x * x,
    ))?;
    assert_maps_equal(&map, &(0..5).map(|x| (x, x * x)).collect());
    Ok(())
}

#[test]
#[should_panic(expected = "duplicate key")]
fn to_unique_map_rejects_duplicate_keys() {
    let p = TestPipeline::new();
    let _ = words(&p).collect_with(ironstream::collectors::to_unique_map(
        |w: &&str| w.len(),
        |w: &'static str| w,
    ));
}

#[test]
fn averaging() -> Result<()> {
    let p = TestPipeline::new();
    let avg = range_closed(&p, 1i64, 4)
        .parallel()
        .collect_with(averaging_i64(|x: &i64| *x))?;
    assert!((avg - 2.5).abs() < f64::EPSILON);

    let avg = from_vec(&p, vec![0.1f64; 10])
        .parallel()
        .collect_with(averaging_f64(|x: &f64| *x))?;
    assert!((avg - 0.1).abs() < 1e-12);

    let none = empty::<i64>(&p).collect_with(averaging_i64(|x: &i64| *x))?;
    assert_eq!(none, 0.0);
    Ok(())
}

#[test]
fn summarizing_word_lengths() -> Result<()> {
    let p = TestPipeline::new();
    let stats = words(&p)
        .parallel()
        .collect_with(summarizing(|w: &&str| w.len() as i64))?;
    assert_eq!(stats.count(), 9);
    assert_eq!(stats.sum(), 35);
    assert_eq!(stats.min(), 3);
    assert_eq!(stats.max(), 5);
    assert!((stats.average() - 35.0 / 9.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn joining_keeps_order_on_sequential_stream() -> Result<()> {
    let p = TestPipeline::new();
    let joined = words(&p).limit(4).collect_with(joining(", "))?;
    assert_eq!(joined, "the, quick, brown, fox");
    assert_eq!(empty::<String>(&p).collect_with(joining("-"))?, "");
    Ok(())
}

#[test]
fn summing_and_reducing() -> Result<()> {
    let p = TestPipeline::new();
    let total = words(&p)
        .parallel()
        .collect_with(summing(|w: &&str| w.len()))?;
    assert_eq!(total, 35);

    let longest = words(&p).collect_with(reducing("", |a: &'static str, b: &'static str| {
        if b.len() > a.len() { b } else { a }
    }))?;
    assert_eq!(longest, "quick");

    let product = range_closed(&p, 1u64, 5)
        .parallel()
        .collect_with(reducing_to_option(|a: u64, b: u64| a * b))?;
    assert_eq!(product, Some(120));
    Ok(())
}

#[test]
fn min_by_and_max_by_collectors() -> Result<()> {
    let p = TestPipeline::new();
    let shortest = words(&p).collect_with(min_by(|a: &&str, b: &&str| a.len().cmp(&b.len())))?;
    assert_eq!(shortest, Some("the"));
    let longest = words(&p).collect_with(max_by(|a: &&str, b: &&str| a.len().cmp(&b.len())))?;
    assert_eq!(longest, Some("quick"));
    Ok(())
}

#[test]
fn filtering_and_flat_mapping() -> Result<()> {
    let p = TestPipeline::new();
    let long = words(&p).collect_with(filtering(|w: &&str| w.len() > 4, counting()))?;
    assert_eq!(long, 3);

    let letters = words(&p)
        .parallel()
        .collect_with(flat_mapping(|w: &str| w.chars().collect::<Vec<_>>(), to_set()))?;
    assert_eq!(letters.len(), 26);
    Ok(())
}

#[test]
fn collector_of_custom() -> Result<()> {
    let p = TestPipeline::new();
    let (min, max) = range(&p, -50, 50).parallel().collect_with(collector_of(
        || (i32::MAX, i32::MIN),
        |acc: &mut (i32, i32), x: i32| {
            acc.0 = acc.0.min(x);
            acc.1 = acc.1.max(x);
        },
        |a: (i32, i32), b: (i32, i32)| (a.0.min(b.0), a.1.max(b.1)),
        |acc: (i32, i32)| acc,
    ))?;
    assert_eq!((min, max), (-50, 49));
    Ok(())
}
