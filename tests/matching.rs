use anyhow::Result;
use ironstream::testing::*;
use ironstream::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn any_all_none() -> Result<()> {
    let p = TestPipeline::new();
    assert!(range(&p, 0, 100).any_match(|x| *x == 57)?);
    assert!(!range(&p, 0, 100).any_match(|x| *x > 100)?);
    assert!(range(&p, 0, 100).parallel().all_match(|x| *x < 100)?);
    assert!(!range(&p, 0, 100).parallel().all_match(|x| *x < 99)?);
    assert!(range(&p, 0, 100).none_match(|x| *x < 0)?);
    assert!(!range(&p, 0, 100).parallel().none_match(|x| *x == 0)?);
    Ok(())
}

#[test]
fn empty_stream_never_calls_the_predicate() -> Result<()> {
    let p = TestPipeline::new();
    let calls = AtomicUsize::new(0);
    let predicate = |_: &i32| {
        calls.fetch_add(1, Ordering::Relaxed);
        true
    };
    assert!(!empty::<i32>(&p).any_match(predicate)?);
    assert!(empty::<i32>(&p).all_match(predicate)?);
    assert!(empty::<i32>(&p).parallel().none_match(predicate)?);
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    Ok(())
}

#[test]
fn any_match_stops_an_infinite_stream() -> Result<()> {
    let p = TestPipeline::new();
    assert!(iterate(&p, 0u64, |x| x + 1).any_match(|x| *x == 1_000)?);
    assert!(
        iterate(&p, 0u64, |x| x + 1)
            .parallel()
            .any_match(|x| *x > 5_000)?
    );
    Ok(())
}

#[test]
fn all_match_stops_at_first_counterexample() -> Result<()> {
    let p = TestPipeline::new();
    assert!(!iterate(&p, 1u64, |x| x * 3).all_match(|x| x % 2 == 1 && *x < 1_000)?);
    Ok(())
}

#[test]
fn find_first_sequential() -> Result<()> {
    let p = TestPipeline::new();
    assert_eq!(
        iterate(&p, 1u64, |x| x + 1)
            .filter(|x: &u64| x % 13 == 0)
            .find_first()?,
        Some(13)
    );
    assert_eq!(empty::<u8>(&p).find_first()?, None);
    Ok(())
}

#[test]
fn find_first_is_deterministic_on_parallel_streams() -> Result<()> {
    for _ in 0..10 {
        let p = TestPipeline::new();
        let first = range(&p, 0, 1_000)
            .parallel()
            .filter(|x: &i32| x % 7 == 3)
            .find_first()?;
        assert_eq!(first, Some(3));
    }
    Ok(())
}

#[test]
fn find_first_stops_on_an_infinite_parallel_stream() -> Result<()> {
    for _ in 0..10 {
        let p = TestPipeline::new();
        let first = iterate(&p, 0u64, |x| x + 1)
            .parallel()
            .filter(|x: &u64| x % 7 == 3)
            .find_first()?;
        assert_eq!(first, Some(3));
    }
    Ok(())
}

#[test]
fn find_first_after_parallel_map() -> Result<()> {
    for _ in 0..10 {
        let p = TestPipeline::new();
        let first = range(&p, 0, 500)
            .parallel()
            .map(|x: i32| x * 3)
            .filter(|x: &i32| x % 2 == 1)
            .find_first()?;
        assert_eq!(first, Some(3));
    }
    Ok(())
}

#[test]
fn find_any_always_finds_one_of_several_matches() -> Result<()> {
    for _ in 0..20 {
        let p = TestPipeline::new();
        let found = range(&p, 0, 1_000)
            .parallel()
            .filter(|x: &i32| x % 100 == 99)
            .find_any()?;
        assert!(matches!(found, Some(x) if x % 100 == 99), "{found:?}");
    }
    Ok(())
}

#[test]
fn find_any_on_an_infinite_parallel_stream() -> Result<()> {
    let p = TestPipeline::new();
    let found = iterate(&p, 0u64, |x| x + 1)
        .parallel()
        .filter(|x: &u64| x % 1_000 == 999)
        .find_any()?;
    assert!(matches!(found, Some(x) if x % 1_000 == 999));
    Ok(())
}

#[test]
fn find_any_on_empty_stream() -> Result<()> {
    let p = TestPipeline::new();
    assert_eq!(empty::<i32>(&p).parallel().find_any()?, None);
    Ok(())
}
