use ironstream::testing::*;
use ironstream::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn panicking_map_fails_the_terminal() {
    let p = TestPipeline::new();
    let err = range(&p, 0, 1_000)
        .parallel()
        .map(|x: i32| {
            if x == 500 {
                panic!("bad item {x}");
            }
            x
        })
        .to_vec()
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("panicked"), "{message}");
    assert!(message.contains("bad item 500"), "{message}");
    assert!(p.is_aborted());
    assert!(p.metrics().faults >= 1);
}

#[test]
fn failure_stops_an_infinite_pipeline() {
    let p = TestPipeline::new();
    let result = iterate(&p, 0u64, |x| x + 1)
        .parallel()
        .map(|x: u64| {
            if x == 50 {
                panic!("stop here");
            }
            x
        })
        .count();
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("stop here"));
}

#[test]
fn panic_in_flat_map_function() {
    let p = TestPipeline::new();
    let q = p.clone();
    let err = from_vec(&p, vec![1, 2, 3])
        .flat_map(move |n: i32| {
            if n == 2 {
                panic!("cannot expand {n}");
            }
            range(&q, 0, n)
        })
        .to_vec()
        .unwrap_err();
    assert!(format!("{err:#}").contains("cannot expand 2"));
}

#[test]
#[should_panic(expected = "consumer gave up")]
fn panicking_terminal_closure_resumes_on_caller() {
    let p = TestPipeline::new();
    let _ = range(&p, 0, 100).parallel().for_each(|x| {
        if x == 42 {
            panic!("consumer gave up");
        }
    });
}

#[test]
fn panicking_terminal_closure_aborts_the_pipeline() {
    let p = TestPipeline::new();
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&produced);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = generate(&p, move || counter.fetch_add(1, Ordering::Relaxed))
            .parallel()
            .for_each(|x| {
                if x >= 10 {
                    panic!("enough");
                }
            });
    }));
    assert!(outcome.is_err());
    assert!(p.is_aborted());
    assert!(produced.load(Ordering::Relaxed) > 10);
}

#[test]
fn independent_pipelines_do_not_share_faults() {
    let broken = TestPipeline::new();
    let healthy = TestPipeline::new();
    let _ = range(&broken, 0, 10)
        .map(|_x: i32| -> i32 { panic!("broken") })
        .count();
    assert!(broken.is_aborted());
    assert_eq!(range(&healthy, 0, 10).count().unwrap(), 10);
    assert!(!healthy.is_aborted());
}

struct BreaksAfter(u32);

impl source::Producer<u32> for BreaksAfter {
    fn produce(&mut self) -> anyhow::Result<Option<u32>> {
        if self.0 == 0 {
            anyhow::bail!("disk gone");
        }
        self.0 -= 1;
        Ok(Some(self.0))
    }
}

#[test]
fn concat_reports_failure_of_a_stream_on_another_pipeline() {
    let p = TestPipeline::new();
    let other = TestPipeline::new();
    let err = concat(range(&p, 0, 3), from_producer(&other, BreaksAfter(2)))
        .to_vec()
        .unwrap_err();
    assert!(format!("{err:#}").contains("disk gone"), "{err:#}");
    assert!(p.is_aborted());
}

#[test]
fn flat_map_reports_failure_of_a_nested_pipeline() {
    let p = TestPipeline::new();
    let err = from_vec(&p, vec![1, 2])
        .flat_map(|n: u32| {
            let other = Pipeline::with_parallelism(2);
            from_producer(&other, BreaksAfter(n))
        })
        .to_vec()
        .unwrap_err();
    assert!(format!("{err:#}").contains("disk gone"), "{err:#}");
}

#[test]
fn concat_on_the_same_pipeline_fails_once() {
    let p = TestPipeline::new();
    let err = concat(range(&p, 0, 3), from_producer(&p, BreaksAfter(2)))
        .to_vec()
        .unwrap_err();
    assert!(format!("{err:#}").contains("disk gone"), "{err:#}");
}
