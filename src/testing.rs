//! Testing utilities for ironstream pipelines.
//!
//! - [`TestPipeline`]: a [`Pipeline`] with a fixed parallelism and helpers to
//!   check how it shut down
//! - assertions comparing stream outputs with expected results
//!
//! # Quick Start
//!
//! ```
//! use ironstream::*;
//! use ironstream::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let p = TestPipeline::new();
//!
//! let result = from_vec(&p, vec![1, 2, 3])
//!     .parallel()
//!     .map(|x: i32| x * 2)
//!     .to_vec()?;
//!
//! assert_collections_equal(&result, &[2, 4, 6]);
//! p.assert_all_stages_closed();
//! # Ok(())
//! # }
//! ```

pub mod assertions;

pub use assertions::*;

use crate::Pipeline;

/// Parallelism used by [`TestPipeline::new`]. Fixed so tests exercise the
/// parallel paths regardless of the machine they run on.
pub const TEST_PARALLELISM: usize = 4;

/// A test-focused wrapper around [`Pipeline`].
///
/// Derefs to [`Pipeline`], so it can be passed to every source function.
#[derive(Clone, Debug)]
pub struct TestPipeline {
    pipeline: Pipeline,
}

impl TestPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parallelism(TEST_PARALLELISM)
    }

    #[must_use]
    pub fn with_parallelism(parallelism: usize) -> Self {
        Self {
            pipeline: Pipeline::with_parallelism(parallelism),
        }
    }

    /// Assert that every stage opened on this pipeline has closed and that no
    /// fault was recorded. Only meaningful after a terminal operation that
    /// drained its stream completely.
    ///
    /// # Panics
    ///
    /// Panics if a stage is still open or the pipeline recorded a fault.
    pub fn assert_all_stages_closed(&self) {
        let m = self.pipeline.metrics();
        assert_eq!(
            m.stages_closed, m.stages_opened,
            "Stages left open:\n  Opened: {}\n  Closed: {}",
            m.stages_opened, m.stages_closed
        );
        assert_eq!(m.faults, 0, "Pipeline recorded {} fault(s)", m.faults);
    }

    /// Print the pipeline's counters.
    pub fn debug_print_metrics(&self) {
        self.pipeline.metrics().print();
    }
}

impl Default for TestPipeline {
    fn default() -> Self {
        Self::new()
    }
}

// Allow TestPipeline to be used wherever Pipeline is expected
impl std::ops::Deref for TestPipeline {
    type Target = Pipeline;

    fn deref(&self) -> &Self::Target {
        &self.pipeline
    }
}

impl AsRef<Pipeline> for TestPipeline {
    fn as_ref(&self) -> &Pipeline {
        &self.pipeline
    }
}
