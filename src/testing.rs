//! Testing utilities for combine pipelines.
//!
//! - [`TestPipeline`]: a [`Pipeline`] wrapper exposing graph-shape queries.
//! - [`assertions`]: order-insensitive comparisons for combine outputs, whose
//!   key order depends on the shuffle.
//! - [`combine_in_groups`]: drive a [`CombineFn`] by hand over an explicit
//!   split of the inputs, the reference for partition-invariance tests.
//!
//! ```ignore
//! use ironcombine::*;
//! use ironcombine::testing::*;
//!
//! let p = TestPipeline::new();
//! let out = from_vec(&p, vec![('a', 1u32), ('b', 2), ('a', 3)])
//!     .combine_per_key(CountFn)
//!     .collect_par(None, Some(3))?;
//! assert_kv_collections_equal(out, vec![('a', 2), ('b', 1)]);
//! # anyhow::Result::<()>::Ok(())
//! ```

pub mod assertions;

pub use assertions::*;

use crate::Pipeline;
use crate::combiners::CombineFn;
use anyhow::Result;

/// A test-focused wrapper around [`Pipeline`].
#[derive(Clone, Default)]
pub struct TestPipeline {
    pipeline: Pipeline,
}

impl TestPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the pipeline graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let (nodes, _) = self.pipeline.snapshot();
        nodes.len()
    }

    /// Number of edges in the pipeline graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let (_, edges) = self.pipeline.snapshot();
        edges.len()
    }

    /// Labels of every node, sorted by node id.
    #[must_use]
    pub fn node_labels(&self) -> Vec<String> {
        let (nodes, _) = self.pipeline.snapshot();
        let mut labelled: Vec<_> = nodes.iter().map(|(id, n)| (id.raw(), n.label())).collect();
        labelled.sort_by_key(|(id, _)| *id);
        labelled.into_iter().map(|(_, l)| l).collect()
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

/// Combine `groups` the way split bundles would: each group is folded into
/// its own accumulator, the accumulators are merged in the given order, and
/// the result is extracted.
///
/// Empty groups still contribute a fresh accumulator. At least one group is
/// required.
pub fn combine_in_groups<C, I, A, O>(combine_fn: &C, groups: Vec<Vec<I>>) -> Result<O>
where
    C: CombineFn<I, A, O>,
{
    let accumulators = groups
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .try_fold(combine_fn.create_accumulator()?, |acc, v| {
                    combine_fn.add_input(acc, v)
                })
        })
        .collect::<Result<Vec<A>>>()?;
    let merged = combine_fn.merge_accumulators(accumulators)?;
    combine_fn.extract_output(merged)
}
