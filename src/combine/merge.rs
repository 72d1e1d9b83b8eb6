use super::ensure_global_window;
use crate::combiners::CombineFn;
use crate::dofn::{BundleOutput, BundleProcessor, DoFn};
use crate::window::WindowedValue;
use anyhow::Result;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

const STAGE: &str = "MergeAccumulators";

/// Post-shuffle stage: merges the partial accumulators grouped under each key
/// and extracts the final output.
///
/// A key may arrive in several groups within one bundle; every accumulator
/// from every group is kept and merged together at bundle completion.
pub struct MergeAccumulatorsFn<C, K, I, A, O> {
    combine_fn: Arc<C>,
    _m: PhantomData<fn(K, I, A) -> O>,
}

impl<C, K, I, A, O> MergeAccumulatorsFn<C, K, I, A, O> {
    pub fn new(combine_fn: Arc<C>) -> Self {
        Self {
            combine_fn,
            _m: PhantomData,
        }
    }
}

/// Per-bundle `key -> [accumulator]` lists of a [`MergeAccumulatorsFn`].
pub struct MergeAccumulatorsBundle<C, K, I, A, O> {
    combine_fn: Arc<C>,
    pending: HashMap<K, Vec<A>>,
    _m: PhantomData<fn(I) -> O>,
}

impl<C, K, I, A, O> DoFn<(K, Vec<A>), (K, O)> for MergeAccumulatorsFn<C, K, I, A, O>
where
    C: CombineFn<I, A, O>,
    K: Eq + Hash + 'static,
    I: 'static,
    A: 'static,
    O: 'static,
{
    type Processor = MergeAccumulatorsBundle<C, K, I, A, O>;

    fn start_bundle(&self) -> Self::Processor {
        MergeAccumulatorsBundle {
            combine_fn: Arc::clone(&self.combine_fn),
            pending: HashMap::new(),
            _m: PhantomData,
        }
    }
}

impl<C, K, I, A, O> BundleProcessor<(K, Vec<A>), (K, O)> for MergeAccumulatorsBundle<C, K, I, A, O>
where
    C: CombineFn<I, A, O>,
    K: Eq + Hash,
{
    fn process(&mut self, element: WindowedValue<(K, Vec<A>)>) -> Result<()> {
        ensure_global_window(&element, STAGE)?;
        let (key, accumulators) = element.value;
        self.pending.entry(key).or_default().extend(accumulators);
        Ok(())
    }

    fn finish_bundle(self) -> Result<BundleOutput<(K, O)>> {
        trace!(keys = self.pending.len(), "merge bundle finished");
        let combine_fn = &self.combine_fn;
        self.pending
            .into_iter()
            // A key whose groups were all empty never saw an input; skip it
            // rather than call merge_accumulators with nothing.
            .filter(|(_, accs)| !accs.is_empty())
            .map(|(key, accs)| {
                let merged = combine_fn.merge_accumulators(accs)?;
                let output = combine_fn.extract_output(merged)?;
                Ok(WindowedValue::new((key, output)))
            })
            .collect::<Result<Vec<_>>>()
            .map(BundleOutput::from)
    }
}
