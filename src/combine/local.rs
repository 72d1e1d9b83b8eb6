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

const STAGE: &str = "LocalCombine";

/// Pre-shuffle stage: folds each bundle's `(K, V)` inputs into one partial
/// accumulator per key.
///
/// Emits `(K, A)` pairs, never outputs, and only when the bundle finishes.
/// A bundle with no elements for a key emits nothing for that key.
pub struct LocalCombineFn<C, K, V, A, O> {
    combine_fn: Arc<C>,
    _m: PhantomData<fn(K, V) -> (A, O)>,
}

impl<C, K, V, A, O> LocalCombineFn<C, K, V, A, O> {
    pub fn new(combine_fn: Arc<C>) -> Self {
        Self {
            combine_fn,
            _m: PhantomData,
        }
    }
}

/// Per-bundle accumulator table of a [`LocalCombineFn`].
pub struct LocalCombineBundle<C, K, V, A, O> {
    combine_fn: Arc<C>,
    accumulators: HashMap<K, A>,
    _m: PhantomData<fn(V) -> O>,
}

impl<C, K, V, A, O> DoFn<(K, V), (K, A)> for LocalCombineFn<C, K, V, A, O>
where
    C: CombineFn<V, A, O>,
    K: Eq + Hash + 'static,
    V: 'static,
    A: 'static,
    O: 'static,
{
    type Processor = LocalCombineBundle<C, K, V, A, O>;

    fn start_bundle(&self) -> Self::Processor {
        LocalCombineBundle {
            combine_fn: Arc::clone(&self.combine_fn),
            accumulators: HashMap::new(),
            _m: PhantomData,
        }
    }
}

impl<C, K, V, A, O> BundleProcessor<(K, V), (K, A)> for LocalCombineBundle<C, K, V, A, O>
where
    C: CombineFn<V, A, O>,
    K: Eq + Hash,
{
    fn process(&mut self, element: WindowedValue<(K, V)>) -> Result<()> {
        ensure_global_window(&element, STAGE)?;
        let (key, value) = element.value;
        let acc = match self.accumulators.remove(&key) {
            Some(acc) => acc,
            None => self.combine_fn.create_accumulator()?,
        };
        let acc = self.combine_fn.add_input(acc, value)?;
        self.accumulators.insert(key, acc);
        Ok(())
    }

    fn finish_bundle(self) -> Result<BundleOutput<(K, A)>> {
        trace!(keys = self.accumulators.len(), "local combine bundle finished");
        Ok(self
            .accumulators
            .into_iter()
            .map(WindowedValue::new)
            .collect())
    }
}
