//! Two-phase combine transforms.
//!
//! [`CombinePerKey`] expands to
//!
//! ```text
//! (K, V) --LocalCombine--> (K, A) --GroupByKey--> (K, Vec<A>) --MergeAccumulators--> (K, O)
//! ```
//!
//! The local stage shrinks each bundle to one partial accumulator per key
//! before the shuffle; the merge stage sees every partial accumulator for a
//! key and produces the output. [`CombineGlobally`] pairs every element with
//! the unit key `()` and reuses the same expansion.
//!
//! Combine runs in the single global window. Elements carrying an explicit
//! window assignment are rejected with [`CombineError::WindowedInput`], and
//! outputs are emitted with every metadata slot unset.
//!
//! # Examples
//! ```ignore
//! use ironcombine::*;
//!
//! let p = Pipeline::default();
//! let total = from_vec(&p, vec![1u32, 2, 3, 4]).apply(count_globally()).collect_seq()?;
//! assert_eq!(total, vec![4]);
//!
//! let per_key = from_vec(&p, vec![('A', 1u32), ('B', 2), ('A', 3)])
//!     .apply(count_per_key())
//!     .collect_seq_sorted_by_key()?;
//! assert_eq!(per_key, vec![('A', 2), ('B', 1)]);
//! # anyhow::Result::<()>::Ok(())
//! ```

mod local;
mod merge;

pub use local::{LocalCombineBundle, LocalCombineFn};
pub use merge::{MergeAccumulatorsBundle, MergeAccumulatorsFn};

use crate::collection::{PCollection, RFBound};
use crate::combiners::{CombineFn, CountFn};
use crate::error::CombineError;
use crate::transform::PTransform;
use crate::window::WindowedValue;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) fn ensure_global_window<T>(
    element: &WindowedValue<T>,
    stage: &'static str,
) -> Result<(), CombineError> {
    if element.has_windows() {
        return Err(CombineError::WindowedInput { stage });
    }
    Ok(())
}

/* ===================== CombinePerKey ===================== */

/// Combine all values sharing a key with a [`CombineFn`].
pub struct CombinePerKey<C, V, A, O> {
    combine_fn: Arc<C>,
    _m: PhantomData<fn(V) -> (A, O)>,
}

impl<C, V, A, O> CombinePerKey<C, V, A, O> {
    pub fn new(combine_fn: C) -> Self {
        Self {
            combine_fn: Arc::new(combine_fn),
            _m: PhantomData,
        }
    }
}

impl<C, K, V, A, O> PTransform<(K, V), (K, O)> for CombinePerKey<C, V, A, O>
where
    C: CombineFn<V, A, O>,
    K: RFBound + Eq + Hash,
    V: RFBound,
    A: RFBound,
    O: RFBound,
{
    fn expand(&self, input: PCollection<(K, V)>) -> PCollection<(K, O)> {
        input
            .par_do(
                "CombinePerKey/LocalCombine",
                LocalCombineFn::<C, K, V, A, O>::new(Arc::clone(&self.combine_fn)),
            )
            .group_by_key()
            .par_do(
                "CombinePerKey/MergeAccumulators",
                MergeAccumulatorsFn::<C, K, V, A, O>::new(Arc::clone(&self.combine_fn)),
            )
    }
}

/* ===================== CombineGlobally ===================== */

/// Combine every element of a collection into a single output.
///
/// An empty input produces an empty output: no key ever reaches the merge
/// stage, so there is nothing to extract.
pub struct CombineGlobally<C, V, A, O> {
    per_key: CombinePerKey<C, V, A, O>,
}

impl<C, V, A, O> CombineGlobally<C, V, A, O> {
    pub fn new(combine_fn: C) -> Self {
        Self {
            per_key: CombinePerKey::new(combine_fn),
        }
    }
}

impl<C, V, A, O> PTransform<V, O> for CombineGlobally<C, V, A, O>
where
    C: CombineFn<V, A, O>,
    V: RFBound,
    A: RFBound,
    O: RFBound,
{
    fn expand(&self, input: PCollection<V>) -> PCollection<O> {
        input
            .map(|v: &V| ((), v.clone()))
            .apply(&self.per_key)
            .map(|kv: &((), O)| kv.1.clone())
    }
}

/* ===================== constructors ===================== */

pub fn combine_per_key<C, V, A, O>(combine_fn: C) -> CombinePerKey<C, V, A, O>
where
    C: CombineFn<V, A, O>,
{
    CombinePerKey::new(combine_fn)
}

pub fn combine_globally<C, V, A, O>(combine_fn: C) -> CombineGlobally<C, V, A, O>
where
    C: CombineFn<V, A, O>,
{
    CombineGlobally::new(combine_fn)
}

pub fn count_per_key<V>() -> CombinePerKey<CountFn, V, u64, u64> {
    CombinePerKey::new(CountFn)
}

pub fn count_globally<V>() -> CombineGlobally<CountFn, V, u64, u64> {
    CombineGlobally::new(CountFn)
}

/* ===================== PCollection helpers ===================== */

impl<T: RFBound> PCollection<T> {
    /// Shorthand for `apply(combine_globally(combine_fn))`.
    pub fn combine_globally<C, A, O>(self, combine_fn: C) -> PCollection<O>
    where
        C: CombineFn<T, A, O>,
        A: RFBound,
        O: RFBound,
    {
        self.apply(CombineGlobally::new(combine_fn))
    }
}

impl<K, V> PCollection<(K, V)>
where
    K: RFBound + Eq + Hash,
    V: RFBound,
{
    /// Shorthand for `apply(combine_per_key(combine_fn))`.
    pub fn combine_per_key<C, A, O>(self, combine_fn: C) -> PCollection<(K, O)>
    where
        C: CombineFn<V, A, O>,
        A: RFBound,
        O: RFBound,
    {
        self.apply(CombinePerKey::new(combine_fn))
    }
}
