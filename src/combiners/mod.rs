//! The [`CombineFn`] accumulator contract and the built-in combiners.
//!
//! A `CombineFn<I, A, O>` says how to fold inputs `I` into an accumulator
//! `A`, how to merge accumulators, and how to project an accumulator to the
//! final output `O`. It holds no per-run state; the local-combine and merge
//! stages own all accumulators.
//!
//! Built-ins:
//! - [`CountFn`] -- number of inputs.
//! - [`Sum<T>`] -- sum of values.
//! - [`Min<T>`] / [`Max<T>`] -- minimum / maximum (requires `Ord`).
//! - [`Mean`] -- arithmetic mean as `f64`.
//!
//! # Examples
//! ```ignore
//! use ironcombine::*;
//! use ironcombine::combiners::{Sum, Max, Mean};
//!
//! let p = Pipeline::default();
//!
//! let totals = from_vec(&p, vec![('a', 1u64), ('a', 2), ('b', 10)])
//!     .combine_per_key(Sum::<u64>::new())
//!     .collect_seq_sorted_by_key()?;
//!
//! let biggest = from_vec(&p, vec![3u32, 9, 4])
//!     .combine_globally(Max::<u32>::new())
//!     .collect_seq()?;
//! # anyhow::Result::<()>::Ok(())
//! ```

mod basic;
mod count;
mod statistical;

pub use basic::{Max, Min, Sum};
pub use count::CountFn;
pub use statistical::Mean;

use crate::error::CombineError;
use anyhow::Result;

/// Accumulator-based aggregation contract.
///
/// Implementations must be pure: any operation may run any number of times,
/// on any worker, in any interleaving, and a bundle that fails is replayed
/// with identical inputs.
///
/// `merge_accumulators` must be associative and commutative over every
/// accumulator reachable from `create_accumulator` and `add_input`. How many
/// partial accumulators exist for a key, and how they are grouped, depends on
/// bundle splits the combine has no control over.
///
/// Errors returned from any operation are propagated unchanged and fail the
/// enclosing bundle.
pub trait CombineFn<I, A, O>: Send + Sync + 'static {
    /// A fresh, identity-like accumulator.
    fn create_accumulator(&self) -> Result<A>;

    /// Fold one input into `acc`, returning the updated accumulator.
    fn add_input(&self, acc: A, input: I) -> Result<A>;

    /// Merge a non-empty sequence of accumulators, given in arbitrary order.
    ///
    /// The core never calls this with an empty sequence, but implementations
    /// should still reject one with [`CombineError::EmptyMerge`].
    fn merge_accumulators(&self, accumulators: Vec<A>) -> Result<A>;

    /// Final projection, called once per key per successful combine.
    fn extract_output(&self, acc: A) -> Result<O>;
}

/// Pairwise-reduce a non-empty accumulator list.
pub(crate) fn reduce_nonempty<A>(accumulators: Vec<A>, f: impl FnMut(A, A) -> A) -> Result<A> {
    accumulators
        .into_iter()
        .reduce(f)
        .ok_or_else(|| CombineError::EmptyMerge.into())
}
