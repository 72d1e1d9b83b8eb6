//! # ironcombine
//!
//! **Associative, distributable aggregation** for Beam-style batch pipelines.
//! Reduce a collection, optionally keyed, to one result per key (or one global
//! result) through a user-supplied accumulator contract, without ever
//! materializing all values of a key in one place.
//!
//! ## Key Features
//!
//! - **[`CombineFn`] contract** - `create_accumulator`, `add_input`,
//!   `merge_accumulators`, `extract_output`
//! - **Two-phase execution** - a pre-shuffle local combine per bundle, then a
//!   post-shuffle merge per key
//! - **[`CombinePerKey`] / [`CombineGlobally`]** - composite transforms built
//!   from the same two stages
//! - **Built-in combiners** - [`CountFn`], [`Sum`], [`Min`], [`Max`], [`Mean`]
//! - **In-memory runner** - sequential or Rayon-parallel bundles, bundle retry
//!
//! ## Quick Start
//!
//! ```ignore
//! use ironcombine::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let p = Pipeline::default();
//!
//! let total = from_vec(&p, vec![1u32, 2, 3, 4])
//!     .apply(count_globally())
//!     .collect_seq()?;
//! assert_eq!(total, vec![4]);
//!
//! let per_key = from_vec(&p, vec![("A".to_string(), 1u32), ("B".into(), 2), ("A".into(), 3)])
//!     .combine_per_key(CountFn)
//!     .collect_par_sorted_by_key(None, Some(4))?;
//! assert_eq!(per_key, vec![("A".to_string(), 2), ("B".to_string(), 1)]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Pipeline and PCollection
//!
//! A [`Pipeline`] holds the computation graph; a [`PCollection<T>`] is a handle
//! to one node's output. Building a pipeline only records nodes. Execution
//! happens when a `collect_*` method hands the graph to a [`Runner`].
//!
//! ### Bundles
//!
//! The runner cuts the source into bundles. A stage is a [`DoFn`]: per bundle
//! it creates a [`BundleProcessor`] that owns all per-bundle state, feeds it
//! every element, then consumes it to get the bundle's [`BundleOutput`].
//!
//! ### Combining
//!
//! [`CombinePerKey`] expands to `LocalCombine -> GroupByKey -> MergeAccumulators`.
//! Because `merge_accumulators` is associative and commutative, the result
//! does not depend on how elements were split into bundles or in which order
//! bundles finished.
//!
//! ## Module Overview
//!
//! - [`combiners`] - the `CombineFn` trait and built-in combiners
//! - [`combine`] - local/merge stages and the combine transforms
//! - [`collection`] - `PCollection` and the primitive operations
//! - [`dofn`] - the bundle-processing contract
//! - [`runner`] - the in-memory execution engine
//! - [`testing`] - helpers for pipeline tests

pub mod collection;
pub mod combine;
pub mod combiners;
pub mod dofn;
pub mod error;
pub mod node;
pub mod pipeline;
pub mod runner;
pub mod testing;
pub mod transform;
pub mod type_token;
pub mod window;

pub use collection::{PCollection, RFBound, from_vec};
pub use combine::{
    CombineGlobally, CombinePerKey, LocalCombineFn, MergeAccumulatorsFn, combine_globally,
    combine_per_key, count_globally, count_per_key,
};
pub use combiners::{CombineFn, CountFn, Max, Mean, Min, Sum};
pub use dofn::{BundleOutput, BundleProcessor, DoFn};
pub use error::CombineError;
pub use node::NodeId;
pub use pipeline::Pipeline;
pub use runner::{ExecMode, Runner};
pub use transform::PTransform;
pub use type_token::Partition;
pub use window::{PaneInfo, TimestampMs, Window, WindowedValue};
