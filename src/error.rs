//! Error taxonomy for the combine core and the in-memory engine.
//!
//! User-supplied [`CombineFn`](crate::CombineFn) operations report failures as
//! plain [`anyhow::Error`]s; those are never wrapped in a [`CombineError`], so
//! callers can still `downcast_ref` to their own error type. `CombineError`
//! covers the failures the core and the engine raise themselves.

use crate::node::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CombineError {
    /// `merge_accumulators` was handed an empty sequence.
    #[error("merge_accumulators called with no accumulators")]
    EmptyMerge,

    /// `extract_output` was called on an accumulator that never saw an input
    /// and has no identity output (e.g. `Min` / `Max`).
    #[error("extract_output called on an accumulator with no inputs")]
    EmptyAccumulator,

    /// A type-erased bundle did not hold the element type the node expected.
    #[error("type mismatch at `{node}`: expected a bundle of {expected}")]
    TypeMismatch {
        node: String,
        expected: &'static str,
    },

    #[error("node {0:?} not found in pipeline graph")]
    MissingNode(NodeId),

    #[error("plan must start with a source node; found `{0}`")]
    NotASource(String),

    #[error("unexpected source node `{0}` in the middle of a plan")]
    UnexpectedSource(String),

    /// Combine only supports the single global window; an element arrived
    /// with an explicit window assignment.
    #[error("stage `{stage}` received an element with explicit windows; windowed combining is not supported")]
    WindowedInput { stage: &'static str },
}
