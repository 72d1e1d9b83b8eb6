//! Graph nodes and their identifiers.
//!
//! A pipeline is a chain of [`Node`]s: one `Source`, then any number of
//! `ParDo` bundle stages and `GroupByKey` shuffles. Nodes hold typed closures
//! behind type-erased signatures so the runner can drive them without generics.

use crate::type_token::{Partition, TypeTag, VecOps};
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/// Unique numeric identifier for a node in a pipeline graph.
///
/// Small, `Copy` and hashable; only the pipeline and runner look inside.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(v: u64) -> Self {
        Self(v)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Runs one bundle through a `DoFn`: borrowed input bundle in, output bundle out.
///
/// The input is borrowed so the runner can replay it on retry.
pub type BundleOp = Arc<dyn Fn(&Partition) -> Result<Partition> + Send + Sync>;

/// Key-based shuffle: all input bundles in, `n` output bundles out, with every
/// value for a key landing in exactly one output bundle.
pub type ShuffleOp = Arc<dyn Fn(Vec<Partition>, usize) -> Result<Vec<Partition>> + Send + Sync>;

#[derive(Clone)]
pub enum Node {
    Source {
        payload: Arc<dyn Any + Send + Sync>,
        vec_ops: Arc<dyn VecOps>,
        elem_tag: TypeTag,
    },
    ParDo {
        name: String,
        op: BundleOp,
    },
    GroupByKey {
        shuffle: ShuffleOp,
    },
}

impl Node {
    /// Short label used in logs and errors.
    pub fn label(&self) -> String {
        match self {
            Node::Source { elem_tag, .. } => format!("Source<{}>", elem_tag.name),
            Node::ParDo { name, .. } => name.clone(),
            Node::GroupByKey { .. } => "GroupByKey".to_string(),
        }
    }
}
