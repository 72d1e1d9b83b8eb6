use crate::node::{Node, NodeId};
use crate::type_token::{TypeTag, vec_ops_for};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Container for the computation graph.
///
/// Cloning is cheap and shares the same graph; every [`PCollection`](crate::PCollection)
/// holds one. Building the graph never executes anything.
#[derive(Clone)]
pub struct Pipeline {
    pub(crate) inner: Arc<Mutex<PipelineInner>>,
}

pub struct PipelineInner {
    pub next_id: u64,
    pub nodes: HashMap<NodeId, Node>,
    pub edges: Vec<(NodeId, NodeId)>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PipelineInner {
                next_id: 0,
                nodes: HashMap::new(),
                edges: Vec::new(),
            })),
        }
    }
}

impl Pipeline {
    // Graph mutations are single statements; a poisoned lock still holds a
    // consistent graph.
    fn lock(&self) -> MutexGuard<'_, PipelineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert_node(&self, node: Node) -> NodeId {
        let mut g = self.lock();
        let id = NodeId::new(g.next_id);
        g.next_id += 1;
        g.nodes.insert(id, node);
        id
    }

    pub(crate) fn connect(&self, from: NodeId, to: NodeId) {
        self.lock().edges.push((from, to));
    }

    pub(crate) fn add_source<T: Clone + Send + Sync + 'static>(&self, data: Vec<T>) -> NodeId {
        self.insert_node(Node::Source {
            payload: Arc::new(data),
            vec_ops: vec_ops_for::<T>(),
            elem_tag: TypeTag::of::<T>(),
        })
    }

    /// Clone out the current nodes and edges.
    pub fn snapshot(&self) -> (HashMap<NodeId, Node>, Vec<(NodeId, NodeId)>) {
        let g = self.lock();
        (g.nodes.clone(), g.edges.clone())
    }
}
