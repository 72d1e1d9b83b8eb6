//! In-memory bundle engine.
//!
//! The runner walks the graph back from a terminal node into a linear chain
//! `Source -> (ParDo | GroupByKey)*`, cuts the source into bundles and pushes
//! them through the chain:
//!
//! - `ParDo` runs once per bundle, bundles in parallel under
//!   [`ExecMode::Parallel`]. A failing bundle is replayed from its retained
//!   input up to [`Runner::max_bundle_attempts`] times; the output of a failed
//!   attempt is dropped, never forwarded.
//! - `GroupByKey` is a barrier that regroups every bundle by key into a fresh
//!   set of bundles, one owner bundle per key.

use crate::error::CombineError;
use crate::node::{BundleOp, Node, NodeId};
use crate::pipeline::Pipeline;
use crate::type_token::{Partition, into_bundle};
use crate::window::WindowedValue;
use anyhow::{Result, anyhow};
use rayon::prelude::*;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

/// Execution configuration.
///
/// ```ignore
/// use ironcombine::*;
///
/// let runner = Runner {
///     mode: ExecMode::Parallel { threads: Some(4), partitions: Some(16) },
///     max_bundle_attempts: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug)]
pub struct Runner {
    pub mode: ExecMode,
    /// Source bundle count when `Parallel { partitions: None }`.
    pub default_partitions: usize,
    /// If set, cut the source into bundles of at most this many elements
    /// instead of one bundle per partition.
    pub bundle_size: Option<usize>,
    /// Attempts per bundle before the run fails. Values below 1 mean 1.
    pub max_bundle_attempts: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
            bundle_size: None,
            max_bundle_attempts: 3,
        }
    }
}

impl Runner {
    pub fn run_collect<T: Send + 'static>(&self, p: &Pipeline, terminal: NodeId) -> Result<Vec<T>> {
        let (mut gnodes, edges) = p.snapshot();

        // Linear backwalk: terminal -> ... -> source
        let mut chain: Vec<(NodeId, Node)> = Vec::new();
        let mut cur = terminal;
        loop {
            let n = gnodes.remove(&cur).ok_or(CombineError::MissingNode(cur))?;
            chain.push((cur, n));
            match edges.iter().find(|(_, to)| *to == cur) {
                Some((from, _)) => cur = *from,
                None => break,
            }
        }
        chain.reverse();

        match self.mode {
            ExecMode::Sequential => self.execute::<T>(chain, 1, false),
            ExecMode::Parallel {
                threads,
                partitions,
            } => {
                let parts = partitions.unwrap_or(self.default_partitions).max(1);
                match threads {
                    Some(t) => {
                        let pool = rayon::ThreadPoolBuilder::new().num_threads(t).build()?;
                        pool.install(|| self.execute::<T>(chain, parts, true))
                    }
                    None => self.execute::<T>(chain, parts, true),
                }
            }
        }
    }

    fn execute<T: Send + 'static>(
        &self,
        chain: Vec<(NodeId, Node)>,
        partitions: usize,
        parallel: bool,
    ) -> Result<Vec<T>> {
        let mut nodes = chain.into_iter();
        let (_, head) = nodes
            .next()
            .ok_or_else(|| anyhow!("empty execution chain"))?;

        let mut bundles: Vec<Partition> = match head {
            Node::Source {
                payload,
                vec_ops,
                elem_tag,
            } => {
                let len = vec_ops.len(&*payload).unwrap_or(0);
                let cut = match self.bundle_size {
                    Some(size) => vec_ops.chunk(&*payload, size),
                    None => vec_ops.split(&*payload, partitions.min(len.max(1))),
                };
                cut.ok_or_else(|| CombineError::TypeMismatch {
                    node: format!("Source<{}>", elem_tag.name),
                    expected: elem_tag.name,
                })?
            }
            other => return Err(CombineError::NotASource(other.label()).into()),
        };
        debug!(bundles = bundles.len(), parallel, "source split");

        for (id, node) in nodes {
            bundles = match node {
                Node::ParDo { name, op } => {
                    debug!(
                        stage = %name,
                        node = id.raw(),
                        bundles = bundles.len(),
                        "running stage"
                    );
                    if parallel {
                        bundles
                            .par_iter()
                            .map(|b| self.run_bundle(&name, &op, b))
                            .collect::<Result<Vec<_>>>()?
                    } else {
                        bundles
                            .iter()
                            .map(|b| self.run_bundle(&name, &op, b))
                            .collect::<Result<Vec<_>>>()?
                    }
                }
                Node::GroupByKey { shuffle } => {
                    debug!(node = id.raw(), bundles = bundles.len(), "shuffling");
                    shuffle(bundles, partitions)?
                }
                source @ Node::Source { .. } => {
                    return Err(CombineError::UnexpectedSource(source.label()).into());
                }
            };
        }

        let mut out = Vec::new();
        for b in bundles {
            out.extend(
                into_bundle::<T>(b, "terminal")?
                    .into_iter()
                    .map(WindowedValue::into_value),
            );
        }
        Ok(out)
    }

    /// Run one bundle, replaying it on failure.
    ///
    /// The user's error is returned as-is (with context), so callers can still
    /// downcast to it.
    fn run_bundle(&self, stage: &str, op: &BundleOp, input: &Partition) -> Result<Partition> {
        let max = self.max_bundle_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(input) {
                Ok(out) => return Ok(out),
                Err(err) if attempt < max => {
                    warn!(stage, attempt, error = %err, "bundle failed; retrying");
                    attempt += 1;
                }
                Err(err) => {
                    return Err(err.context(format!(
                        "stage `{stage}` failed after {attempt} attempt(s)"
                    )));
                }
            }
        }
    }
}
