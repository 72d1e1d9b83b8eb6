//! [`PCollection`] and the primitive graph-building operations.
//!
//! Everything here is declarative: each method inserts a node into the shared
//! [`Pipeline`] graph and returns a handle to the new collection. Nothing runs
//! until one of the `collect_*` methods hands the graph to a [`Runner`].

use crate::dofn::{BundleOutput, BundleProcessor, DoFn};
use crate::node::{BundleOp, Node, NodeId, ShuffleOp};
use crate::pipeline::Pipeline;
use crate::runner::{ExecMode, Runner};
use crate::transform::PTransform;
use crate::type_token::{Partition, bundle_ref, into_bundle};
use crate::window::WindowedValue;
use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, RandomState};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Bound for every element type that can live in a [`PCollection`].
///
/// Elements (and combine accumulators, which cross the shuffle) must be
/// cloneable for bundle retries and encodable so they could cross a worker
/// boundary.
pub trait RFBound: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}
impl<T> RFBound for T where T: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}

#[derive(Clone)]
pub struct PCollection<T> {
    pub(crate) pipeline: Pipeline,
    pub(crate) id: NodeId,
    _t: PhantomData<T>,
}

/// Create a source collection from an in-memory vector.
pub fn from_vec<T: RFBound>(p: &Pipeline, data: Vec<T>) -> PCollection<T> {
    let id = p.add_source(data);
    PCollection {
        pipeline: p.clone(),
        id,
        _t: PhantomData,
    }
}

/* ---------- element-wise map as a DoFn ---------- */

struct MapFn<I, O, F> {
    f: Arc<F>,
    _m: PhantomData<fn(I) -> O>,
}

struct MapProcessor<I, O, F> {
    f: Arc<F>,
    out: Vec<WindowedValue<O>>,
    _m: PhantomData<fn(I)>,
}

impl<I, O, F> DoFn<I, O> for MapFn<I, O, F>
where
    I: 'static,
    O: 'static,
    F: Fn(&I) -> O + Send + Sync + 'static,
{
    type Processor = MapProcessor<I, O, F>;

    fn start_bundle(&self) -> Self::Processor {
        MapProcessor {
            f: Arc::clone(&self.f),
            out: Vec::new(),
            _m: PhantomData,
        }
    }
}

impl<I, O, F> BundleProcessor<I, O> for MapProcessor<I, O, F>
where
    F: Fn(&I) -> O,
{
    fn process(&mut self, element: WindowedValue<I>) -> Result<()> {
        let f = &self.f;
        self.out.push(element.map(|v| f(&v)));
        Ok(())
    }

    fn finish_bundle(self) -> Result<BundleOutput<O>> {
        Ok(BundleOutput::from(self.out))
    }
}

impl<T: RFBound> PCollection<T> {
    pub(crate) fn successor<O>(self, node: Node) -> PCollection<O> {
        let id = self.pipeline.insert_node(node);
        self.pipeline.connect(self.id, id);
        PCollection {
            pipeline: self.pipeline,
            id,
            _t: PhantomData,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    /// Run `dofn` over every bundle of this collection.
    ///
    /// `name` labels the stage in logs and errors.
    pub fn par_do<O, D>(self, name: impl Into<String>, dofn: D) -> PCollection<O>
    where
        O: RFBound,
        D: DoFn<T, O>,
    {
        let name = name.into();
        let dofn = Arc::new(dofn);
        let op: BundleOp = {
            let name = name.clone();
            Arc::new(move |p: &Partition| -> Result<Partition> {
                let input = bundle_ref::<T>(p, &name)?;
                let output: Vec<WindowedValue<O>> =
                    dofn.process_bundle(input.iter().cloned())?.collect();
                Ok(Box::new(output) as Partition)
            })
        };
        self.successor(Node::ParDo { name, op })
    }

    /// Transform every element, keeping its metadata.
    pub fn map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: Fn(&T) -> O + Send + Sync + 'static,
    {
        let dofn = MapFn {
            f: Arc::new(f),
            _m: PhantomData,
        };
        self.par_do("Map", dofn)
    }

    /// Derive a key and produce `(K, T)`.
    pub fn key_by<K, F>(self, key_fn: F) -> PCollection<(K, T)>
    where
        K: RFBound + Eq + Hash,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.map(move |t| (key_fn(t), t.clone()))
    }

    /// Expand a composite transform onto this collection.
    pub fn apply<O, P>(self, transform: P) -> PCollection<O>
    where
        P: PTransform<T, O>,
    {
        transform.expand(self)
    }

    pub fn collect_seq(self) -> Result<Vec<T>> {
        let r = Runner {
            mode: ExecMode::Sequential,
            ..Default::default()
        };
        self.collect_with(&r)
    }

    pub fn collect_par(self, threads: Option<usize>, partitions: Option<usize>) -> Result<Vec<T>> {
        let r = Runner {
            mode: ExecMode::Parallel {
                threads,
                partitions,
            },
            ..Default::default()
        };
        self.collect_with(&r)
    }

    pub fn collect_with(self, runner: &Runner) -> Result<Vec<T>> {
        runner.run_collect::<T>(&self.pipeline, self.id)
    }
}

impl<K, V> PCollection<(K, V)>
where
    K: RFBound + Eq + Hash,
    V: RFBound,
{
    /// Group values by key: `(K, V)` -> `(K, Vec<V>)`.
    ///
    /// A barrier: every value for a key ends up in the same output bundle,
    /// in no particular order. Element metadata is not carried across.
    pub fn group_by_key(self) -> PCollection<(K, Vec<V>)> {
        let shuffle: ShuffleOp = Arc::new(
            |bundles: Vec<Partition>, n: usize| -> Result<Vec<Partition>> {
                let mut groups: HashMap<K, Vec<V>> = HashMap::new();
                for b in bundles {
                    for wv in into_bundle::<(K, V)>(b, "GroupByKey")? {
                        let (k, v) = wv.value;
                        groups.entry(k).or_default().push(v);
                    }
                }

                let n = n.max(1);
                let hasher = RandomState::new();
                let mut buckets: Vec<Vec<WindowedValue<(K, Vec<V>)>>> =
                    (0..n).map(|_| Vec::new()).collect();
                let keys = groups.len();
                for (k, vs) in groups {
                    let idx = (hasher.hash_one(&k) % n as u64) as usize;
                    buckets[idx].push(WindowedValue::new((k, vs)));
                }
                debug!(keys, bundles = n, "shuffle complete");
                Ok(buckets
                    .into_iter()
                    .map(|b| Box::new(b) as Partition)
                    .collect())
            },
        );
        self.successor(Node::GroupByKey { shuffle })
    }

    /// Transform values while preserving keys.
    pub fn map_values<O, F>(self, f: F) -> PCollection<(K, O)>
    where
        O: RFBound,
        F: Fn(&V) -> O + Send + Sync + 'static,
    {
        self.map(move |kv: &(K, V)| (kv.0.clone(), f(&kv.1)))
    }
}

impl<K, V> PCollection<(K, V)>
where
    K: RFBound + Ord,
    V: RFBound,
{
    pub fn collect_seq_sorted_by_key(self) -> Result<Vec<(K, V)>> {
        let mut v = self.collect_seq()?;
        v.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(v)
    }

    pub fn collect_par_sorted_by_key(
        self,
        threads: Option<usize>,
        partitions: Option<usize>,
    ) -> Result<Vec<(K, V)>> {
        let mut v = self.collect_par(threads, partitions)?;
        v.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(v)
    }
}
