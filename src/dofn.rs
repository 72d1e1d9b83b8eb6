//! Bundle-processing contract.
//!
//! A [`DoFn`] is a stateless description of a stage. For every bundle the
//! engine calls [`DoFn::start_bundle`], which hands back a fresh
//! [`BundleProcessor`] owning all per-bundle state. Elements are fed to it one
//! at a time with [`BundleProcessor::process`]; [`BundleProcessor::finish_bundle`]
//! consumes the processor and returns the bundle's output.
//!
//! Because the processor is a value created per bundle and consumed at the
//! end, its state can never leak into another bundle, another worker or a
//! retry of the same bundle.

use crate::window::WindowedValue;
use anyhow::Result;
use std::vec::IntoIter;

pub trait DoFn<I, O>: Send + Sync + 'static {
    type Processor: BundleProcessor<I, O>;

    /// Begin a bundle with empty per-bundle state.
    fn start_bundle(&self) -> Self::Processor;

    /// Run one whole bundle: start, process every element, finish.
    ///
    /// The first error from `process` or `finish_bundle` aborts the bundle.
    fn process_bundle<It>(&self, elements: It) -> Result<BundleOutput<O>>
    where
        It: IntoIterator<Item = WindowedValue<I>>,
        Self: Sized,
    {
        let mut processor = self.start_bundle();
        for element in elements {
            processor.process(element)?;
        }
        processor.finish_bundle()
    }
}

/// Per-bundle state of a [`DoFn`].
pub trait BundleProcessor<I, O> {
    fn process(&mut self, element: WindowedValue<I>) -> Result<()>;

    /// Complete the bundle, producing everything it emits.
    fn finish_bundle(self) -> Result<BundleOutput<O>>;
}

/// Output of one finished bundle.
///
/// A finite iterator, fully materialized at bundle completion and consumed
/// once; it cannot be restarted.
#[derive(Debug)]
pub struct BundleOutput<O> {
    elements: IntoIter<WindowedValue<O>>,
}

impl<O> From<Vec<WindowedValue<O>>> for BundleOutput<O> {
    fn from(v: Vec<WindowedValue<O>>) -> Self {
        Self {
            elements: v.into_iter(),
        }
    }
}

impl<O> FromIterator<WindowedValue<O>> for BundleOutput<O> {
    fn from_iter<It: IntoIterator<Item = WindowedValue<O>>>(iter: It) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<O> Iterator for BundleOutput<O> {
    type Item = WindowedValue<O>;

    fn next(&mut self) -> Option<Self::Item> {
        self.elements.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.elements.size_hint()
    }
}

impl<O> ExactSizeIterator for BundleOutput<O> {}
