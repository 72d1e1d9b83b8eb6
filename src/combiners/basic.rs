//! Basic arithmetic combiners: Sum, Min, Max

use super::{CombineFn, reduce_nonempty};
use crate::error::CombineError;
use anyhow::Result;
use std::marker::PhantomData;
use std::ops::Add;

/* ===================== Sum<T> ===================== */

/// Sum of values.
///
/// - Accumulator: `T`
/// - Output: `T`
///
/// Requires `T: Add<Output=T> + Default`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sum<T>(PhantomData<fn() -> T>);

impl<T> Sum<T> {
    /// Convenience constructor (same as `Default`).
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, T, T> for Sum<T>
where
    T: Add<Output = T> + Default + 'static,
{
    fn create_accumulator(&self) -> Result<T> {
        Ok(T::default())
    }

    fn add_input(&self, acc: T, input: T) -> Result<T> {
        Ok(acc + input)
    }

    fn merge_accumulators(&self, accumulators: Vec<T>) -> Result<T> {
        reduce_nonempty(accumulators, |a, b| a + b)
    }

    fn extract_output(&self, acc: T) -> Result<T> {
        Ok(acc)
    }
}

/* ===================== Min<T> ===================== */

/// Minimum value (requires `Ord`).
///
/// - Accumulator: `Option<T>`
/// - Output: `T`
///
/// Extracting from an accumulator that saw no input fails with
/// [`CombineError::EmptyAccumulator`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Min<T>(PhantomData<fn() -> T>);

impl<T> Min<T> {
    /// Convenience constructor (same as `Default`).
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, Option<T>, T> for Min<T>
where
    T: Ord + 'static,
{
    fn create_accumulator(&self) -> Result<Option<T>> {
        Ok(None)
    }

    fn add_input(&self, acc: Option<T>, input: T) -> Result<Option<T>> {
        Ok(Some(match acc {
            Some(cur) => cur.min(input),
            None => input,
        }))
    }

    fn merge_accumulators(&self, accumulators: Vec<Option<T>>) -> Result<Option<T>> {
        reduce_nonempty(accumulators, |a, b| match (a, b) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        })
    }

    fn extract_output(&self, acc: Option<T>) -> Result<T> {
        acc.ok_or_else(|| CombineError::EmptyAccumulator.into())
    }
}

/* ===================== Max<T> ===================== */

/// Maximum value (requires `Ord`).
///
/// - Accumulator: `Option<T>`
/// - Output: `T`
#[derive(Clone, Copy, Debug, Default)]
pub struct Max<T>(PhantomData<fn() -> T>);

impl<T> Max<T> {
    /// Convenience constructor (same as `Default`).
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, Option<T>, T> for Max<T>
where
    T: Ord + 'static,
{
    fn create_accumulator(&self) -> Result<Option<T>> {
        Ok(None)
    }

    fn add_input(&self, acc: Option<T>, input: T) -> Result<Option<T>> {
        Ok(Some(match acc {
            Some(cur) => cur.max(input),
            None => input,
        }))
    }

    fn merge_accumulators(&self, accumulators: Vec<Option<T>>) -> Result<Option<T>> {
        reduce_nonempty(accumulators, |a, b| match (a, b) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        })
    }

    fn extract_output(&self, acc: Option<T>) -> Result<T> {
        acc.ok_or_else(|| CombineError::EmptyAccumulator.into())
    }
}
