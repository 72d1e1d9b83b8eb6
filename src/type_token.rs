//! Type tags and type-erased bundle helpers.
//!
//! This module provides:
//! - [`Partition`]: the opaque buffer a bundle travels in between nodes.
//! - [`TypeTag`]: a lightweight runtime type identifier attached to sources.
//! - [`VecOps`]: a type-erased interface the runner uses to cut a source
//!   `Vec<T>` into bundles of [`WindowedValue<T>`] without knowing `T`.
//! - [`bundle_ref`] / [`into_bundle`]: checked downcasts from a [`Partition`]
//!   back to a typed bundle, returning [`CombineError::TypeMismatch`] instead of
//!   panicking.

use crate::error::CombineError;
use crate::window::WindowedValue;
use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

/// A bundle buffer carried between nodes at runtime.
///
/// Concretely always a `Vec<WindowedValue<T>>` for the producing node's `T`.
pub type Partition = Box<dyn Any + Send + Sync>;

/// A lightweight runtime type tag for debugging and assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag {
    /// Stable Rust type identifier.
    pub id: TypeId,
    /// Human-readable type name (best-effort).
    pub name: &'static str,
}

impl TypeTag {
    /// Construct a tag for `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

/// Type-erased helpers over a source payload `Vec<T>`.
///
/// Implementations return `None` when `data` is not the `Vec<T>` they expect.
pub trait VecOps: Send + Sync {
    /// Number of elements if `data` is a `Vec<T>`.
    fn len(&self, data: &dyn Any) -> Option<usize>;

    /// Cut `data` into at most `n` contiguous bundles of `WindowedValue<T>`.
    ///
    /// Always yields at least one bundle, which may be empty.
    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>>;

    /// Cut `data` into bundles of at most `size` elements each.
    fn chunk(&self, data: &dyn Any, size: usize) -> Option<Vec<Partition>>;
}

pub struct VecOpsImpl<T: Clone + Send + Sync + 'static>(PhantomData<T>);

impl<T: Clone + Send + Sync + 'static> VecOpsImpl<T> {
    fn wrap(chunk: &[T]) -> Partition {
        let bundle: Vec<WindowedValue<T>> = chunk.iter().cloned().map(WindowedValue::new).collect();
        Box::new(bundle)
    }
}

impl<T: Clone + Send + Sync + 'static> VecOps for VecOpsImpl<T> {
    fn len(&self, data: &dyn Any) -> Option<usize> {
        data.downcast_ref::<Vec<T>>().map(Vec::len)
    }

    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>> {
        let v = data.downcast_ref::<Vec<T>>()?;
        if n <= 1 || v.len() <= 1 {
            return Some(vec![Self::wrap(v)]);
        }
        self.chunk(data, v.len().div_ceil(n))
    }

    fn chunk(&self, data: &dyn Any, size: usize) -> Option<Vec<Partition>> {
        let v = data.downcast_ref::<Vec<T>>()?;
        if v.is_empty() {
            return Some(vec![Self::wrap(v)]);
        }
        Some(v.chunks(size.max(1)).map(Self::wrap).collect())
    }
}

/// Create a type-erased `VecOps` for `Vec<T>`.
pub fn vec_ops_for<T: Clone + Send + Sync + 'static>() -> Arc<dyn VecOps> {
    Arc::new(VecOpsImpl::<T>(PhantomData))
}

/// Borrow a partition as a typed bundle.
pub(crate) fn bundle_ref<'a, T: 'static>(
    p: &'a Partition,
    node: &str,
) -> Result<&'a Vec<WindowedValue<T>>, CombineError> {
    p.downcast_ref::<Vec<WindowedValue<T>>>()
        .ok_or_else(|| mismatch::<T>(node))
}

/// Take ownership of a partition as a typed bundle.
pub(crate) fn into_bundle<T: 'static>(
    p: Partition,
    node: &str,
) -> Result<Vec<WindowedValue<T>>, CombineError> {
    p.downcast::<Vec<WindowedValue<T>>>()
        .map(|b| *b)
        .map_err(|_| mismatch::<T>(node))
}

fn mismatch<T: 'static>(node: &str) -> CombineError {
    CombineError::TypeMismatch {
        node: node.to_string(),
        expected: TypeTag::of::<T>().name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_covers_every_element_once() {
        let ops = vec_ops_for::<u32>();
        let data: Vec<u32> = (0..10).collect();
        let parts = ops.split(&data, 3).unwrap();
        assert_eq!(parts.len(), 3);
        let mut seen: Vec<u32> = Vec::new();
        for p in parts {
            seen.extend(into_bundle::<u32>(p, "test").unwrap().into_iter().map(|wv| wv.value));
        }
        assert_eq!(seen, data);
    }

    #[test]
    fn empty_source_yields_one_empty_bundle() {
        let ops = vec_ops_for::<u32>();
        let data: Vec<u32> = vec![];
        let parts = ops.chunk(&data, 4).unwrap();
        assert_eq!(parts.len(), 1);
        assert!(bundle_ref::<u32>(&parts[0], "test").unwrap().is_empty());
    }

    #[test]
    fn wrong_type_is_a_mismatch_not_a_panic() {
        let p: Partition = Box::new(vec![WindowedValue::new(1u8)]);
        let err = bundle_ref::<String>(&p, "map").unwrap_err();
        assert!(matches!(err, CombineError::TypeMismatch { .. }));
    }
}
