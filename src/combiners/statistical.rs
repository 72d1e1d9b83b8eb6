//! Statistical combiners: `Mean`

use super::{CombineFn, reduce_nonempty};
use anyhow::Result;

/* ===================== Mean ===================== */

/// Arithmetic mean as `f64`.
///
/// Values must be convertible into `f64` via `Into<f64>`.
///
/// - Accumulator: `(sum_f64, count_u64)`
/// - Output: `f64`
///
/// An accumulator with no inputs produces `0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mean;

impl<V> CombineFn<V, (f64, u64), f64> for Mean
where
    V: Into<f64>,
{
    fn create_accumulator(&self) -> Result<(f64, u64)> {
        Ok((0.0, 0))
    }

    fn add_input(&self, acc: (f64, u64), input: V) -> Result<(f64, u64)> {
        Ok((acc.0 + input.into(), acc.1 + 1))
    }

    fn merge_accumulators(&self, accumulators: Vec<(f64, u64)>) -> Result<(f64, u64)> {
        reduce_nonempty(accumulators, |a, b| (a.0 + b.0, a.1 + b.1))
    }

    #[allow(clippy::cast_precision_loss)]
    fn extract_output(&self, acc: (f64, u64)) -> Result<f64> {
        if acc.1 == 0 {
            Ok(0.0)
        } else {
            Ok(acc.0 / (acc.1 as f64))
        }
    }
}
