use super::{CombineFn, reduce_nonempty};
use anyhow::Result;

/// Counts elements, ignoring their values.
///
/// - Accumulator: `u64`
/// - Output: `u64`
#[derive(Clone, Copy, Debug, Default)]
pub struct CountFn;

impl<I> CombineFn<I, u64, u64> for CountFn {
    fn create_accumulator(&self) -> Result<u64> {
        Ok(0)
    }

    fn add_input(&self, acc: u64, _input: I) -> Result<u64> {
        Ok(acc + 1)
    }

    fn merge_accumulators(&self, accumulators: Vec<u64>) -> Result<u64> {
        reduce_nonempty(accumulators, |a, b| a + b)
    }

    fn extract_output(&self, acc: u64) -> Result<u64> {
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CombineError;

    #[test]
    fn count_contract() {
        let f = CountFn;
        let a = CombineFn::<&str, _, _>::create_accumulator(&f).unwrap();
        let a = f.add_input(a, "x").unwrap();
        let a = f.add_input(a, "y").unwrap();
        let merged = CombineFn::<&str, _, _>::merge_accumulators(&f, vec![a, 3, 0]).unwrap();
        assert_eq!(CombineFn::<&str, _, _>::extract_output(&f, merged).unwrap(), 5);
    }

    #[test]
    fn empty_merge_is_rejected() {
        let err = CombineFn::<u8, _, _>::merge_accumulators(&CountFn, vec![]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CombineError>(),
            Some(CombineError::EmptyMerge)
        ));
    }
}
