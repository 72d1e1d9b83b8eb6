//! Stage-level behavior of the local-combine and merge `DoFn`s, driven one
//! bundle at a time without a runner.

use anyhow::Result;
use ironcombine::testing::*;
use ironcombine::*;
use std::sync::Arc;

type Local = LocalCombineFn<CountFn, char, u32, u64, u64>;
type Merge = MergeAccumulatorsFn<CountFn, char, u32, u64, u64>;

fn kv<K, V>(k: K, v: V) -> WindowedValue<(K, V)> {
    (k, v).into()
}

fn values<T>(out: BundleOutput<T>) -> Vec<T> {
    out.map(WindowedValue::into_value).collect()
}

#[test]
fn local_combine_emits_one_accumulator_per_key() -> Result<()> {
    let local = Local::new(Arc::new(CountFn));
    let out = local.process_bundle(vec![kv('A', 1), kv('B', 2), kv('A', 3), kv('A', 4)])?;
    assert_kv_collections_equal(values(out), vec![('A', 3), ('B', 1)]);
    Ok(())
}

#[test]
fn local_combine_emits_nothing_for_empty_bundle() -> Result<()> {
    let local = Local::new(Arc::new(CountFn));
    let out = local.process_bundle(Vec::new())?;
    assert_eq!(out.len(), 0);
    Ok(())
}

#[test]
fn local_combine_never_emits_before_finish() -> Result<()> {
    let local = Local::new(Arc::new(CountFn));
    let mut bundle = local.start_bundle();
    bundle.process(kv('A', 1))?;
    bundle.process(kv('A', 2))?;
    // `process` has no output channel; all output comes from finishing.
    let out = values(bundle.finish_bundle()?);
    assert_eq!(out, vec![('A', 2)]);
    Ok(())
}

#[test]
fn bundles_do_not_share_state() -> Result<()> {
    let local = Local::new(Arc::new(CountFn));
    let first = values(local.process_bundle(vec![kv('A', 1), kv('A', 2)])?);
    let second = values(local.process_bundle(vec![kv('A', 3)])?);
    assert_eq!(first, vec![('A', 2)]);
    assert_eq!(second, vec![('A', 1)]);
    Ok(())
}

#[test]
fn local_combine_isolates_keys_under_any_interleaving() -> Result<()> {
    let local = LocalCombineFn::<Sum<u64>, char, u64, u64, u64>::new(Arc::new(Sum::new()));
    let grouped = vec![kv('A', 1), kv('A', 2), kv('B', 10), kv('B', 20)];
    let interleaved = vec![kv('B', 10), kv('A', 1), kv('B', 20), kv('A', 2)];

    let a = values(local.process_bundle(grouped)?);
    let b = values(local.process_bundle(interleaved)?);
    assert_kv_collections_equal(a, vec![('A', 3), ('B', 30)]);
    assert_kv_collections_equal(b, vec![('A', 3), ('B', 30)]);
    Ok(())
}

#[test]
fn merge_collects_groups_split_within_a_bundle() -> Result<()> {
    let merge = Merge::new(Arc::new(CountFn));
    let out = merge.process_bundle(vec![
        kv('A', vec![2, 5]),
        kv('B', vec![1]),
        kv('A', vec![3]),
    ])?;
    assert_kv_collections_equal(values(out), vec![('A', 10), ('B', 1)]);
    Ok(())
}

#[test]
fn merge_skips_keys_without_accumulators() -> Result<()> {
    let merge = Merge::new(Arc::new(CountFn));
    let out = merge.process_bundle(vec![kv('A', vec![]), kv('B', vec![4])])?;
    assert_eq!(values(out), vec![('B', 4)]);
    Ok(())
}

#[test]
fn outputs_carry_no_metadata() -> Result<()> {
    let local = Local::new(Arc::new(CountFn));
    let out: Vec<_> = local
        .process_bundle(vec![kv('A', 1).with_timestamp(1_000)])?
        .collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].timestamp, None);
    assert_eq!(out[0].windows, None);
    assert_eq!(out[0].pane, None);
    Ok(())
}

#[test]
fn windowed_input_is_rejected() {
    let local = Local::new(Arc::new(CountFn));
    let err = local
        .process_bundle(vec![kv('A', 1).with_windows(vec![Window::new(0, 60_000)])])
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CombineError>(),
        Some(CombineError::WindowedInput { .. })
    ));
}

#[test]
fn min_of_nothing_is_an_error_not_a_panic() {
    let err = CombineFn::<u32, _, _>::extract_output(&Min::<u32>::new(), None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CombineError>(),
        Some(CombineError::EmptyAccumulator)
    ));
}
