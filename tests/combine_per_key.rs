use anyhow::Result;
use ironcombine::testing::*;
use ironcombine::*;

fn abc_input() -> Vec<(char, u32)> {
    vec![('A', 1), ('B', 2), ('A', 3)]
}

#[test]
fn count_per_key_example() -> Result<()> {
    let p = TestPipeline::new();
    let out = from_vec(&p, abc_input())
        .apply(count_per_key())
        .collect_seq()?;
    assert_kv_collections_equal(out, vec![('A', 2u64), ('B', 1)]);
    Ok(())
}

#[test]
fn count_per_key_parallel_matches_sequential() -> Result<()> {
    let p = TestPipeline::new();
    let words: Vec<String> = (0..20_000).map(|i| format!("w{}", i % 137)).collect();

    let seq = from_vec(&p, words.clone())
        .key_by(|w: &String| w.clone())
        .combine_per_key(CountFn)
        .collect_seq_sorted_by_key()?;
    let par = from_vec(&p, words)
        .key_by(|w: &String| w.clone())
        .combine_per_key(CountFn)
        .collect_par_sorted_by_key(Some(4), Some(16))?;

    assert_eq!(seq.len(), 137);
    assert_eq!(seq, par);
    // 20_000 = 137 * 145 + 135, so the first 135 words get one extra.
    assert_eq!(seq.iter().map(|(_, c)| c).sum::<u64>(), 20_000);
    Ok(())
}

#[test]
fn sum_min_max_mean_per_key() -> Result<()> {
    let p = TestPipeline::new();
    let xs: Vec<u32> = (0..100).collect();

    let sum = from_vec(&p, xs.clone())
        .key_by(|x| x % 3)
        .combine_per_key(Sum::<u32>::new())
        .collect_par_sorted_by_key(None, Some(7))?;
    let min = from_vec(&p, xs.clone())
        .key_by(|x| x % 3)
        .combine_per_key(Min::<u32>::new())
        .collect_par_sorted_by_key(None, Some(7))?;
    let max = from_vec(&p, xs.clone())
        .key_by(|x| x % 3)
        .combine_per_key(Max::<u32>::new())
        .collect_par_sorted_by_key(None, Some(7))?;
    let mean = from_vec(&p, xs)
        .key_by(|x| x % 2)
        .combine_per_key(Mean)
        .collect_seq_sorted_by_key()?;

    // key 0: 0, 3, ..., 99 (34 values); key 1: 1..=97 (33); key 2: 2..=98 (33)
    assert_eq!(sum, vec![(0, 1683), (1, 1617), (2, 1650)]);
    assert_eq!(min, vec![(0, 0), (1, 1), (2, 2)]);
    assert_eq!(max, vec![(0, 99), (1, 97), (2, 98)]);
    assert_eq!(mean.len(), 2);
    assert!((mean[0].1 - 49.0).abs() < 1e-9);
    assert!((mean[1].1 - 50.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn every_key_appears_exactly_once_for_any_bundle_size() -> Result<()> {
    let input: Vec<(u8, u32)> = (0..1_000u32).map(|i| ((i % 10) as u8, i)).collect();
    let expected: Vec<(u8, u64)> = (0..10u8).map(|k| (k, 100)).collect();

    for bundle_size in [1usize, 3, 64, 1_000, 5_000] {
        let p = TestPipeline::new();
        let runner = Runner {
            bundle_size: Some(bundle_size),
            ..Default::default()
        };
        let out = from_vec(&p, input.clone())
            .combine_per_key(CountFn)
            .collect_with(&runner)?;
        assert_kv_collections_equal(out, expected.clone());
    }
    Ok(())
}

#[test]
fn keys_do_not_leak_into_each_other() -> Result<()> {
    let p = TestPipeline::new();
    // Interleave keys so every bundle mixes them.
    let input: Vec<(String, u64)> = (0..600u64)
        .map(|i| {
            let key = ["x", "y", "z"][(i % 3) as usize].to_string();
            (key, if i % 3 == 0 { 1 } else { 1_000 })
        })
        .collect();

    let out = from_vec(&p, input)
        .combine_per_key(Sum::<u64>::new())
        .collect_par_sorted_by_key(None, Some(9))?;

    assert_eq!(
        out,
        vec![
            ("x".to_string(), 200),
            ("y".to_string(), 200_000),
            ("z".to_string(), 200_000),
        ]
    );
    Ok(())
}

#[test]
fn empty_input_produces_no_keys() -> Result<()> {
    let p = TestPipeline::new();
    let out = from_vec(&p, Vec::<(char, u32)>::new())
        .combine_per_key(CountFn)
        .collect_par(None, Some(4))?;
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn mean_of_scaled_values_per_key() -> Result<()> {
    let p = TestPipeline::new();
    let out = from_vec(&p, vec![('a', 1u32), ('b', 10), ('a', 3)])
        .map_values(|v| v * 2)
        .combine_per_key(Mean)
        .collect_seq_sorted_by_key()?;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].0, 'a');
    assert!((out[0].1 - 4.0).abs() < 1e-12);
    assert_eq!(out[1].0, 'b');
    assert!((out[1].1 - 20.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn expansion_is_local_combine_shuffle_merge() {
    let p = TestPipeline::new();
    let _ = from_vec(&p, abc_input()).apply(count_per_key());

    assert_eq!(
        p.node_labels()[1..],
        [
            "CombinePerKey/LocalCombine".to_string(),
            "GroupByKey".to_string(),
            "CombinePerKey/MergeAccumulators".to_string(),
        ]
    );
    assert_eq!(p.node_count(), 4);
    assert_eq!(p.edge_count(), 3);
}
