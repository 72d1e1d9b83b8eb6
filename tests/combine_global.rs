use anyhow::Result;
use ironcombine::testing::*;
use ironcombine::*;
use proptest::prelude::*;

#[test]
fn count_globally_example() -> Result<()> {
    let p = TestPipeline::new();
    let out = from_vec(&p, vec![1u32, 2, 3, 4])
        .apply(count_globally())
        .collect_seq()?;
    assert_eq!(out, vec![4]);
    Ok(())
}

#[test]
fn count_globally_large_parallel() -> Result<()> {
    let p = TestPipeline::new();
    let out = from_vec(&p, (0..10_000u64).collect::<Vec<_>>())
        .apply(count_globally())
        .collect_par(None, Some(32))?;
    assert_eq!(out, vec![10_000]);
    Ok(())
}

#[test]
fn sum_globally_with_small_bundles() -> Result<()> {
    let p = TestPipeline::new();
    let runner = Runner {
        bundle_size: Some(7),
        ..Default::default()
    };
    let out = from_vec(&p, (0..100u64).collect::<Vec<_>>())
        .combine_globally(Sum::<u64>::new())
        .collect_with(&runner)?;
    assert_eq!(out, vec![4950]);
    Ok(())
}

#[test]
fn mean_and_max_globally() -> Result<()> {
    let p = TestPipeline::new();
    let mean = from_vec(&p, vec![1u32, 2, 3, 4])
        .combine_globally(Mean)
        .collect_par(None, Some(3))?;
    let max = from_vec(&p, vec!["pear".to_string(), "apple".into(), "zucchini".into()])
        .apply(combine_globally(Max::<String>::new()))
        .collect_seq()?;

    assert_eq!(mean.len(), 1);
    assert!((mean[0] - 2.5).abs() < 1e-12);
    assert_eq!(max, vec!["zucchini".to_string()]);
    Ok(())
}

#[test]
fn empty_input_produces_no_output() -> Result<()> {
    let p = TestPipeline::new();
    let out = from_vec(&p, Vec::<u64>::new())
        .apply(count_globally())
        .collect_seq()?;
    assert!(out.is_empty());
    Ok(())
}

proptest! {
    #[test]
    fn global_matches_manual_single_key_wrapping(
        values in prop::collection::vec(-1_000i64..1_000, 0..300),
        bundle_size in 1usize..64,
    ) {
        let p = TestPipeline::new();
        let runner = Runner {
            bundle_size: Some(bundle_size),
            ..Default::default()
        };

        let global = from_vec(&p, values.clone())
            .combine_globally(Sum::<i64>::new())
            .collect_with(&runner)
            .unwrap();

        let wrapped: Vec<i64> = from_vec(&p, values)
            .key_by(|_| 0u8)
            .combine_per_key(Sum::<i64>::new())
            .collect_with(&runner)
            .unwrap()
            .into_iter()
            .map(|(_, total)| total)
            .collect();

        prop_assert_eq!(global, wrapped);
    }
}
