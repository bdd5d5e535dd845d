use anyhow::Result;
use axpybench::{parse_args, run_benchmark, BenchConfig, BenchError, InputMode, NoFeeds, Tensor};

use crate::common;

#[test]
fn constant_mode_follows_closed_form() -> Result<()> {
    let dir = tempfile::tempdir()?;
    for n in 0..=10 {
        let config = common::small_config(dir.path(), n);
        let outcome =
            run_benchmark(InputMode::Constant, &config, &mut NoFeeds, &mut |_: usize| {})?;
        assert_eq!(outcome.report.steps(), n);
        assert_eq!(outcome.final_state.shape(), &[common::DIM, common::DIM]);
        common::assert_filled(&outcome.final_state, common::closed_form(n, common::DIM));
    }
    Ok(())
}

#[test]
fn constant_and_fed_modes_agree() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = common::small_config(dir.path(), 10);
    let constant = run_benchmark(InputMode::Constant, &config, &mut NoFeeds, &mut |_: usize| {})?;
    let mut feeds = common::ones_and_a_half(common::DIM);
    let fed = run_benchmark(InputMode::Fed, &config, &mut feeds, &mut |_: usize| {})?;
    assert_eq!(constant.final_state, fed.final_state);
    Ok(())
}

#[test]
fn streamed_mode_yields_non_finite_state() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = common::small_config(dir.path(), 3);
    let mut seen = Vec::new();
    let outcome = run_benchmark(InputMode::Streamed, &config, &mut NoFeeds, &mut |step: usize| {
        seen.push(step)
    })?;
    assert_eq!(seen, vec![0, 1, 2]);
    assert!(!outcome.final_state.all_finite());
    Ok(())
}

#[test]
fn missing_feed_stops_the_loop() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = common::small_config(dir.path(), 10);
    let missing_at = 4;
    let mut feeds =
        |step: usize| (step != missing_at).then(|| Tensor::square(common::DIM, 1.5));
    let mut seen = Vec::new();
    let result = run_benchmark(InputMode::Fed, &config, &mut feeds, &mut |step: usize| {
        seen.push(step)
    });
    match result {
        Err(BenchError::MissingFeed { step, name }) => {
            assert_eq!(step, missing_at);
            assert_eq!(name, "alpha");
        }
        other => panic!("expected missing feed, got {:?}", other.map(|o| o.report.steps())),
    }
    assert_eq!(seen, (0..missing_at).collect::<Vec<_>>());
    assert!(!config.trace_path.exists());
    Ok(())
}

#[test]
fn wrong_feed_shape_is_a_step_failure() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = common::small_config(dir.path(), 5);
    let mut feeds = |_step: usize| Some(Tensor::square(common::DIM + 1, 1.5));
    let result = run_benchmark(InputMode::Fed, &config, &mut feeds, &mut |_: usize| {});
    match result {
        Err(err @ BenchError::StepExecution { .. }) => assert_eq!(err.step(), Some(0)),
        other => panic!("expected step failure, got {:?}", other.map(|o| o.report.steps())),
    }
    Ok(())
}

#[test]
fn unrecognized_mode_fails_before_running() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let base = common::small_config(dir.path(), 10);
    let trace_path = base.trace_path.clone();
    let result = parse_args(vec!["placeholders".to_string()], base);
    assert!(matches!(result, Err(BenchError::Configuration(_))));
    assert!(!trace_path.exists());
    Ok(())
}

#[test]
fn invalid_config_is_rejected_up_front() -> Result<()> {
    let config = BenchConfig {
        prefetch_depth: 0,
        ..BenchConfig::default()
    };
    let result = run_benchmark(InputMode::Streamed, &config, &mut NoFeeds, &mut |_: usize| {});
    assert!(matches!(result, Err(BenchError::Configuration(_))));
    Ok(())
}

#[test]
fn graph_export_writes_json() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = common::small_config(dir.path(), 1);
    config.graph_path = Some(dir.path().join("graph.json"));
    let outcome = run_benchmark(InputMode::Streamed, &config, &mut NoFeeds, &mut |_: usize| {})?;
    outcome.write_artifacts(&config)?;
    let text = std::fs::read_to_string(dir.path().join("graph.json"))?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(value["nodes"].as_array().map(Vec::len), Some(4));
    Ok(())
}
