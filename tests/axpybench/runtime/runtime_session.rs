use anyhow::Result;
use axpybench::{
    compile, BenchConfig, BenchError, Executable, ExecutableCache, ExecutionLoop, Feeds,
    InputMode, InputSource, NoFeeds, RunOptions, Session, Signature, Tensor, TraceEventKind,
    TraceLevel, INPUT,
};

use crate::common;

fn small() -> BenchConfig {
    BenchConfig {
        dim: common::DIM,
        ..BenchConfig::default()
    }
}

#[test]
fn compile_event_only_on_cache_miss() -> Result<()> {
    let config = small();
    let (graph, _) = compile(InputMode::Constant, &config)?;
    let mut session = Session::open(&config);
    session.initialize(&graph);
    let mut source = InputSource::bind(&graph)?;

    for step in 0..3 {
        let (out, trace) =
            session.run(&graph, Feeds::new(), &mut source, RunOptions::full(step))?;
        assert_eq!(out.step, step);
        assert_eq!(out.committed, vec!["x".to_string()]);
        assert_eq!(out.cache_hit, step > 0);
        let compiles = trace.of_kind(TraceEventKind::Compile).count();
        assert_eq!(compiles, usize::from(step == 0));
        if step == 0 {
            assert_eq!(trace.events[0].kind, TraceEventKind::Compile);
        }
        let names = trace
            .events
            .iter()
            .filter(|event| event.kind != TraceEventKind::Compile)
            .map(|event| event.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![INPUT, "MatMul", "add", "Assign"]);
        assert!(trace.events.iter().all(|event| event.end() >= event.start));
    }
    assert_eq!(session.cache().len(), 1);
    assert_eq!(session.steps_run(), 3);
    common::assert_filled(session.state()?, common::closed_form(3, common::DIM));
    Ok(())
}

#[test]
fn trace_levels_control_event_volume() -> Result<()> {
    let config = small();
    let (graph, _) = compile(InputMode::Constant, &config)?;
    for (level, expected) in [(TraceLevel::Off, 0), (TraceLevel::Basic, 1)] {
        let mut session = Session::open(&config);
        session.initialize(&graph);
        let mut source = InputSource::bind(&graph)?;
        let options = RunOptions {
            trace_level: level,
            step: 0,
        };
        let (_, trace) = session.run(&graph, Feeds::new(), &mut source, options)?;
        assert_eq!(trace.len(), expected, "{:?}", level);
        // State still advances with tracing off.
        common::assert_filled(session.state()?, 1.0);
    }
    Ok(())
}

#[test]
fn op_events_carry_node_identity() -> Result<()> {
    let config = small();
    let (graph, _) = compile(InputMode::Constant, &config)?;
    let mut session = Session::open(&config);
    session.initialize(&graph);
    let mut source = InputSource::bind(&graph)?;
    let (_, trace) = session.run(&graph, Feeds::new(), &mut source, RunOptions::full(0))?;

    let matmul = trace
        .events
        .iter()
        .find(|event| event.name == "MatMul")
        .expect("matmul event");
    assert_eq!(matmul.kind, TraceEventKind::OpExecute);
    assert_eq!(matmul.inputs(), vec![INPUT, "x"]);
    assert_eq!(matmul.metadata.get("op").map(String::as_str), Some("matmul"));
    assert_eq!(matmul.node_uuid, graph.node("MatMul").map(|node| node.uuid));
    Ok(())
}

#[test]
fn failed_step_keeps_committed_state() -> Result<()> {
    let config = small();
    let (graph, contract) = compile(InputMode::Fed, &config)?;
    let mut session = Session::open(&config);
    session.initialize(&graph);
    let mut source = InputSource::bind(&graph)?;

    let fail_at = 3;
    let mut feeds = |step: usize| {
        let dim = if step == fail_at { 3 } else { common::DIM };
        Some(Tensor::square(dim, 1.5))
    };
    let mut seen = Vec::new();
    let mut progress = |step: usize| seen.push(step);
    let result = ExecutionLoop::new(&mut session, &graph, &contract, 10)
        .run(&mut source, &mut feeds, &mut progress);

    match result {
        Err(BenchError::StepExecution { step, .. }) => assert_eq!(step, fail_at),
        other => panic!("expected step failure, got {:?}", other.map(|r| r.steps())),
    }
    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(session.steps_run(), fail_at);
    common::assert_filled(session.state()?, common::closed_form(fail_at, common::DIM));
    Ok(())
}

#[test]
fn loop_without_feeds_reports_every_step() -> Result<()> {
    let config = small();
    let (graph, contract) = compile(InputMode::Constant, &config)?;
    let mut session = Session::open(&config);
    session.initialize(&graph);
    let mut source = InputSource::bind(&graph)?;
    let mut seen = Vec::new();
    let report = ExecutionLoop::new(&mut session, &graph, &contract, 4)
        .with_trace_level(TraceLevel::Basic)
        .run(&mut source, &mut NoFeeds, &mut |step: usize| seen.push(step))?;
    assert_eq!(seen, vec![0, 1, 2, 3]);
    assert_eq!(report.steps(), 4);
    assert_eq!(report.event_count(), 4);
    assert_eq!(report.step_durations.len(), 4);
    assert!(report
        .traces
        .iter()
        .enumerate()
        .all(|(idx, trace)| trace.step == idx));
    Ok(())
}

#[test]
fn cache_evicts_least_recently_used() -> Result<()> {
    let config = small();
    let feeds = Feeds::new();
    let graphs = (0..3)
        .map(|_| compile(InputMode::Constant, &config).map(|(graph, _)| graph))
        .collect::<Result<Vec<_>>>()?;
    let sigs = graphs
        .iter()
        .map(|graph| Signature::of(graph, &feeds))
        .collect::<Vec<_>>();

    let mut cache = ExecutableCache::new(2);
    let mut compiles = 0;
    for (idx, expect_hit) in [(0, false), (1, false), (0, true), (2, false)] {
        let (_, hit) = cache.get_or_compile(&sigs[idx], || {
            compiles += 1;
            Executable::compile(&graphs[idx], &feeds, sigs[idx].clone())
        })?;
        assert_eq!(hit, expect_hit, "lookup of graph {}", idx);
    }
    assert_eq!(compiles, 3);
    assert_eq!(cache.len(), 2);
    assert!(cache.contains(&sigs[0]));
    assert!(!cache.contains(&sigs[1]));
    assert!(cache.contains(&sigs[2]));
    Ok(())
}

#[test]
fn unfed_sources_ignore_supplied_values() -> Result<()> {
    let config = small();
    for mode in [InputMode::Constant, InputMode::Streamed] {
        let (graph, _) = compile(mode, &config)?;
        let source = InputSource::bind(&graph)?;
        let feeds = source.resolve_feed(0, Some(Tensor::square(common::DIM, 1.5)))?;
        assert!(feeds.is_empty(), "{:?} source kept a feed", mode);
        assert!(source.resolve_feed(1, None)?.is_empty());
    }

    let (graph, _) = compile(InputMode::Fed, &config)?;
    let source = InputSource::bind(&graph)?;
    let feeds = source.resolve_feed(0, Some(Tensor::square(common::DIM, 1.5)))?;
    assert!(feeds.get(INPUT).is_some());
    Ok(())
}
