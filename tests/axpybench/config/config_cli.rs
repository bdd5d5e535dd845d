use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use axpybench::{parse_args, BenchConfig, BenchError, InputMode, DEFAULT_DIM, DEFAULT_STEPS};

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[test]
fn defaults_match_reference_run() {
    let config = BenchConfig::default();
    assert_eq!(config.dim, DEFAULT_DIM);
    assert_eq!(config.steps, DEFAULT_STEPS);
    assert_eq!(config.prefetch_depth, 5);
    assert_eq!(config.trace_path, PathBuf::from("tf_event_trace.json"));
    assert!(!config.show_dataflow);
    assert!(config.graph_path.is_none());
}

#[test]
fn modes_parse_from_command_line_names() -> Result<()> {
    assert_eq!("constant".parse::<InputMode>()?, InputMode::Constant);
    assert_eq!("placeholder".parse::<InputMode>()?, InputMode::Fed);
    assert_eq!("dataset".parse::<InputMode>()?, InputMode::Streamed);
    for mode in InputMode::ALL {
        assert_eq!(mode.to_string().parse::<InputMode>()?, mode);
    }
    assert!(matches!(
        "Constant".parse::<InputMode>(),
        Err(BenchError::Configuration(_))
    ));
    Ok(())
}

#[test]
fn environment_overrides_defaults() -> Result<()> {
    let env = HashMap::from([
        ("AXPYBENCH_DIM", "4"),
        ("AXPYBENCH_STEPS", "3"),
        ("AXPYBENCH_SHOW_DATAFLOW", "yes"),
        ("AXPYBENCH_TRACE_PATH", "out/trace.json"),
    ]);
    let config = BenchConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))?;
    assert_eq!(config.dim, 4);
    assert_eq!(config.steps, 3);
    assert!(config.show_dataflow);
    assert_eq!(config.trace_path, PathBuf::from("out/trace.json"));

    let bad = BenchConfig::from_lookup(|name| (name == "AXPYBENCH_DIM").then(|| "big".to_string()));
    assert!(matches!(bad, Err(BenchError::Configuration(_))));
    let zero = BenchConfig::from_lookup(|name| (name == "AXPYBENCH_DIM").then(|| "0".to_string()));
    assert!(matches!(zero, Err(BenchError::Configuration(_))));
    Ok(())
}

#[test]
fn flags_override_base_config() -> Result<()> {
    let parsed = parse_args(
        args(&[
            "--steps",
            "4",
            "dataset",
            "--dim=8",
            "--show-dataflow",
            "--trace-out",
            "t.json",
            "--graph-out=g.json",
        ]),
        BenchConfig::default(),
    )?;
    assert_eq!(parsed.mode, InputMode::Streamed);
    assert_eq!(parsed.config.steps, 4);
    assert_eq!(parsed.config.dim, 8);
    assert!(parsed.config.show_dataflow);
    assert_eq!(parsed.config.trace_path, PathBuf::from("t.json"));
    assert_eq!(parsed.config.graph_path, Some(PathBuf::from("g.json")));
    Ok(())
}

#[test]
fn bad_command_lines_are_configuration_errors() {
    let cases: &[&[&str]] = &[
        &[],
        &["constantx"],
        &["constant", "dataset"],
        &["constant", "--steps"],
        &["constant", "--steps", "many"],
        &["constant", "--frobnicate"],
    ];
    for case in cases {
        let result = parse_args(args(case), BenchConfig::default());
        assert!(
            matches!(result, Err(BenchError::Configuration(_))),
            "{:?} should be rejected",
            case
        );
    }
}
