//! End-to-end benchmark driver shared by the binary and the tests.
use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::BenchConfig;
use crate::error::{BenchError, BenchResult};
use crate::graph::{compile, Graph, GraphSerialize};
use crate::input::{InputMode, InputSource};
use crate::runtime::{ExecutionLoop, FeedProvider, RunReport, Session};
use crate::tensor::Tensor;
use crate::timeline::{write_timeline, TimelineOptions};

/// Everything a completed run leaves behind.
#[derive(Debug)]
pub struct BenchOutcome {
    pub mode: InputMode,
    pub graph: Graph,
    pub report: RunReport,
    pub final_state: Tensor,
}

/// Compile the graph for `mode` and run `config.steps` steps.
///
/// Compilation problems are configuration errors since nothing has run yet.
/// The first failing step aborts the run.
pub fn run_benchmark(
    mode: InputMode,
    config: &BenchConfig,
    feeds: &mut dyn FeedProvider,
    progress: &mut dyn FnMut(usize),
) -> BenchResult<BenchOutcome> {
    config.validate()?;
    let (graph, contract) = compile(mode, config)
        .map_err(|err| BenchError::configuration(format!("{:#}", err)))?;

    let mut session = Session::open(config);
    session.initialize(&graph);
    let mut source = InputSource::bind(&graph)
        .map_err(|err| BenchError::configuration(format!("{:#}", err)))?;

    let report = ExecutionLoop::new(&mut session, &graph, &contract, config.steps)
        .run(&mut source, feeds, progress)?;

    let final_state = session
        .state()
        .map_err(|err| BenchError::StepExecution {
            step: report.steps().saturating_sub(1),
            source: err,
        })?
        .clone();
    if !final_state.all_finite() {
        crate::warning!("final state of {} run contains non-finite values", mode);
    }

    Ok(BenchOutcome {
        mode,
        graph,
        report,
        final_state,
    })
}

impl BenchOutcome {
    /// Write the timeline artifact, plus the graph JSON when a graph path is
    /// configured. Returns the number of event objects in the timeline.
    pub fn write_artifacts(&self, config: &BenchConfig) -> BenchResult<usize> {
        if let Some(path) = &config.graph_path {
            write_graph(&self.graph, path)?;
        }
        let options = TimelineOptions {
            show_dataflow: config.show_dataflow,
        };
        write_timeline(&config.trace_path, &self.report.traces, options)
    }
}

fn write_graph(graph: &Graph, path: &Path) -> BenchResult<()> {
    let write = || -> anyhow::Result<()> {
        let value = GraphSerialize::json(graph)?;
        let text = serde_json::to_string_pretty(&value)?;
        fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    };
    write().map_err(|source| BenchError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}
