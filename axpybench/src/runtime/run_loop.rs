use std::time::{Duration, Instant};

use crate::error::{BenchError, BenchResult};
use crate::graph::{FeedContract, Graph};
use crate::input::InputSource;
use crate::runtime::session::{RunOptions, Session};
use crate::runtime::trace::{ExecutionTrace, TraceLevel};
use crate::tensor::Tensor;

/// Supplies the caller-side value for a step when the graph needs a feed.
pub trait FeedProvider {
    fn feed(&mut self, step: usize) -> Option<Tensor>;
}

impl<F> FeedProvider for F
where
    F: FnMut(usize) -> Option<Tensor>,
{
    fn feed(&mut self, step: usize) -> Option<Tensor> {
        self(step)
    }
}

/// Provider for graphs that never take feeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeeds;

impl FeedProvider for NoFeeds {
    fn feed(&mut self, _step: usize) -> Option<Tensor> {
        None
    }
}

/// Traces and timings collected by a completed loop.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub traces: Vec<ExecutionTrace>,
    /// Wall time of each step as seen by the loop.
    pub step_durations: Vec<Duration>,
}

impl RunReport {
    pub fn steps(&self) -> usize {
        self.traces.len()
    }

    /// Total number of trace events across every step.
    pub fn event_count(&self) -> usize {
        self.traces.iter().map(ExecutionTrace::len).sum()
    }

    pub fn total_time(&self) -> Duration {
        self.step_durations.iter().sum()
    }
}

/// Drives a fixed number of strictly sequential steps.
pub struct ExecutionLoop<'a> {
    session: &'a mut Session,
    graph: &'a Graph,
    contract: &'a FeedContract,
    steps: usize,
    trace_level: TraceLevel,
}

impl<'a> ExecutionLoop<'a> {
    pub fn new(
        session: &'a mut Session,
        graph: &'a Graph,
        contract: &'a FeedContract,
        steps: usize,
    ) -> Self {
        Self {
            session,
            graph,
            contract,
            steps,
            trace_level: TraceLevel::Full,
        }
    }

    pub fn with_trace_level(mut self, level: TraceLevel) -> Self {
        self.trace_level = level;
        self
    }

    /// Run every step, calling `progress(step)` after each one commits.
    ///
    /// The first failure ends the loop. A missing feed is reported as
    /// [`BenchError::MissingFeed`]; anything that goes wrong inside the
    /// session is wrapped in [`BenchError::StepExecution`]. Nothing is
    /// retried and earlier commits stay in place.
    pub fn run(
        self,
        source: &mut InputSource,
        feeds: &mut dyn FeedProvider,
        progress: &mut dyn FnMut(usize),
    ) -> BenchResult<RunReport> {
        let mut report = RunReport {
            traces: Vec::with_capacity(self.steps),
            step_durations: Vec::with_capacity(self.steps),
        };
        for step in 0..self.steps {
            let supplied = if self.contract.requires_feed() {
                feeds.feed(step)
            } else {
                None
            };
            let feed_map = source.resolve_feed(step, supplied)?;

            let started = Instant::now();
            let options = RunOptions {
                trace_level: self.trace_level,
                step,
            };
            let (_, trace) = self
                .session
                .run(self.graph, feed_map, source, options)
                .map_err(|err| {
                    crate::error!("step {} failed: {:#}", step, err);
                    BenchError::StepExecution { step, source: err }
                })?;
            report.step_durations.push(started.elapsed());
            report.traces.push(trace);
            progress(step);
        }
        Ok(report)
    }
}
