//! Execution session: owns the persistent variables and the executable cache.
use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, Result};

use crate::config::BenchConfig;
use crate::graph::{Graph, STATE};
use crate::input::{Feeds, InputSource};
use crate::runtime::cache::ExecutableCache;
use crate::runtime::engine::{handle_node, StepContext};
use crate::runtime::executable::{Executable, Signature};
use crate::runtime::trace::{format_event_line, ExecutionTrace, TraceEvent, TraceEventKind, TraceLevel};
use crate::tensor::Tensor;
use crate::timer::Timer;

/// Per-call options, mirroring a run-options record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub trace_level: TraceLevel,
    /// Step index stamped on the trace and on error messages.
    pub step: usize,
}

impl RunOptions {
    pub fn full(step: usize) -> Self {
        Self {
            trace_level: TraceLevel::Full,
            step,
        }
    }
}

/// What a successful step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub step: usize,
    /// Variables committed by this step.
    pub committed: Vec<String>,
    pub cache_hit: bool,
}

#[derive(Debug)]
pub struct Session {
    timer: Timer,
    cache: ExecutableCache,
    variables: BTreeMap<String, Tensor>,
    steps_run: usize,
}

impl Session {
    pub fn open(config: &BenchConfig) -> Self {
        Self::with_cache_depth(config.cache_depth)
    }

    pub fn with_cache_depth(cache_depth: usize) -> Self {
        Self {
            timer: Timer::new(),
            cache: ExecutableCache::new(cache_depth),
            variables: BTreeMap::new(),
            steps_run: 0,
        }
    }

    /// (Re)set every persistent variable of `graph` to its initial fill.
    pub fn initialize(&mut self, graph: &Graph) {
        for decl in graph.vars.values().filter(|decl| decl.is_persistent()) {
            self.variables
                .insert(decl.name.clone(), Tensor::full(&decl.dims, decl.init));
        }
        crate::trace!("initialized {} persistent variables", self.variables.len());
    }

    /// Execute one step of `graph`.
    ///
    /// Nodes run in graph order. Assignments are staged and committed only
    /// after the last node succeeds, so a failed step leaves every variable
    /// as the previous step committed it.
    pub fn run(
        &mut self,
        graph: &Graph,
        feeds: Feeds,
        source: &mut InputSource,
        options: RunOptions,
    ) -> Result<(StepOutput, ExecutionTrace)> {
        let step = options.step;
        let level = options.trace_level;
        let mut trace = ExecutionTrace::new(step);
        let step_span = self.timer.start();

        let signature = Signature::of(graph, &feeds);
        let compile_span = self.timer.start();
        let (executable, cache_hit) = self
            .cache
            .get_or_compile(&signature, || Executable::compile(graph, &feeds, signature.clone()))?;
        let compile_timing = compile_span.stop();
        if !cache_hit && level == TraceLevel::Full {
            trace.push(
                TraceEvent::new(
                    TraceEventKind::Compile,
                    "Compile",
                    compile_timing.start,
                    compile_timing.duration,
                )
                .with_meta("op", "compile")
                .with_meta("signature", signature.as_str())
                .with_meta("nodes", executable.plan.len().to_string()),
            );
        }

        let mut ctx = StepContext {
            step,
            executable: &executable,
            variables: &self.variables,
            source,
            feeds,
            values: HashMap::new(),
            pending: Vec::new(),
        };
        for planned in &executable.plan {
            let event = handle_node(&mut ctx, planned, &self.timer)?;
            if level == TraceLevel::Full {
                if crate::logging::full_enabled() {
                    crate::trace!("{}", format_event_line(step, &event));
                }
                trace.push(event);
            }
        }

        let pending = std::mem::take(&mut ctx.pending);
        drop(ctx);
        let mut committed = Vec::with_capacity(pending.len());
        for (name, value) in pending {
            let slot = self
                .variables
                .get_mut(&name)
                .ok_or_else(|| anyhow!("variable {} is not initialized", name))?;
            *slot = value;
            committed.push(name);
        }

        let step_timing = step_span.stop();
        if level == TraceLevel::Basic {
            trace.push(
                TraceEvent::new(TraceEventKind::Step, "step", step_timing.start, step_timing.duration)
                    .with_meta("op", "step")
                    .with_meta("step", step.to_string()),
            );
        }
        self.steps_run += 1;
        Ok((
            StepOutput {
                step,
                committed,
                cache_hit,
            },
            trace,
        ))
    }

    pub fn variable(&self, name: &str) -> Option<&Tensor> {
        self.variables.get(name)
    }

    /// Current value of the benchmark's state variable.
    pub fn state(&self) -> Result<&Tensor> {
        self.variable(STATE)
            .ok_or_else(|| anyhow!("state variable {} is not initialized", STATE))
    }

    pub fn steps_run(&self) -> usize {
        self.steps_run
    }

    pub fn cache(&self) -> &ExecutableCache {
        &self.cache
    }
}
