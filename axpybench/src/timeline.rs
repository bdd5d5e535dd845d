//! Timeline artifact writer.
//!
//! Traces are rendered as Chrome trace-event objects and written one per
//! line, each followed by a comma, after an opening `[` line. The closing
//! `]` is never written: consumers of the artifact already patch it up, so
//! the layout is kept exactly as it has always been produced.
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{BenchError, BenchResult};
use crate::runtime::{ExecutionTrace, TraceEvent};

/// Rendering options for the timeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineOptions {
    /// Add flow events linking each producer to its consumers.
    pub show_dataflow: bool,
}

/// One Chrome trace-event object.
#[derive(Debug, Clone, Serialize)]
pub struct ChromeEvent {
    pub name: String,
    pub cat: String,
    pub ph: &'static str,
    pub pid: u32,
    pub tid: u32,
    /// Microseconds since the Unix epoch.
    pub ts: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
}

fn micros(duration: std::time::Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000.0
}

fn complete_event(event: &TraceEvent) -> ChromeEvent {
    let mut args = Map::new();
    args.insert("name".to_string(), Value::String(event.name.clone()));
    if let Some(uuid) = event.node_uuid {
        args.insert("node_uuid".to_string(), Value::String(uuid.to_string()));
    }
    for (key, value) in &event.metadata {
        args.insert(key.clone(), Value::String(value.clone()));
    }
    let name = event
        .metadata
        .get("op")
        .cloned()
        .unwrap_or_else(|| event.name.clone());
    ChromeEvent {
        name,
        cat: event.kind.category().to_string(),
        ph: "X",
        pid: 0,
        tid: 0,
        ts: micros(event.start),
        dur: Some(micros(event.duration)),
        id: None,
        args,
    }
}

fn flow_event(ph: &'static str, name: &str, ts: f64, id: u64) -> ChromeEvent {
    ChromeEvent {
        name: name.to_string(),
        cat: "DataFlow".to_string(),
        ph,
        pid: 0,
        tid: 0,
        ts,
        dur: None,
        id: Some(id),
        args: Map::new(),
    }
}

/// Chrome events for one step: one complete event per trace event, followed
/// by flow start/end pairs when dataflow is enabled. `next_flow_id` keeps
/// flow ids unique across steps.
pub fn chrome_events(
    trace: &ExecutionTrace,
    options: TimelineOptions,
    next_flow_id: &mut u64,
) -> Vec<ChromeEvent> {
    let mut out = trace.events.iter().map(complete_event).collect::<Vec<_>>();
    if !options.show_dataflow {
        return out;
    }
    let producers = trace
        .events
        .iter()
        .map(|event| (event.name.as_str(), event))
        .collect::<HashMap<_, _>>();
    for consumer in &trace.events {
        for input in consumer.inputs() {
            let Some(producer) = producers.get(input) else {
                continue;
            };
            if producer.name == consumer.name {
                continue;
            }
            let id = *next_flow_id;
            *next_flow_id += 1;
            out.push(flow_event("s", input, micros(producer.start), id));
            out.push(flow_event("t", input, micros(consumer.start), id));
        }
    }
    out
}

/// Streaming writer for the timeline artifact.
pub struct TraceWriter<W: Write> {
    out: W,
    path: PathBuf,
    options: TimelineOptions,
    next_flow_id: u64,
    written: usize,
}

impl TraceWriter<BufWriter<File>> {
    /// Create (or truncate) the artifact at `path` and write the opening
    /// marker.
    pub fn create(path: impl AsRef<Path>, options: TimelineOptions) -> BenchResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("create {}", path.display()))
            .map_err(|source| BenchError::Serialization {
                path: path.clone(),
                source,
            })?;
        Self::new(BufWriter::new(file), path, options)
    }
}

impl<W: Write> TraceWriter<W> {
    /// Wrap `out`; `path` is only used to label errors.
    pub fn new(mut out: W, path: impl Into<PathBuf>, options: TimelineOptions) -> BenchResult<Self> {
        let path = path.into();
        out.write_all(b"[\n")
            .context("write opening marker")
            .map_err(|source| BenchError::Serialization {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            out,
            path,
            options,
            next_flow_id: 0,
            written: 0,
        })
    }

    fn fail(&self, source: anyhow::Error) -> BenchError {
        BenchError::Serialization {
            path: self.path.clone(),
            source,
        }
    }

    /// Append every event of `trace`; returns the number of objects written.
    pub fn write_trace(&mut self, trace: &ExecutionTrace) -> BenchResult<usize> {
        let events = chrome_events(trace, self.options, &mut self.next_flow_id);
        for event in &events {
            let line = serde_json::to_string(event)
                .with_context(|| format!("serialize event {} of step {}", event.name, trace.step))
                .map_err(|err| self.fail(err))?;
            writeln!(self.out, "{},", line)
                .context("write event")
                .map_err(|err| self.fail(err))?;
        }
        self.written += events.len();
        Ok(events.len())
    }

    pub fn write_traces<'t, I>(&mut self, traces: I) -> BenchResult<usize>
    where
        I: IntoIterator<Item = &'t ExecutionTrace>,
    {
        let mut total = 0;
        for trace in traces {
            total += self.write_trace(trace)?;
        }
        Ok(total)
    }

    /// Objects written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the sink. No closing marker is written.
    pub fn finish(mut self) -> BenchResult<W> {
        self.out
            .flush()
            .context("flush trace artifact")
            .map_err(|err| self.fail(err))?;
        crate::trace!("wrote {} trace events to {}", self.written, self.path.display());
        Ok(self.out)
    }
}

/// Write all `traces` to a fresh artifact at `path`; returns the number of
/// event objects written.
pub fn write_timeline(
    path: impl AsRef<Path>,
    traces: &[ExecutionTrace],
    options: TimelineOptions,
) -> BenchResult<usize> {
    let mut writer = TraceWriter::create(path, options)?;
    writer.write_traces(traces)?;
    let written = writer.written();
    writer.finish()?;
    Ok(written)
}
