use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use crate::formatting::format_duration_ns;

/// How much timing detail a step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceLevel {
    /// Record nothing.
    Off,
    /// One event spanning the whole step.
    Basic,
    /// One event per executed node, plus executable compilation.
    #[default]
    Full,
}

/// Kind of trace event emitted during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEventKind {
    Compile,
    Source,
    OpExecute,
    Assign,
    Step,
}

impl TraceEventKind {
    /// Category label used in the timeline artifact.
    pub fn category(self) -> &'static str {
        match self {
            TraceEventKind::Compile => "Compile",
            TraceEventKind::Source => "Input",
            TraceEventKind::OpExecute | TraceEventKind::Assign => "Op",
            TraceEventKind::Step => "Step",
        }
    }
}

impl fmt::Display for TraceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEventKind::Compile => write!(f, "Compile"),
            TraceEventKind::Source => write!(f, "Source"),
            TraceEventKind::OpExecute => write!(f, "OpExecute"),
            TraceEventKind::Assign => write!(f, "Assign"),
            TraceEventKind::Step => write!(f, "Step"),
        }
    }
}

/// Timestamped record of one unit of work inside a step.
///
/// `metadata` follows the timeline convention: `op` holds the op type and
/// `input0`, `input1`, ... the names of the values the node read.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub kind: TraceEventKind,
    pub name: String,
    pub node_uuid: Option<Uuid>,
    /// Offset from the Unix epoch.
    pub start: Duration,
    pub duration: Duration,
    pub metadata: BTreeMap<String, String>,
}

impl TraceEvent {
    pub fn new(kind: TraceEventKind, name: impl Into<String>, start: Duration, duration: Duration) -> Self {
        Self {
            kind,
            name: name.into(),
            node_uuid: None,
            start,
            duration,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Values the node read, in input order.
    pub fn inputs(&self) -> Vec<&str> {
        (0..)
            .map(|idx| self.metadata.get(&format!("input{}", idx)))
            .take_while(Option::is_some)
            .flatten()
            .map(String::as_str)
            .collect()
    }

    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Ordered events produced by one step.
#[derive(Debug, Clone, Default)]
pub struct ExecutionTrace {
    pub step: usize,
    pub events: Vec<TraceEvent>,
}

impl ExecutionTrace {
    pub fn new(step: usize) -> Self {
        Self {
            step,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of one kind, in order.
    pub fn of_kind(&self, kind: TraceEventKind) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |event| event.kind == kind)
    }

    /// Sum of event durations.
    pub fn busy_time(&self) -> Duration {
        self.events.iter().map(|event| event.duration).sum()
    }
}

pub(crate) fn format_event_line(step: usize, event: &TraceEvent) -> String {
    let (elapsed, _) = format_duration_ns(event.duration.as_nanos());
    match event.node_uuid {
        Some(uuid) => format!(
            "{} {} [{}] -- {} -- ({})",
            step, uuid, event.kind, event.name, elapsed
        ),
        None => format!("{} [{}] -- {} -- ({})", step, event.kind, event.name, elapsed),
    }
}
