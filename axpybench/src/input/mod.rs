//! Input delivery strategies.
//!
//! The mode is chosen once from the command line. After that the execution
//! loop only talks to an [`InputSource`], which hides whether the per-step
//! value is baked into the graph, fed by the caller or pulled from a
//! prefetched stream.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::error::{BenchError, BenchResult};
use crate::graph::{Graph, NodeKind, SourceKind};
use crate::tensor::Tensor;

mod prefetch;

pub use prefetch::Prefetcher;

/// How the per-step input reaches the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// Value baked into the graph.
    Constant,
    /// Caller feeds a value every step (`placeholder`).
    Fed,
    /// Repeating prefetched dataset (`dataset`).
    Streamed,
}

impl InputMode {
    pub const ALL: [InputMode; 3] = [InputMode::Constant, InputMode::Fed, InputMode::Streamed];

    /// Command-line spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            InputMode::Constant => "constant",
            InputMode::Fed => "placeholder",
            InputMode::Streamed => "dataset",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = BenchError;

    fn from_str(value: &str) -> BenchResult<Self> {
        match value {
            "constant" => Ok(InputMode::Constant),
            "placeholder" => Ok(InputMode::Fed),
            "dataset" => Ok(InputMode::Streamed),
            other => Err(BenchError::configuration(format!(
                "unrecognized input mode '{}'; expected constant|placeholder|dataset",
                other
            ))),
        }
    }
}

/// Named tensors supplied for one step.
#[derive(Debug, Clone, Default)]
pub struct Feeds {
    values: BTreeMap<String, Tensor>,
}

impl Feeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Tensor) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Tensor) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.values.get(name)
    }

    pub fn take(&mut self, name: &str) -> Option<Tensor> {
        self.values.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(name, shape)` pairs in name order.
    pub fn shapes(&self) -> Vec<(&str, &[usize])> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.shape()))
            .collect()
    }
}

/// Producer of the graph input, bound to a compiled graph's source node.
#[derive(Debug)]
pub enum InputSource {
    Constant {
        name: String,
        value: Tensor,
    },
    Fed {
        name: String,
        shape: Vec<usize>,
    },
    Streamed {
        name: String,
        stream: Prefetcher,
    },
}

impl InputSource {
    /// Instantiate the source described by `graph`'s source node. For a
    /// dataset source this starts the prefetch producer.
    pub fn bind(graph: &Graph) -> Result<Self> {
        let node = graph
            .source()
            .ok_or_else(|| anyhow!("graph has no input source node"))?;
        let NodeKind::Source { kind, dims } = &node.kind else {
            return Err(anyhow!("node {} is not a source", node.name));
        };
        let name = node.name.clone();
        let source = match kind {
            SourceKind::Constant { fill } => InputSource::Constant {
                name,
                value: Tensor::full(dims, *fill),
            },
            SourceKind::Placeholder => InputSource::Fed {
                name,
                shape: dims.clone(),
            },
            SourceKind::Dataset {
                elements,
                fill,
                stages,
                prefetch,
            } => {
                let items = (0..*elements)
                    .map(|_| Tensor::full(dims, *fill))
                    .collect::<Vec<_>>();
                InputSource::Streamed {
                    name,
                    stream: Prefetcher::dataset(items, stages.clone(), *prefetch)?,
                }
            }
        };
        crate::trace!("input source bound: {} ({})", source.name(), source.mode());
        Ok(source)
    }

    pub fn mode(&self) -> InputMode {
        match self {
            InputSource::Constant { .. } => InputMode::Constant,
            InputSource::Fed { .. } => InputMode::Fed,
            InputSource::Streamed { .. } => InputMode::Streamed,
        }
    }

    /// Name of the graph value this source produces.
    pub fn name(&self) -> &str {
        match self {
            InputSource::Constant { name, .. }
            | InputSource::Fed { name, .. }
            | InputSource::Streamed { name, .. } => name,
        }
    }

    /// Turn the caller's optional value for `step` into the feed mapping the
    /// session expects. Only the fed variant needs (and accepts) a value.
    pub fn resolve_feed(&self, step: usize, supplied: Option<Tensor>) -> BenchResult<Feeds> {
        match self {
            InputSource::Fed { name, .. } => match supplied {
                Some(value) => Ok(Feeds::new().with(name.clone(), value)),
                None => Err(BenchError::MissingFeed {
                    step,
                    name: name.clone(),
                }),
            },
            InputSource::Constant { .. } | InputSource::Streamed { .. } => {
                if supplied.is_some() {
                    crate::warning!(
                        "step {}: {} input ignores caller-supplied feed",
                        step,
                        self.mode()
                    );
                }
                Ok(Feeds::new())
            }
        }
    }

    /// Value of the input for `step`. Fed values are taken out of `feeds` and
    /// must match the declared shape exactly.
    pub fn produce_input(&mut self, step: usize, feeds: &mut Feeds) -> Result<Tensor> {
        match self {
            InputSource::Constant { value, .. } => Ok(value.clone()),
            InputSource::Fed { name, shape } => {
                let value = feeds
                    .take(name)
                    .ok_or_else(|| anyhow!("missing feed for '{}' at step {}", name, step))?;
                if value.shape() != shape.as_slice() {
                    return Err(anyhow!(
                        "feed '{}' has shape {:?}, expected {:?}",
                        name,
                        value.shape(),
                        shape
                    ));
                }
                Ok(value)
            }
            InputSource::Streamed { stream, .. } => stream.next(),
        }
    }
}
