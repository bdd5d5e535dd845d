//! Builds the AXPY variable-update graph for one input mode.
//!
//! Every mode produces the same tail: `MatMul = alpha x x`, `add = MatMul + y`,
//! `x <- add`. Only the source node for `alpha` differs.
use anyhow::Result;

use crate::config::BenchConfig;
use crate::input::InputMode;

use super::{describe_node, Graph, MemoryKind, NodeKind, OpKind, SourceKind};

/// Name of the per-step input value.
pub const INPUT: &str = "alpha";
/// Name of the persistent state variable.
pub const STATE: &str = "x";
/// Name of the constant bias.
pub const BIAS: &str = "y";

const MATMUL: &str = "MatMul";
const ADD: &str = "add";
const ASSIGN: &str = "Assign";

/// What the caller must pass to each step of a compiled graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedContract {
    /// The graph produces its own input.
    None,
    /// A tensor named `name` of exactly `shape` must be fed every step.
    Required { name: String, shape: Vec<usize> },
}

impl FeedContract {
    pub fn requires_feed(&self) -> bool {
        matches!(self, FeedContract::Required { .. })
    }

    pub fn feed_name(&self) -> Option<&str> {
        match self {
            FeedContract::None => None,
            FeedContract::Required { name, .. } => Some(name),
        }
    }
}

/// Build the graph for `mode` and describe how its input must be supplied.
pub fn compile(mode: InputMode, config: &BenchConfig) -> Result<(Graph, FeedContract)> {
    config.validate()?;
    let shape = config.shape();
    let mut graph = Graph::new();
    graph.add_var(MemoryKind::Persistent, STATE, shape.clone(), 0.0);
    graph.add_var(MemoryKind::Constant, BIAS, shape.clone(), config.bias_fill);

    let (source, contract) = match mode {
        InputMode::Constant => (
            SourceKind::Constant {
                fill: config.input_fill,
            },
            FeedContract::None,
        ),
        InputMode::Fed => (
            SourceKind::Placeholder,
            FeedContract::Required {
                name: INPUT.to_string(),
                shape: shape.clone(),
            },
        ),
        InputMode::Streamed => (
            SourceKind::Dataset {
                elements: config.dataset_elements,
                fill: config.input_fill,
                stages: vec![OpKind::Normalize],
                prefetch: config.prefetch_depth,
            },
            FeedContract::None,
        ),
    };
    graph.add_node(
        INPUT,
        NodeKind::Source {
            kind: source,
            dims: shape,
        },
    )?;
    graph.add_node(
        MATMUL,
        NodeKind::Op {
            op: OpKind::Matmul,
            inputs: vec![INPUT.to_string(), STATE.to_string()],
        },
    )?;
    graph.add_node(
        ADD,
        NodeKind::Op {
            op: OpKind::Add,
            inputs: vec![MATMUL.to_string(), BIAS.to_string()],
        },
    )?;
    graph.add_node(
        ASSIGN,
        NodeKind::Assign {
            var: STATE.to_string(),
            value: ADD.to_string(),
        },
    )?;
    crate::trace!("compiled {} graph with {} nodes", mode, graph.nodes.len());
    for node in &graph.nodes {
        crate::trace!("  {}", describe_node(node));
    }
    Ok((graph, contract))
}
