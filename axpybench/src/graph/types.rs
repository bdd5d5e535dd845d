//! Core graph data types.
//!
//! A graph is a flat, topologically ordered list of nodes plus the variable
//! declarations those nodes read and write. Graphs are immutable once built;
//! the session compiles them into executables.
use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::var::{MemoryKind, VarDecl};

/// Operation kind supported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// `(x - mean(x)) / mean((x - mean(x))^2)` over every element.
    Normalize,
    Matmul,
    Add,
}

impl OpKind {
    /// String identifier for the op kind.
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Normalize => "normalize",
            OpKind::Matmul => "matmul",
            OpKind::Add => "add",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            OpKind::Normalize => 1,
            OpKind::Matmul | OpKind::Add => 2,
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a graph's input value is produced each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Value baked into the graph.
    Constant { fill: f32 },
    /// Value supplied by the caller as a feed.
    Placeholder,
    /// Value pulled from a repeating, prefetched dataset whose elements pass
    /// through `stages` before delivery.
    Dataset {
        elements: usize,
        fill: f32,
        stages: Vec<OpKind>,
        prefetch: usize,
    },
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Constant { .. } => "const",
            SourceKind::Placeholder => "placeholder",
            SourceKind::Dataset { .. } => "iterator_get_next",
        }
    }
}

/// Node variants that make up a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Source {
        kind: SourceKind,
        dims: Vec<usize>,
    },
    Op {
        op: OpKind,
        inputs: Vec<String>,
    },
    Assign {
        var: String,
        value: String,
    },
}

/// A graph node. `name` is also the name of the value it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub index: usize,
    pub uuid: Uuid,
    pub name: String,
    pub kind: NodeKind,
}

impl Node {
    /// Names of the values this node reads.
    pub fn inputs(&self) -> Vec<&str> {
        match &self.kind {
            NodeKind::Source { .. } => Vec::new(),
            NodeKind::Op { inputs, .. } => inputs.iter().map(String::as_str).collect(),
            NodeKind::Assign { var, value } => vec![value.as_str(), var.as_str()],
        }
    }

    /// Op type reported in traces.
    pub fn op_label(&self) -> &'static str {
        match &self.kind {
            NodeKind::Source { kind, .. } => kind.as_str(),
            NodeKind::Op { op, .. } => op.as_str(),
            NodeKind::Assign { .. } => "assign",
        }
    }
}

/// Graph structure containing nodes and variable declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub vars: BTreeMap<String, VarDecl>,
    pub nodes: Vec<Node>,
    next_index: usize,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty graph with no nodes or variables.
    ///
    /// # Example
    /// ```no_run
    /// # use axpybench::{Graph, MemoryKind, NodeKind, OpKind};
    /// # fn main() -> anyhow::Result<()> {
    /// let mut g = Graph::new();
    /// g.add_var(MemoryKind::Persistent, "x", vec![2, 2], 0.0);
    /// g.add_var(MemoryKind::Constant, "y", vec![2, 2], 1.0);
    /// g.add_node("sum", NodeKind::Op { op: OpKind::Add, inputs: vec!["x".into(), "y".into()] })?;
    /// # Ok(()) }
    /// ```
    pub fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
            nodes: Vec::new(),
            next_index: 0,
        }
    }

    /// Add a variable declaration to the graph.
    pub fn add_var(&mut self, kind: MemoryKind, name: impl Into<String>, dims: Vec<usize>, init: f32) {
        let name = name.into();
        self.vars.insert(
            name.clone(),
            VarDecl {
                name,
                kind,
                dims,
                init,
            },
        );
    }

    /// Append a node. Node names share one namespace with variables.
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> Result<()> {
        let name = name.into();
        if self.vars.contains_key(&name) || self.node(&name).is_some() {
            return Err(anyhow!("duplicate graph value name: {}", name));
        }
        let node = self.make_node(name, kind);
        self.nodes.push(node);
        Ok(())
    }

    /// Allocate a node with a fresh index and UUID.
    pub fn make_node(&mut self, name: String, kind: NodeKind) -> Node {
        let node = Node {
            index: self.next_index,
            uuid: Uuid::new_v4(),
            name,
            kind,
        };
        self.next_index += 1;
        node
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn var(&self, name: &str) -> Option<&VarDecl> {
        self.vars.get(name)
    }

    /// The single input source node, if the graph has one.
    pub fn source(&self) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| matches!(node.kind, NodeKind::Source { .. }))
    }

    /// True if `op` runs anywhere in the graph, including dataset stages.
    pub fn contains_op(&self, op: OpKind) -> bool {
        self.nodes.iter().any(|node| match &node.kind {
            NodeKind::Op { op: kind, .. } => *kind == op,
            NodeKind::Source {
                kind: SourceKind::Dataset { stages, .. },
                ..
            } => stages.contains(&op),
            _ => false,
        })
    }

    /// Stable identity of the graph structure, used in executable signatures.
    pub fn fingerprint(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node.uuid.simple().to_string())
            .collect::<Vec<_>>()
            .join(":")
    }
}
