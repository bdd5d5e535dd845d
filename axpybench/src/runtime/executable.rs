//! Compiled form of a graph for one input signature.
//!
//! Compilation walks the nodes in order, resolves every input name, infers
//! shapes, checks fed values against their placeholders and materializes the
//! constant variables. A graph that compiles cannot fail a step for
//! structural reasons.
use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

use crate::graph::{Graph, MemoryKind, Node, NodeKind, OpKind, SourceKind};
use crate::input::Feeds;
use crate::ops::matmul_dims;
use crate::tensor::{shape_signature, Tensor};

/// Cache key: graph identity plus the shape of every fed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn of(graph: &Graph, feeds: &Feeds) -> Self {
        let mut text = graph.fingerprint();
        text.push('/');
        for (name, shape) in feeds.shapes() {
            text.push_str(name);
            text.push(':');
            text.push_str(&shape_signature(shape));
            text.push(';');
        }
        Signature(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A node with its inferred output shape.
#[derive(Debug, Clone)]
pub struct PlannedNode {
    pub node: Node,
    pub shape: Vec<usize>,
}

#[derive(Debug)]
pub struct Executable {
    pub signature: Signature,
    pub plan: Vec<PlannedNode>,
    pub constants: BTreeMap<String, Tensor>,
}

impl Executable {
    pub fn compile(graph: &Graph, feeds: &Feeds, signature: Signature) -> Result<Self> {
        let mut shapes: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (name, decl) in &graph.vars {
            shapes.insert(name.as_str(), decl.dims.clone());
        }

        let mut plan = Vec::with_capacity(graph.nodes.len());
        let mut writes = Vec::new();
        let mut sources = 0usize;
        for node in &graph.nodes {
            if shapes.contains_key(node.name.as_str()) {
                return Err(anyhow!("value {} is defined more than once", node.name));
            }
            for input in node.inputs() {
                if !shapes.contains_key(input) {
                    return Err(anyhow!(
                        "node {} reads unknown value {}",
                        node.name,
                        input
                    ));
                }
            }
            let shape = match &node.kind {
                NodeKind::Source { kind, dims } => {
                    sources += 1;
                    if let SourceKind::Placeholder = kind {
                        check_feed(&node.name, dims, feeds)?;
                    }
                    if let SourceKind::Dataset { elements, prefetch, .. } = kind {
                        if *elements == 0 || *prefetch == 0 {
                            return Err(anyhow!(
                                "dataset {} needs elements and prefetch depth > 0",
                                node.name
                            ));
                        }
                    }
                    dims.clone()
                }
                NodeKind::Op { op, inputs } => {
                    if inputs.len() != op.arity() {
                        return Err(anyhow!(
                            "op {} in node {} expects {} inputs, got {}",
                            op,
                            node.name,
                            op.arity(),
                            inputs.len()
                        ));
                    }
                    let input_shapes = inputs
                        .iter()
                        .map(|input| shapes[input.as_str()].clone())
                        .collect::<Vec<_>>();
                    infer_shape(*op, &input_shapes).map_err(|err| {
                        anyhow!("node {}: {}", node.name, err)
                    })?
                }
                NodeKind::Assign { var, value } => {
                    let decl = graph
                        .var(var)
                        .ok_or_else(|| anyhow!("assign to undeclared variable {}", var))?;
                    if decl.kind != MemoryKind::Persistent {
                        return Err(anyhow!("assign to non-persistent variable {}", var));
                    }
                    let value_shape = &shapes[value.as_str()];
                    if value_shape != &decl.dims {
                        return Err(anyhow!(
                            "assign {} expects shape {:?}, got {:?}",
                            var,
                            decl.dims,
                            value_shape
                        ));
                    }
                    if writes.contains(var) {
                        return Err(anyhow!("variable {} is assigned more than once", var));
                    }
                    writes.push(var.clone());
                    decl.dims.clone()
                }
            };
            shapes.insert(node.name.as_str(), shape.clone());
            plan.push(PlannedNode {
                node: node.clone(),
                shape,
            });
        }
        if sources > 1 {
            return Err(anyhow!("graph has {} input sources, expected one", sources));
        }

        let constants = graph
            .vars
            .values()
            .filter(|decl| decl.kind == MemoryKind::Constant)
            .map(|decl| (decl.name.clone(), Tensor::full(&decl.dims, decl.init)))
            .collect();

        Ok(Self {
            signature,
            plan,
            constants,
        })
    }

    /// Bytes held by materialized constants.
    pub fn constant_bytes(&self) -> usize {
        self.constants.values().map(Tensor::size_in_bytes).sum()
    }
}

fn check_feed(name: &str, dims: &[usize], feeds: &Feeds) -> Result<()> {
    match feeds.get(name) {
        Some(value) if value.shape() == dims => Ok(()),
        Some(value) => Err(anyhow!(
            "feed '{}' has shape {:?}, expected {:?}",
            name,
            value.shape(),
            dims
        )),
        None => Err(anyhow!("placeholder '{}' requires a feed", name)),
    }
}

fn infer_shape(op: OpKind, inputs: &[Vec<usize>]) -> Result<Vec<usize>> {
    match op {
        OpKind::Normalize => Ok(inputs[0].clone()),
        OpKind::Matmul => {
            let (m, _, n) = matmul_dims(&inputs[0], &inputs[1])?;
            Ok(vec![m, n])
        }
        OpKind::Add => {
            if inputs[0] != inputs[1] {
                return Err(anyhow!(
                    "add shape mismatch: {:?} vs {:?}",
                    inputs[0],
                    inputs[1]
                ));
            }
            Ok(inputs[0].clone())
        }
    }
}
