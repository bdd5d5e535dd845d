use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, Result};

use crate::graph::NodeKind;
use crate::input::{Feeds, InputSource};
use crate::runtime::executable::{Executable, PlannedNode};
use crate::runtime::op_runner::exec_op;
use crate::runtime::trace::{TraceEvent, TraceEventKind};
use crate::tensor::Tensor;
use crate::timer::Timer;

/// Everything one step reads and produces. Assignments are staged in
/// `pending` and only reach the session once every node has run.
pub(crate) struct StepContext<'a> {
    pub step: usize,
    pub executable: &'a Executable,
    pub variables: &'a BTreeMap<String, Tensor>,
    pub source: &'a mut InputSource,
    pub feeds: Feeds,
    pub values: HashMap<String, Tensor>,
    pub pending: Vec<(String, Tensor)>,
}

impl StepContext<'_> {
    fn lookup(&self, name: &str) -> Result<&Tensor> {
        self.values
            .get(name)
            .or_else(|| self.executable.constants.get(name))
            .or_else(|| self.variables.get(name))
            .ok_or_else(|| anyhow!("value {} is not available at step {}", name, self.step))
    }
}

pub(crate) fn handle_node(
    ctx: &mut StepContext<'_>,
    planned: &PlannedNode,
    timer: &Timer,
) -> Result<TraceEvent> {
    let node = &planned.node;
    let span = timer.start();
    let kind = match &node.kind {
        NodeKind::Source { .. } => {
            let value = ctx.source.produce_input(ctx.step, &mut ctx.feeds)?;
            if value.shape() != planned.shape.as_slice() {
                return Err(anyhow!(
                    "input {} produced shape {:?}, expected {:?}",
                    node.name,
                    value.shape(),
                    planned.shape
                ));
            }
            ctx.values.insert(node.name.clone(), value);
            TraceEventKind::Source
        }
        NodeKind::Op { op, inputs } => {
            let args = inputs
                .iter()
                .map(|input| ctx.lookup(input))
                .collect::<Result<Vec<_>>>()?;
            let out = exec_op(*op, &args)?;
            ctx.values.insert(node.name.clone(), out);
            TraceEventKind::OpExecute
        }
        NodeKind::Assign { var, value } => {
            if !ctx.variables.contains_key(var) {
                return Err(anyhow!("variable {} is not initialized", var));
            }
            let value = ctx
                .values
                .remove(value)
                .ok_or_else(|| anyhow!("assign {} reads missing value {}", var, value))?;
            ctx.pending.push((var.clone(), value));
            TraceEventKind::Assign
        }
    };
    let timing = span.stop();

    let mut event = TraceEvent::new(kind, node.name.clone(), timing.start, timing.duration)
        .with_meta("op", node.op_label())
        .with_meta("step", ctx.step.to_string());
    event.node_uuid = Some(node.uuid);
    for (idx, input) in node.inputs().into_iter().enumerate() {
        event = event.with_meta(format!("input{}", idx), input);
    }
    Ok(event)
}
