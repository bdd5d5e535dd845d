use super::{Node, NodeKind, SourceKind};

/// One-line description of a node, as printed in trace logs.
pub fn describe_node(node: &Node) -> String {
    match &node.kind {
        NodeKind::Source { kind, dims } => match kind {
            SourceKind::Constant { fill } => {
                format!("const {}: f32{:?} = {}", node.name, dims, fill)
            }
            SourceKind::Placeholder => format!("placeholder {}: f32{:?}", node.name, dims),
            SourceKind::Dataset {
                elements,
                stages,
                prefetch,
                ..
            } => {
                let stages = stages
                    .iter()
                    .map(|op| op.as_str())
                    .collect::<Vec<_>>()
                    .join(" >> ");
                let stages = if stages.is_empty() {
                    String::new()
                } else {
                    format!(" map({})", stages)
                };
                format!(
                    "dataset {}: f32{:?} x{}{} repeat prefetch({})",
                    node.name, dims, elements, stages, prefetch
                )
            }
        },
        NodeKind::Op { op, inputs } => {
            format!("op {}({}) >> {}", op, inputs.join(","), node.name)
        }
        NodeKind::Assign { var, value } => format!("assign {} << {}", var, value),
    }
}
