use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryKind {
    /// Read-only value materialized once per executable.
    Constant,
    /// Session-owned value that survives across steps.
    Persistent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub kind: MemoryKind,
    pub dims: Vec<usize>,
    /// Fill value every entry starts with.
    pub init: f32,
}

impl VarDecl {
    pub fn is_persistent(&self) -> bool {
        self.kind == MemoryKind::Persistent
    }
}
