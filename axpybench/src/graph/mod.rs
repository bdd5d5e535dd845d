mod builder;
mod node;
mod serde;
mod types;
mod var;

pub use builder::{compile, FeedContract, BIAS, INPUT, STATE};
pub use node::describe_node;
pub use self::serde::{GraphDeserialize, GraphSerialize};
pub use types::{Graph, Node, NodeKind, OpKind, SourceKind};
pub use var::{MemoryKind, VarDecl};
