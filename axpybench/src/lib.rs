pub mod logging;

mod bench;
mod config;
mod error;
mod formatting;
mod graph;
mod input;
mod ops;
mod runtime;
mod tensor;
mod timeline;
mod timer;

pub use bench::{run_benchmark, BenchOutcome};
pub use config::{parse_args, BenchConfig, CliArgs, DEFAULT_DIM, DEFAULT_STEPS, DEFAULT_TRACE_PATH};
pub use error::{BenchError, BenchResult};
pub use formatting::{format_duration_ns, format_truncated, FormatValue};
pub use graph::{
    compile, describe_node, FeedContract, Graph, GraphDeserialize, GraphSerialize, MemoryKind,
    Node, NodeKind, OpKind, SourceKind, VarDecl, BIAS, INPUT, STATE,
};
pub use input::{Feeds, InputMode, InputSource, Prefetcher};
pub use ops::{add_f32, matmul_f32, normalize_f32, Moments};
pub use runtime::{
    exec_op, Executable, ExecutableCache, ExecutionLoop, ExecutionTrace, FeedProvider, NoFeeds, RunOptions,
    RunReport, Session, Signature, StepOutput, TraceEvent, TraceEventKind, TraceLevel,
};
pub use tensor::{Tensor, TensorOptions};
pub use timeline::{chrome_events, write_timeline, ChromeEvent, TimelineOptions, TraceWriter};
pub use timer::Timer;
