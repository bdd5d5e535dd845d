mod cache;
mod engine;
mod executable;
mod op_runner;
mod run_loop;
mod session;
mod trace;

pub use cache::ExecutableCache;
pub use executable::{Executable, Signature};
pub use op_runner::exec_op;
pub use run_loop::{ExecutionLoop, FeedProvider, NoFeeds, RunReport};
pub use session::{RunOptions, Session, StepOutput};
pub use trace::{ExecutionTrace, TraceEvent, TraceEventKind, TraceLevel};
