#[path = "common/mod.rs"]
mod common;

#[path = "ops/ops_axpy.rs"]
mod ops_axpy;

#[path = "graph/graph_build.rs"]
mod graph_build;

#[path = "config/config_cli.rs"]
mod config_cli;

#[path = "runtime/runtime_session.rs"]
mod runtime_session;
#[path = "runtime/runtime_prefetch.rs"]
mod runtime_prefetch;

#[path = "timeline/timeline_artifact.rs"]
mod timeline_artifact;

#[path = "bench/bench_modes.rs"]
mod bench_modes;
