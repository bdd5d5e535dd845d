//! Run configuration.
//!
//! Defaults reproduce the reference benchmark (2048x2048 tensors, ten steps,
//! prefetch depth five). Environment variables override the defaults and
//! command-line flags override the environment.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{BenchError, BenchResult};
use crate::input::InputMode;

pub const DEFAULT_DIM: usize = 2048;
pub const DEFAULT_STEPS: usize = 10;
pub const DEFAULT_PREFETCH_DEPTH: usize = 5;
pub const DEFAULT_CACHE_DEPTH: usize = 16;
pub const DEFAULT_TRACE_PATH: &str = "tf_event_trace.json";

const ENV_DIM: &str = "AXPYBENCH_DIM";
const ENV_STEPS: &str = "AXPYBENCH_STEPS";
const ENV_PREFETCH: &str = "AXPYBENCH_PREFETCH";
const ENV_CACHE_DEPTH: &str = "AXPYBENCH_CACHE_DEPTH";
const ENV_SHOW_DATAFLOW: &str = "AXPYBENCH_SHOW_DATAFLOW";
const ENV_TRACE_PATH: &str = "AXPYBENCH_TRACE_PATH";
const ENV_GRAPH_OUT: &str = "AXPYBENCH_GRAPH_OUT";

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Side length of every square tensor.
    pub dim: usize,
    /// Number of sequential steps the loop runs.
    pub steps: usize,
    /// Elements the streamed producer may buffer ahead of consumption.
    pub prefetch_depth: usize,
    /// Compiled executables kept per session before LRU eviction.
    pub cache_depth: usize,
    /// Emit dataflow flow events in the trace artifact.
    pub show_dataflow: bool,
    pub trace_path: PathBuf,
    /// Where to write the compiled graph as JSON, if anywhere.
    pub graph_path: Option<PathBuf>,
    pub input_fill: f32,
    pub bias_fill: f32,
    /// Length of one pass over the streamed dataset.
    pub dataset_elements: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            steps: DEFAULT_STEPS,
            prefetch_depth: DEFAULT_PREFETCH_DEPTH,
            cache_depth: DEFAULT_CACHE_DEPTH,
            show_dataflow: false,
            trace_path: PathBuf::from(DEFAULT_TRACE_PATH),
            graph_path: None,
            input_fill: 1.5,
            bias_fill: 1.0,
            dataset_elements: 2,
        }
    }
}

impl BenchConfig {
    /// Defaults overridden by `AXPYBENCH_*` environment variables.
    pub fn from_env() -> BenchResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BenchResult<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_DIM) {
            config.dim = parse_value(ENV_DIM, &value)?;
        }
        if let Some(value) = lookup(ENV_STEPS) {
            config.steps = parse_value(ENV_STEPS, &value)?;
        }
        if let Some(value) = lookup(ENV_PREFETCH) {
            config.prefetch_depth = parse_value(ENV_PREFETCH, &value)?;
        }
        if let Some(value) = lookup(ENV_CACHE_DEPTH) {
            config.cache_depth = parse_value(ENV_CACHE_DEPTH, &value)?;
        }
        if let Some(value) = lookup(ENV_SHOW_DATAFLOW) {
            config.show_dataflow = parse_flag(ENV_SHOW_DATAFLOW, &value)?;
        }
        if let Some(value) = lookup(ENV_TRACE_PATH) {
            config.trace_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_GRAPH_OUT) {
            config.graph_path = Some(PathBuf::from(value));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.dim == 0 {
            return Err(BenchError::configuration("tensor dimension must be positive"));
        }
        if self.prefetch_depth == 0 {
            return Err(BenchError::configuration("prefetch depth must be positive"));
        }
        if self.cache_depth == 0 {
            return Err(BenchError::configuration("cache depth must be positive"));
        }
        if self.dataset_elements == 0 {
            return Err(BenchError::configuration("dataset needs at least one element"));
        }
        Ok(())
    }

    /// Shape shared by the state, bias and every input.
    pub fn shape(&self) -> Vec<usize> {
        vec![self.dim, self.dim]
    }
}

/// Parsed command line.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub mode: InputMode,
    pub config: BenchConfig,
}

/// Parse `<mode> [--steps N] [--dim N] [--trace-out PATH] [--graph-out PATH]
/// [--show-dataflow]` on top of `base`. The program name must already be
/// stripped.
pub fn parse_args<I>(args: I, base: BenchConfig) -> BenchResult<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut config = base;
    let mut mode = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => {
                (flag.to_string(), Some(value.to_string()))
            }
            _ => (arg.clone(), None),
        };
        match flag.as_str() {
            "--show-dataflow" => {
                config.show_dataflow = match inline {
                    Some(value) => parse_flag("--show-dataflow", &value)?,
                    None => true,
                };
            }
            "--steps" | "--dim" | "--trace-out" | "--graph-out" => {
                let value = match inline {
                    Some(value) => value,
                    None => args.next().ok_or_else(|| {
                        BenchError::configuration(format!("{} requires a value", flag))
                    })?,
                };
                match flag.as_str() {
                    "--steps" => config.steps = parse_value("--steps", &value)?,
                    "--dim" => config.dim = parse_value("--dim", &value)?,
                    "--trace-out" => config.trace_path = PathBuf::from(value),
                    _ => config.graph_path = Some(PathBuf::from(value)),
                }
            }
            other if other.starts_with("--") => {
                return Err(BenchError::configuration(format!(
                    "unknown flag '{}'",
                    other
                )));
            }
            _ => {
                if mode.is_some() {
                    return Err(BenchError::configuration(format!(
                        "unexpected argument '{}'",
                        arg
                    )));
                }
                mode = Some(arg.parse::<InputMode>()?);
            }
        }
    }
    let mode = mode.ok_or_else(|| {
        BenchError::configuration("missing input mode; expected constant|placeholder|dataset")
    })?;
    config.validate()?;
    Ok(CliArgs { mode, config })
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> BenchResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        BenchError::configuration(format!("invalid value '{}' for {}", value, name))
    })
}

fn parse_flag(name: &str, value: &str) -> BenchResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(BenchError::configuration(format!(
            "invalid flag value '{}' for {}",
            value, name
        ))),
    }
}
