use std::env;

use anyhow::Result;
use axpybench::{format_duration_ns, format_truncated, log, parse_args, run_benchmark, BenchConfig, Tensor};

fn main() -> Result<()> {
    let base = BenchConfig::from_env()?;
    let args = match parse_args(env::args().skip(1), base) {
        Ok(args) => args,
        Err(err) => {
            axpybench::critical!("{}", err);
            eprintln!("usage: axpybench <constant|placeholder|dataset> [--steps N] [--dim N] [--trace-out PATH] [--graph-out PATH] [--show-dataflow]");
            return Err(err.into());
        }
    };
    let config = args.config;

    let (dim, fill) = (config.dim, config.input_fill);
    let mut feed = move |_step: usize| Some(Tensor::square(dim, fill));
    let mut progress = |step: usize| log!("{}", step);

    let outcome = run_benchmark(args.mode, &config, &mut feed, &mut progress)?;

    log!("Final value: {}", format_truncated(outcome.final_state.as_slice()));
    log!("Writing event trace");
    let written = outcome.write_artifacts(&config)?;
    for trace in &outcome.report.traces {
        let (busy, _) = format_duration_ns(trace.busy_time().as_nanos());
        axpybench::trace!("step {}: {} events, busy {}", trace.step, trace.len(), busy);
    }
    axpybench::trace!(
        "{} events across {} steps written to {}",
        written,
        outcome.report.steps(),
        config.trace_path.display()
    );
    Ok(())
}
