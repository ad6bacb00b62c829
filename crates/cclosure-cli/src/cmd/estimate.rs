//! `cclosure estimate`: heuristic closure value by matrix peeling.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use cclosure_core::error::ErrorCode;
use cclosure_engine::estimate::{Estimate, EstimateConfig, EstimateError, estimate};
use clap::Args;
use serde::Serialize;

use super::{Context, finish, load};
use crate::output::{CliError, pretty_kv, pretty_rule, pretty_section, render_error, render_mode};

/// Arguments for `cclosure estimate`.
#[derive(Args, Debug, Default)]
pub struct EstimateArgs {
    /// Edge-list files. Defaults to the configured datasets.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Node limit for the dense matrix. Defaults to `[estimate] max_nodes`.
    #[arg(long, value_name = "N")]
    pub max_nodes: Option<usize>,

    /// Compute row maxima on the current thread only.
    #[arg(long)]
    pub sequential: bool,

    /// Append results to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EstimateOutput {
    dataset: String,
    edges: usize,
    elapsed_ms: f64,
    #[serde(flatten)]
    estimate: Estimate,
}

/// Execute `cclosure estimate`.
pub fn run_estimate(args: &EstimateArgs, ctx: &Context) -> Result<()> {
    let paths = ctx.datasets(&args.files)?;
    let mut csv = ctx.csv(args.csv.as_deref())?;

    let mut config = EstimateConfig::from_config(&ctx.config);
    if let Some(limit) = args.max_nodes {
        config.max_nodes = limit;
    }
    if args.sequential {
        config.parallel = false;
    }

    let mut failed = 0;
    for path in &paths {
        let Some(dataset) = load(ctx, path)? else {
            failed += 1;
            continue;
        };

        let started = Instant::now();
        let found = match estimate(&dataset.graph, &config) {
            Ok(found) => found,
            Err(err) => {
                let code = match err {
                    EstimateError::MatrixTooLarge { .. } => ErrorCode::MatrixTooLarge,
                    _ => ErrorCode::CounterOverflow,
                };
                render_error(
                    ctx.output,
                    &CliError::coded(code, err.to_string()).for_dataset(&dataset.name),
                )?;
                failed += 1;
                continue;
            }
        };

        if let Some(csv) = csv.as_mut() {
            csv.write_estimate(&dataset.name, &found)?;
        }

        let output = EstimateOutput {
            dataset: dataset.name,
            edges: dataset.graph.edge_count(),
            elapsed_ms: started.elapsed().as_secs_f64() * 1_000.0,
            estimate: found,
        };
        render_mode(ctx.output, &output, write_text, write_pretty)?;
    }

    finish(failed, paths.len())
}

fn write_text(o: &EstimateOutput, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "dataset={} nodes={} estimate={} rounds={} elapsed_ms={:.3}",
        o.dataset,
        o.estimate.nodes,
        o.estimate.value,
        o.estimate.rounds.len(),
        o.elapsed_ms
    )
}

fn write_pretty(o: &EstimateOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &o.dataset)?;
    pretty_kv(w, "nodes", o.estimate.nodes.to_string())?;
    pretty_kv(w, "edges", o.edges.to_string())?;
    pretty_kv(w, "estimate", format!("{} (heuristic)", o.estimate.value))?;
    pretty_kv(w, "peel rounds", o.estimate.rounds.len().to_string())?;
    pretty_kv(w, "elapsed", format!("{:.3} ms", o.elapsed_ms))?;
    pretty_rule(w)?;
    writeln!(w)
}
