//! `cclosure densify`: add edges until each graph is c-closed.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use cclosure_core::error::ErrorCode;
use cclosure_engine::densify::{DensifyConfig, DensifyError, densify};
use cclosure_engine::pipeline::DensifyReport;
use clap::Args;
use serde::Serialize;

use super::{Context, finish, load};
use crate::output::{CliError, pretty_kv, pretty_rule, pretty_section, render_error, render_mode};

/// Arguments for `cclosure densify`.
#[derive(Args, Debug, Default)]
pub struct DensifyArgs {
    /// Edge-list files. Defaults to the configured datasets.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Target closure bound.
    #[arg(long, short = 'c', value_name = "C", required_unless_present = "saturate")]
    pub target: Option<u32>,

    /// Close every wedge (target 0).
    #[arg(long, conflicts_with = "target")]
    pub saturate: bool,

    /// Round cap. Defaults to `[densify] max_rounds`.
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Re-enumerate on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Append results to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

impl DensifyArgs {
    const fn target_c(&self) -> u32 {
        match self.target {
            Some(c) if !self.saturate => c,
            _ => 0,
        }
    }
}

/// Build the densify config from the shared config and per-command overrides.
pub fn densify_config(ctx: &Context, max_rounds: Option<usize>, parallel: bool) -> DensifyConfig {
    let mut config = DensifyConfig::from_config(&ctx.config);
    if let Some(rounds) = max_rounds {
        config.max_rounds = rounds;
    }
    config.parallel |= parallel;
    config
}

/// Error code for a densify failure other than the round cap.
pub const fn densify_error_code(err: &DensifyError) -> ErrorCode {
    match err {
        DensifyError::NotConverged { .. } => ErrorCode::DensifyNotConverged,
        DensifyError::Enumerate(_) => ErrorCode::CounterOverflow,
        DensifyError::Graph(_) => ErrorCode::SelfLoopRejected,
    }
}

/// Coded error for a report that stopped at the round cap.
pub fn not_converged_error(dataset: &str, report: &DensifyReport) -> CliError {
    CliError::coded(
        ErrorCode::DensifyNotConverged,
        format!(
            "stopped after {} rounds toward c={}",
            report.rounds.len(),
            report.target_c
        ),
    )
    .for_dataset(dataset)
}

#[derive(Debug, Serialize)]
pub struct DensifyOutput {
    pub dataset: String,
    pub initial_edges: usize,
    pub final_edges: usize,
    pub elapsed_ms: f64,
    #[serde(flatten)]
    pub report: DensifyReport,
}

/// Execute `cclosure densify`.
pub fn run_densify(args: &DensifyArgs, ctx: &Context) -> Result<()> {
    let paths = ctx.datasets(&args.files)?;
    let mut csv = ctx.csv(args.csv.as_deref())?;
    let config = densify_config(ctx, args.max_rounds, args.parallel);
    let target_c = args.target_c();

    let mut failed = 0;
    for path in &paths {
        let Some(mut dataset) = load(ctx, path)? else {
            failed += 1;
            continue;
        };

        let started = Instant::now();
        let initial_edges = dataset.graph.edge_count();
        let result = densify(&mut dataset.graph, target_c, &config);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

        let report = match DensifyReport::from_result(result) {
            Ok(report) => report,
            Err(err) => {
                render_error(
                    ctx.output,
                    &CliError::coded(densify_error_code(&err), err.to_string())
                        .for_dataset(&dataset.name),
                )?;
                failed += 1;
                continue;
            }
        };

        if let Some(csv) = csv.as_mut() {
            csv.write_densify(&dataset.name, &report, Some(elapsed_ms))?;
        }

        let output = DensifyOutput {
            dataset: dataset.name,
            initial_edges,
            final_edges: dataset.graph.edge_count(),
            elapsed_ms,
            report,
        };
        render_mode(ctx.output, &output, write_text, write_pretty)?;

        if !output.report.converged {
            render_error(ctx.output, &not_converged_error(&output.dataset, &output.report))?;
            failed += 1;
        }
    }

    finish(failed, paths.len())
}

pub fn write_text(o: &DensifyOutput, w: &mut dyn Write) -> io::Result<()> {
    let rounds: Vec<String> = o.report.rounds.iter().map(u64::to_string).collect();
    writeln!(
        w,
        "dataset={} target_c={} converged={} iterations={} total_added={} rounds={} elapsed_ms={:.3}",
        o.dataset,
        o.report.target_c,
        o.report.converged,
        o.report.rounds.len(),
        o.report.total_added,
        rounds.join(","),
        o.elapsed_ms
    )
}

pub fn write_pretty(o: &DensifyOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("{} (c = {})", o.dataset, o.report.target_c))?;
    pretty_kv(w, "converged", o.report.converged.to_string())?;
    pretty_kv(w, "iterations", o.report.rounds.len().to_string())?;
    pretty_kv(w, "edges added", o.report.total_added.to_string())?;
    pretty_kv(
        w,
        "edges",
        format!("{} -> {}", o.initial_edges, o.final_edges),
    )?;
    if let Some(closure) = o.report.final_closure {
        pretty_kv(w, "final closure", closure.to_string())?;
    }
    pretty_kv(w, "elapsed", format!("{:.3} ms", o.elapsed_ms))?;

    if !o.report.rounds.is_empty() {
        writeln!(w)?;
        writeln!(w, "{:>8}  {:>12}", "round", "edges added")?;
        for (round, added) in o.report.rounds.iter().enumerate() {
            writeln!(w, "{:>8}  {added:>12}", round + 1)?;
        }
    }
    pretty_rule(w)?;
    writeln!(w)
}
