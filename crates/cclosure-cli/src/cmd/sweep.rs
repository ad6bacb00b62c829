//! `cclosure sweep`: densify fresh copies over a descending range of c.

use std::path::PathBuf;

use anyhow::Result;
use cclosure_core::error::ErrorCode;
use cclosure_engine::densify::sweep;
use cclosure_engine::pipeline::DensifyReport;
use clap::Args;
use tracing::info;

use super::densify::{
    DensifyOutput, densify_config, densify_error_code, not_converged_error, write_pretty,
    write_text,
};
use super::{Context, finish, load};
use crate::output::{CliError, render_error, render_mode};

/// Arguments for `cclosure sweep`.
#[derive(Args, Debug, Default)]
pub struct SweepArgs {
    /// Edge-list files. Defaults to the configured datasets.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Largest target c. Defaults to `[sweep] from`.
    #[arg(long, value_name = "C")]
    pub from: Option<u32>,

    /// Smallest target c, inclusive. Defaults to `[sweep] to`.
    #[arg(long, value_name = "C")]
    pub to: Option<u32>,

    /// Round cap per target. Defaults to `[densify] max_rounds`.
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Re-enumerate on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Append results to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Execute `cclosure sweep`.
pub fn run_sweep(args: &SweepArgs, ctx: &Context) -> Result<()> {
    let from = args.from.unwrap_or(ctx.config.sweep.from);
    let to = args.to.unwrap_or(ctx.config.sweep.to);
    if from < to {
        render_error(
            ctx.output,
            &CliError::coded(
                ErrorCode::InvalidArgument,
                format!("sweep range is empty: from={from} is below to={to}"),
            ),
        )?;
        anyhow::bail!("empty sweep range");
    }

    let paths = ctx.datasets(&args.files)?;
    let mut csv = ctx.csv(args.csv.as_deref())?;
    let config = densify_config(ctx, args.max_rounds, args.parallel);

    let mut failed = 0;
    for path in &paths {
        let Some(dataset) = load(ctx, path)? else {
            failed += 1;
            continue;
        };
        info!(dataset = %dataset.name, from, to, "sweep started");

        let mut dataset_failed = false;
        for run in sweep(&dataset.graph, from, to, &config) {
            let elapsed_ms = run.elapsed.as_secs_f64() * 1_000.0;
            let final_edges = run.result.as_ref().ok().map(|outcome| outcome.final_edges);

            let report = match DensifyReport::from_result(run.result) {
                Ok(report) => report,
                Err(err) => {
                    render_error(
                        ctx.output,
                        &CliError::coded(densify_error_code(&err), err.to_string())
                            .for_dataset(&dataset.name),
                    )?;
                    dataset_failed = true;
                    continue;
                }
            };

            if let Some(csv) = csv.as_mut() {
                csv.write_densify(&dataset.name, &report, Some(elapsed_ms))?;
            }
            if !report.converged {
                render_error(ctx.output, &not_converged_error(&dataset.name, &report))?;
                dataset_failed = true;
            }

            let initial_edges = dataset.graph.edge_count();
            let total_added = usize::try_from(report.total_added).unwrap_or(usize::MAX);
            let output = DensifyOutput {
                dataset: dataset.name.clone(),
                initial_edges,
                final_edges: final_edges
                    .unwrap_or_else(|| initial_edges.saturating_add(total_added)),
                elapsed_ms,
                report,
            };
            render_mode(ctx.output, &output, write_text, write_pretty)?;
        }

        if dataset_failed {
            failed += 1;
        }
    }

    finish(failed, paths.len())
}
