//! `cclosure analyze`: exact closure value, summary and histogram.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use cclosure_core::edgelist::LoadStats;
use cclosure_core::error::ErrorCode;
use cclosure_engine::densify::DensifyConfig;
use cclosure_engine::estimate::EstimateConfig;
use cclosure_engine::pipeline::{AnalysisOptions, AnalysisReport, EstimateReport, analyze};
use clap::Args;
use serde::Serialize;

use super::{Context, finish, load};
use crate::output::{
    CliError, pretty_kv, pretty_rule, pretty_section, ratio, render_error, render_mode,
};

/// Arguments for `cclosure analyze`.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Edge-list files. Defaults to the configured datasets.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Also run the peeling estimator.
    #[arg(long)]
    pub estimate: bool,

    /// Also densify a copy of each graph toward this target c.
    #[arg(long, value_name = "C")]
    pub densify: Option<u32>,

    /// Enumerate on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Append results to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput<'a> {
    path: String,
    load: LoadStats,
    #[serde(flatten)]
    report: &'a AnalysisReport,
}

/// Execute `cclosure analyze`.
pub fn run_analyze(args: &AnalyzeArgs, ctx: &Context) -> Result<()> {
    let paths = ctx.datasets(&args.files)?;
    let mut csv = ctx.csv(args.csv.as_deref())?;

    let options = AnalysisOptions {
        parallel: args.parallel || ctx.config.enumerate.parallel,
        densify: args
            .densify
            .map(|target| (target, DensifyConfig::from_config(&ctx.config))),
        estimate: args
            .estimate
            .then(|| EstimateConfig::from_config(&ctx.config)),
    };

    let mut failed = 0;
    for path in &paths {
        let Some(dataset) = load(ctx, path)? else {
            failed += 1;
            continue;
        };

        let report = match analyze(&dataset.name, &dataset.graph, &options) {
            Ok(report) => report,
            Err(err) => {
                render_error(
                    ctx.output,
                    &CliError::coded(ErrorCode::CounterOverflow, format!("{err:#}"))
                        .for_dataset(&dataset.name),
                )?;
                failed += 1;
                continue;
            }
        };

        if let Some(csv) = csv.as_mut() {
            csv.write_analysis(&report)?;
        }

        let output = AnalyzeOutput {
            path: path.display().to_string(),
            load: dataset.stats,
            report: &report,
        };
        let quiet = ctx.quiet;
        render_mode(ctx.output, &output, write_text, |o, w| write_pretty(o, w, quiet))?;

        if report.densify.as_ref().is_some_and(|d| !d.converged) {
            failed += 1;
        }
    }

    finish(failed, paths.len())
}

fn write_text(o: &AnalyzeOutput<'_>, w: &mut dyn Write) -> io::Result<()> {
    let s = &o.report.summary;
    write!(
        w,
        "dataset={} nodes={} edges={} closure={} triangles={} wedges={} transitivity={}",
        o.report.dataset,
        s.node_count,
        s.edge_count,
        s.closure_value,
        s.triangles,
        s.wedges,
        ratio(s.transitivity)
    )?;
    if let Some(d) = &o.report.densify {
        write!(
            w,
            " densify_target={} densify_rounds={} densify_added={} converged={}",
            d.target_c,
            d.rounds.len(),
            d.total_added,
            d.converged
        )?;
    }
    match &o.report.estimate {
        Some(EstimateReport::Complete(e)) => write!(w, " estimate={}", e.value)?,
        Some(EstimateReport::Skipped { .. }) => write!(w, " estimate=skipped")?,
        None => {}
    }
    writeln!(w)
}

fn write_pretty(o: &AnalyzeOutput<'_>, w: &mut dyn Write, quiet: bool) -> io::Result<()> {
    let r = o.report;
    let s = &r.summary;

    pretty_section(w, &r.dataset)?;
    if !quiet {
        pretty_kv(w, "path", &o.path)?;
        pretty_kv(
            w,
            "loaded",
            format!(
                "{} lines, {} duplicate edges, {} self-loops skipped",
                o.load.lines, o.load.duplicate_edges, o.load.self_loops
            ),
        )?;
    }
    pretty_kv(w, "nodes", s.node_count.to_string())?;
    pretty_kv(w, "edges", s.edge_count.to_string())?;
    pretty_kv(w, "components", s.component_count.to_string())?;
    pretty_kv(w, "max degree", s.max_degree.to_string())?;
    pretty_kv(w, "density", format!("{:.6}", s.density))?;
    pretty_kv(w, "triangles", s.triangles.to_string())?;
    pretty_kv(w, "wedges", s.wedges.to_string())?;
    pretty_kv(w, "transitivity", ratio(s.transitivity))?;
    pretty_kv(w, "closure value", s.closure_value.to_string())?;
    if !quiet {
        pretty_kv(w, "fingerprint", &s.fingerprint)?;
    }

    if !r.histogram.is_empty() {
        writeln!(w)?;
        writeln!(w, "{:>10}  {:>12}", "neighbors", "pairs")?;
        for (count, pairs) in &r.histogram {
            writeln!(w, "{count:>10}  {pairs:>12}")?;
        }
    }

    if let Some(d) = &r.densify {
        writeln!(w)?;
        pretty_kv(w, "densify c", d.target_c.to_string())?;
        pretty_kv(w, "converged", d.converged.to_string())?;
        pretty_kv(w, "rounds", format!("{:?}", d.rounds))?;
        pretty_kv(w, "edges added", d.total_added.to_string())?;
    }

    match &r.estimate {
        Some(EstimateReport::Complete(e)) => {
            writeln!(w)?;
            pretty_kv(w, "estimate", format!("{} (heuristic)", e.value))?;
            pretty_kv(w, "peel rounds", e.rounds.len().to_string())?;
        }
        Some(EstimateReport::Skipped { reason }) => {
            writeln!(w)?;
            pretty_kv(w, "estimate", format!("skipped: {reason}"))?;
        }
        None => {}
    }

    pretty_rule(w)?;
    writeln!(w)
}
