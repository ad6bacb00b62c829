#![forbid(unsafe_code)]

mod cmd;
mod output;
mod report;

use std::env;
use std::path::PathBuf;

use anyhow::Context as _;
use cclosure_core::config::resolve_config;
use cclosure_core::error::ErrorCode;
use cclosure_core::timing;
use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cclosure: exact and approximate c-closure analysis",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit stage timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true)]
    json: bool,

    /// Config file. Defaults to ./cclosure.toml, then the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Exact closure value, summary and histogram",
        long_about = "Enumerate common neighbors of every non-adjacent pair and report the \
                      closure value, transitivity statistics and the count histogram.",
        after_help = "EXAMPLES:\n    # Analyze one graph\n    cclosure analyze data/ca-GrQc.txt\n\n    # Add the estimator and append to a CSV report\n    cclosure analyze data/ca-GrQc.txt --estimate --csv closures.csv\n\n    # Analyze the datasets listed in cclosure.toml\n    cclosure analyze --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Add edges until the graph is c-closed",
        long_about = "Repeatedly join every non-adjacent pair with more than C common \
                      neighbors and report the edges added per round.",
        after_help = "EXAMPLES:\n    # Densify toward c = 48\n    cclosure densify data/wiki-Vote.txt --target 48\n\n    # Close every wedge\n    cclosure densify data/wiki-Vote.txt --saturate"
    )]
    Densify(cmd::densify::DensifyArgs),

    #[command(
        about = "Densify over a descending range of c",
        long_about = "Densify a fresh copy of each graph for every target from --from \
                      down to --to.",
        after_help = "EXAMPLES:\n    # Targets 50, 49, 48\n    cclosure sweep data/wiki-Vote.txt --from 50 --to 48 --csv sweep.csv"
    )]
    Sweep(cmd::sweep::SweepArgs),

    #[command(
        about = "Approximate closure value by peeling",
        long_about = "Build a dense common-neighbor matrix and peel the nodes with the \
                      smallest row maximum. The result is a heuristic, not the exact value.",
        after_help = "EXAMPLES:\n    # Estimate one graph\n    cclosure estimate data/p2p-Gnutella09.txt\n\n    # Include the peel trace\n    cclosure estimate data/p2p-Gnutella09.txt --json"
    )]
    Estimate(cmd::estimate::EstimateArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CCLOSURE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "cclosure=debug,info"
        } else {
            "cclosure=info,warn"
        })
    });

    let format = env::var("CCLOSURE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let timing_enabled = cli.timing || timing::timing_enabled_from_env();
    timing::set_timing_enabled(timing_enabled);
    timing::clear_timings();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let project_root = env::current_dir()?;
    let config = match resolve_config(cli.config.as_deref(), &project_root) {
        Ok(config) => config,
        Err(err) => {
            render_error(
                output,
                &CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err).context("failed to load configuration");
        }
    };
    let ctx = cmd::Context {
        output,
        quiet: cli.quiet,
        config,
    };

    let command_result = match &cli.command {
        Commands::Analyze(args) => {
            timing::timed("cmd.analyze", || cmd::analyze::run_analyze(args, &ctx))
        }
        Commands::Densify(args) => {
            timing::timed("cmd.densify", || cmd::densify::run_densify(args, &ctx))
        }
        Commands::Sweep(args) => timing::timed("cmd.sweep", || cmd::sweep::run_sweep(args, &ctx)),
        Commands::Estimate(args) => {
            timing::timed("cmd.estimate", || cmd::estimate::run_estimate(args, &ctx))
        }
    };

    if timing_enabled {
        let report = timing::collect_report();
        if report.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else {
            eprintln!("timing report:");
            eprintln!("{}", report.display_table());
            eprintln!("timing report (json):");
            eprintln!("{}", serde_json::to_string_pretty(&report.to_json())?);
        }
    }

    command_result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["cclosure", "--timing", "analyze", "g.txt"]);
        assert!(cli.timing);
        assert!(matches!(cli.command, Commands::Analyze(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["cclosure", "estimate", "g.txt", "--json", "-q"]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn format_flag_accepts_value_enum() {
        let cli = Cli::parse_from(["cclosure", "--format", "text", "analyze"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::parse_from([
            "cclosure",
            "analyze",
            "a.txt",
            "b.txt",
            "--estimate",
            "--densify",
            "3",
            "--csv",
            "out.csv",
        ]);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.files.len(), 2);
        assert!(args.estimate);
        assert_eq!(args.densify, Some(3));
        assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn densify_requires_target_or_saturate() {
        assert!(Cli::try_parse_from(["cclosure", "densify", "g.txt"]).is_err());
        assert!(Cli::try_parse_from(["cclosure", "densify", "g.txt", "--saturate"]).is_ok());
        assert!(Cli::try_parse_from(["cclosure", "densify", "g.txt", "-c", "4"]).is_ok());
        assert!(
            Cli::try_parse_from(["cclosure", "densify", "g.txt", "-c", "4", "--saturate"])
                .is_err()
        );
    }

    #[test]
    fn sweep_range_parses() {
        let cli = Cli::parse_from(["cclosure", "sweep", "g.txt", "--from", "5", "--to", "3"]);
        let Commands::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        assert_eq!(args.from, Some(5));
        assert_eq!(args.to, Some(3));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["cclosure", "analyze", "--config", "alt.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }
}
