//! Subcommand handlers.
//!
//! Every command walks its datasets in order, loading and analyzing each one
//! start to finish before touching the next. A failing dataset is reported
//! and skipped; the command fails at the end if any dataset did.

pub mod analyze;
pub mod densify;
pub mod estimate;
pub mod sweep;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use cclosure_core::config::CclosureConfig;
use cclosure_core::edgelist::{EdgeListError, LoadStats, load_edge_list};
use cclosure_core::error::ErrorCode;
use cclosure_core::graph::Graph;
use tracing::info;

use crate::output::{CliError, OutputMode, render_error};
use crate::report::CsvReport;

/// Settings shared by every command.
pub struct Context {
    pub output: OutputMode,
    pub quiet: bool,
    pub config: CclosureConfig,
}

impl Context {
    /// Files named on the command line, or the configured datasets.
    ///
    /// # Errors
    ///
    /// Fails when neither source names a dataset.
    pub fn datasets(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if !files.is_empty() {
            return Ok(files.to_vec());
        }
        let configured = self.config.data.dataset_paths();
        if configured.is_empty() {
            render_error(
                self.output,
                &CliError::coded(
                    ErrorCode::DatasetNotFound,
                    "no datasets given and none configured under [data] datasets",
                ),
            )?;
            bail!("no datasets to process");
        }
        Ok(configured)
    }

    /// Open the CSV report when `--csv` was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn csv(&self, path: Option<&Path>) -> Result<Option<CsvReport>> {
        match path {
            Some(path) => match CsvReport::append(path) {
                Ok(report) => Ok(Some(report)),
                Err(err) => {
                    render_error(
                        self.output,
                        &CliError::coded(ErrorCode::ReportWriteFailed, format!("{err:#}")),
                    )?;
                    Err(err)
                }
            },
            None => Ok(None),
        }
    }
}

/// A loaded dataset.
pub struct Dataset {
    pub name: String,
    pub graph: Graph,
    pub stats: LoadStats,
}

/// Display name of a dataset: its file name.
pub fn dataset_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Load `path`, reporting failure as a coded CLI error.
///
/// Returns `None` after rendering the error.
///
/// # Errors
///
/// Returns an error only if the error itself cannot be rendered.
pub fn load(ctx: &Context, path: &Path) -> Result<Option<Dataset>> {
    let name = dataset_name(path);
    match load_edge_list(path) {
        Ok((graph, stats)) => {
            info!(
                dataset = %name,
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                self_loops = stats.self_loops,
                duplicates = stats.duplicate_edges,
                "dataset loaded"
            );
            Ok(Some(Dataset { name, graph, stats }))
        }
        Err(err) => {
            let code = match &err {
                EdgeListError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    ErrorCode::DatasetNotFound
                }
                EdgeListError::Io(_) => ErrorCode::InternalUnexpected,
                EdgeListError::Malformed { .. } | EdgeListError::InvalidNode { .. } => {
                    ErrorCode::MalformedEdgeList
                }
            };
            render_error(
                ctx.output,
                &CliError::coded(code, format!("{}: {err}", path.display())).for_dataset(name),
            )?;
            Ok(None)
        }
    }
}

/// Fail the command when any dataset failed.
///
/// # Errors
///
/// Returns an error naming the failure count.
pub fn finish(failed: usize, total: usize) -> Result<()> {
    if failed > 0 {
        bail!("{failed} of {total} dataset(s) failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_name_is_file_name() {
        assert_eq!(dataset_name(Path::new("data/ca-GrQc.txt")), "ca-GrQc.txt");
        assert_eq!(dataset_name(Path::new("toy.txt")), "toy.txt");
    }

    #[test]
    fn explicit_files_win_over_config() {
        let ctx = Context {
            output: OutputMode::Text,
            quiet: false,
            config: CclosureConfig::default(),
        };
        let files = vec![PathBuf::from("a.txt")];
        assert_eq!(ctx.datasets(&files).expect("datasets"), files);
    }

    #[test]
    fn configured_datasets_are_used_when_no_files() {
        let mut config = CclosureConfig::default();
        config.data.datasets = vec!["wiki-Vote.txt".to_string()];
        let ctx = Context {
            output: OutputMode::Text,
            quiet: false,
            config,
        };
        assert_eq!(
            ctx.datasets(&[]).expect("datasets"),
            vec![PathBuf::from("data/wiki-Vote.txt")]
        );
    }

    #[test]
    fn finish_reports_failures() {
        assert!(finish(0, 3).is_ok());
        let err = finish(1, 3).expect_err("one failure");
        assert_eq!(err.to_string(), "1 of 3 dataset(s) failed");
    }
}
