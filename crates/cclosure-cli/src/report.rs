//! Append-only CSV report.
//!
//! Every command writes the same five-column layout so results from many
//! runs can share one file:
//!
//! ```text
//! dataset,kind,target_c,key,value
//! ca-GrQc.txt,summary,,closure_value,43
//! ca-GrQc.txt,histogram,,1,10432
//! ca-GrQc.txt,stage,,enumerate,812.406
//! ca-GrQc.txt,densify,48,1,17
//! ca-GrQc.txt,densify_total,48,total_added,17
//! ```
//!
//! The header is written only when the file is new or empty.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use cclosure_engine::pipeline::{AnalysisReport, DensifyReport, EstimateReport};
use cclosure_engine::estimate::Estimate;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Record<'a> {
    dataset: &'a str,
    kind: &'static str,
    target_c: Option<u32>,
    key: String,
    value: String,
}

pub struct CsvReport {
    writer: csv::Writer<File>,
}

impl CsvReport {
    /// Open `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open CSV report {}", path.display()))?;
        let is_empty = file
            .metadata()
            .with_context(|| format!("failed to stat CSV report {}", path.display()))?
            .len()
            == 0;

        let writer = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);
        Ok(Self { writer })
    }

    fn write(
        &mut self,
        dataset: &str,
        kind: &'static str,
        target_c: Option<u32>,
        key: impl ToString,
        value: impl ToString,
    ) -> Result<()> {
        self.writer.serialize(Record {
            dataset,
            kind,
            target_c,
            key: key.to_string(),
            value: value.to_string(),
        })?;
        Ok(())
    }

    /// Summary, histogram and any optional stage results of an analysis.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be written.
    pub fn write_analysis(&mut self, report: &AnalysisReport) -> Result<()> {
        let name = report.dataset.as_str();
        let s = &report.summary;
        let transitivity = s
            .transitivity
            .map_or_else(|| "undefined".to_string(), |t| format!("{t:.6}"));

        self.write(name, "summary", None, "nodes", s.node_count)?;
        self.write(name, "summary", None, "edges", s.edge_count)?;
        self.write(name, "summary", None, "components", s.component_count)?;
        self.write(name, "summary", None, "isolated_nodes", s.isolated_node_count)?;
        self.write(name, "summary", None, "max_degree", s.max_degree)?;
        self.write(name, "summary", None, "triangles", s.triangles)?;
        self.write(name, "summary", None, "wedges", s.wedges)?;
        self.write(name, "summary", None, "transitivity", transitivity)?;
        self.write(name, "summary", None, "closure_value", s.closure_value)?;
        self.write(name, "summary", None, "fingerprint", &s.fingerprint)?;

        for (count, pairs) in &report.histogram {
            self.write(name, "histogram", None, count, pairs)?;
        }
        if let Some(densify) = &report.densify {
            self.write_densify(name, densify, None)?;
        }
        if let Some(EstimateReport::Complete(estimate)) = &report.estimate {
            self.write_estimate(name, estimate)?;
        }

        let mut elapsed_ms = 0.0;
        for stage in &report.stages {
            elapsed_ms += stage.millis;
            self.write(name, "stage", None, stage.stage, format!("{:.3}", stage.millis))?;
        }
        self.write(name, "stage", None, "elapsed_ms", format!("{elapsed_ms:.3}"))?;
        self.flush()
    }

    /// Per-round edge counts followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be written.
    pub fn write_densify(
        &mut self,
        dataset: &str,
        report: &DensifyReport,
        elapsed_ms: Option<f64>,
    ) -> Result<()> {
        let target = Some(report.target_c);
        for (round, added) in report.rounds.iter().enumerate() {
            self.write(dataset, "densify", target, round + 1, added)?;
        }
        self.write(dataset, "densify_total", target, "total_added", report.total_added)?;
        self.write(dataset, "densify_total", target, "iterations", report.rounds.len())?;
        self.write(dataset, "densify_total", target, "converged", report.converged)?;
        if let Some(ms) = elapsed_ms {
            self.write(dataset, "densify_total", target, "elapsed_ms", format!("{ms:.3}"))?;
        }
        self.flush()
    }

    /// Estimated value and round count.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be written.
    pub fn write_estimate(&mut self, dataset: &str, estimate: &Estimate) -> Result<()> {
        self.write(dataset, "estimate", None, "value", estimate.value)?;
        self.write(dataset, "estimate", None, "rounds", estimate.rounds.len())?;
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("failed to flush CSV report")
    }
}
