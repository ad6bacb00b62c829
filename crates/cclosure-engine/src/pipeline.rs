//! End-to-end analysis of one graph.
//!
//! ```text
//! enumerate → evaluate → summary + histogram → [densify on a clone] → [estimate]
//! ```
//!
//! Each stage is timed with a wall clock and the elapsed times land in the
//! report alongside the results.

use std::time::Instant;

use anyhow::{Context, Result};
use cclosure_core::graph::Graph;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::closure::{ClosureHistogram, enumerate_with};
use crate::densify::{DensifyConfig, DensifyError, DensifyOutcome, densify};
use crate::estimate::{Estimate, EstimateConfig, EstimateError, estimate};
use crate::stats::GraphSummary;

/// Which optional stages to run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Use the rayon enumerator.
    pub parallel: bool,
    /// Densify toward this target on a private copy of the graph.
    pub densify: Option<(u32, DensifyConfig)>,
    pub estimate: Option<EstimateConfig>,
}

/// Wall-clock time of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTime {
    pub stage: &'static str,
    pub millis: f64,
}

/// Densification result as reported, converged or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensifyReport {
    pub target_c: u32,
    pub converged: bool,
    pub rounds: Vec<u64>,
    pub total_added: u64,
    /// Closure value after the last round. Absent when the cap was hit.
    pub final_closure: Option<u32>,
}

impl From<DensifyOutcome> for DensifyReport {
    fn from(outcome: DensifyOutcome) -> Self {
        Self {
            target_c: outcome.target_c,
            converged: true,
            total_added: outcome.total_added(),
            final_closure: Some(outcome.final_closure),
            rounds: outcome.rounds,
        }
    }
}

impl DensifyReport {
    /// Fold a densify result into a report. Non-convergence becomes a report
    /// with `converged: false`; any other error is returned.
    ///
    /// # Errors
    ///
    /// Returns the densify error unless it is
    /// [`DensifyError::NotConverged`].
    pub fn from_result(result: Result<DensifyOutcome, DensifyError>) -> Result<Self, DensifyError> {
        match result {
            Ok(outcome) => Ok(outcome.into()),
            Err(DensifyError::NotConverged {
                target_c,
                rounds,
                edges_added,
            }) => Ok(Self {
                target_c,
                converged: false,
                rounds,
                total_added: edges_added,
                final_closure: None,
            }),
            Err(other) => Err(other),
        }
    }
}

/// Estimator result as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EstimateReport {
    Complete(Estimate),
    /// The graph was too large for the dense matrix.
    Skipped { reason: String },
}

/// Everything [`analyze`] learned about one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub dataset: String,
    pub analyzed_at: DateTime<Utc>,
    pub summary: GraphSummary,
    /// Common-neighbor count → number of non-adjacent pairs.
    pub histogram: ClosureHistogram,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub densify: Option<DensifyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<EstimateReport>,
    pub stages: Vec<StageTime>,
}

/// Analyze `graph` under the name `dataset`.
///
/// # Errors
///
/// Returns an error if enumeration overflows, densification fails for a
/// reason other than the round cap, or the estimator fails for a reason
/// other than the matrix size limit.
#[instrument(skip(graph, options), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn analyze(dataset: &str, graph: &Graph, options: &AnalysisOptions) -> Result<AnalysisReport> {
    let analyzed_at = Utc::now();
    let mut stages = Vec::new();

    let started = Instant::now();
    let enumeration = enumerate_with(graph, options.parallel)
        .with_context(|| format!("failed to enumerate closures of {dataset}"))?;
    stages.push(stage("enumerate", started));

    let started = Instant::now();
    let summary = GraphSummary::compute(graph, &enumeration);
    let histogram = enumeration.table.histogram();
    stages.push(stage("summary", started));
    drop(enumeration);

    info!(
        closure = summary.closure_value,
        triangles = summary.triangles,
        "closure computed"
    );

    let densify_report = match options.densify {
        Some((target_c, config)) => {
            let started = Instant::now();
            let mut working = graph.clone();
            let report = DensifyReport::from_result(densify(&mut working, target_c, &config))
                .with_context(|| format!("failed to densify {dataset} toward c={target_c}"))?;
            if !report.converged {
                warn!(target_c, rounds = report.rounds.len(), "densify did not converge");
            }
            stages.push(stage("densify", started));
            Some(report)
        }
        None => None,
    };

    let estimate_report = match options.estimate {
        Some(config) => {
            let started = Instant::now();
            let report = match estimate(graph, &config) {
                Ok(found) => EstimateReport::Complete(found),
                Err(err @ EstimateError::MatrixTooLarge { .. }) => {
                    warn!(error = %err, "skipping estimate");
                    EstimateReport::Skipped {
                        reason: err.to_string(),
                    }
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to estimate {dataset}"));
                }
            };
            stages.push(stage("estimate", started));
            Some(report)
        }
        None => None,
    };

    Ok(AnalysisReport {
        dataset: dataset.to_string(),
        analyzed_at,
        summary,
        histogram,
        densify: densify_report,
        estimate: estimate_report,
        stages,
    })
}

fn stage(name: &'static str, started: Instant) -> StageTime {
    StageTime {
        stage: name,
        millis: started.elapsed().as_secs_f64() * 1_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pendant_triangle() -> Graph {
        Graph::from_edges([(1, 2), (1, 3), (2, 3), (1, 4)]).expect("valid edges")
    }

    #[test]
    fn baseline_runs_required_stages_only() {
        let report = analyze("toy", &pendant_triangle(), &AnalysisOptions::default())
            .expect("analyze");
        assert_eq!(report.dataset, "toy");
        assert_eq!(report.summary.closure_value, 1);
        assert_eq!(report.histogram.get(&1), Some(&2));
        assert!(report.densify.is_none());
        assert!(report.estimate.is_none());
        let names: Vec<&str> = report.stages.iter().map(|s| s.stage).collect();
        assert_eq!(names, vec!["enumerate", "summary"]);
    }

    #[test]
    fn densify_runs_on_a_copy() {
        let graph = pendant_triangle();
        let options = AnalysisOptions {
            densify: Some((0, DensifyConfig::default())),
            ..AnalysisOptions::default()
        };
        let report = analyze("toy", &graph, &options).expect("analyze");
        let densified = report.densify.expect("densify report");
        assert!(densified.converged);
        assert_eq!(densified.rounds, vec![2]);
        assert_eq!(densified.final_closure, Some(0));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn round_cap_is_reported_not_raised() {
        let graph = Graph::from_edges([(0, 1), (1, 2), (2, 3), (3, 4)]).expect("valid edges");
        let options = AnalysisOptions {
            densify: Some((
                0,
                DensifyConfig {
                    max_rounds: 1,
                    parallel: false,
                },
            )),
            ..AnalysisOptions::default()
        };
        let report = analyze("path", &graph, &options).expect("analyze");
        let densified = report.densify.expect("densify report");
        assert!(!densified.converged);
        assert_eq!(densified.rounds.len(), 1);
        assert_eq!(densified.final_closure, None);
    }

    #[test]
    fn oversized_estimate_is_skipped() {
        let options = AnalysisOptions {
            estimate: Some(EstimateConfig {
                max_nodes: 2,
                parallel: false,
            }),
            ..AnalysisOptions::default()
        };
        let report = analyze("toy", &pendant_triangle(), &options).expect("analyze");
        assert!(matches!(
            report.estimate,
            Some(EstimateReport::Skipped { .. })
        ));
    }

    #[test]
    fn report_serializes_with_tagged_estimate() {
        let options = AnalysisOptions {
            estimate: Some(EstimateConfig::default()),
            ..AnalysisOptions::default()
        };
        let report = analyze("toy", &pendant_triangle(), &options).expect("analyze");
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["estimate"]["status"], "complete");
        assert_eq!(json["summary"]["closure_value"], 1);
        assert!(json.get("densify").is_none());
    }
}
