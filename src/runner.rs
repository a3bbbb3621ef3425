//! Loop controller - the bounded Generate -> Validate -> Correct cycle
//!
//! Drives generation attempts against the deterministic linter with an
//! explicit iteration ceiling, accumulating feedback between attempts.
//! Exhaustion is a documented partial-success outcome, not an error: the
//! caller gets the last candidate plus the full log either way.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ArchitectError, Result};
use crate::feedback::FeedbackComposer;
use crate::generator::{GenerationRequest, Generator};
use crate::lint::{Finding, Linter};

/// Default ceiling: one initial attempt plus two remedial iterations
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Configuration for the loop controller
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum generator invocations per request
    pub max_iterations: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// The terminal, externally visible artifact of one request.
///
/// This exact shape is the boundary contract consumed by the presentation
/// layer. `success == true` implies the code linted clean against the same
/// token set that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub code: String,
    /// Number of generator invocations actually performed
    pub iterations: u32,
    pub logs: Vec<String>,
    pub success: bool,
}

/// One iteration's candidate, findings, and log slice. Append-only for the
/// duration of a request; rebuilt from scratch on refinement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub index: u32,
    pub candidate: String,
    pub findings: Vec<Finding>,
    pub log_lines: Vec<String>,
    pub started_at: DateTime<Utc>,
}

/// Cancellation probe checked before every generator call.
///
/// A stopped request returns `ArchitectError::Cancelled`; partial results
/// are discarded, never returned as success.
#[async_trait]
pub trait SignalChecker: Send + Sync {
    async fn should_stop(&self) -> bool;
}

/// Signal checker for callers without cancellation
pub struct NoOpSignalChecker;

#[async_trait]
impl SignalChecker for NoOpSignalChecker {
    async fn should_stop(&self) -> bool {
        false
    }
}

/// Drives the bounded correction loop for one request at a time
pub struct LoopController {
    generator: Generator,
    linter: Linter,
    composer: FeedbackComposer,
    config: LoopConfig,
}

impl LoopController {
    pub fn new(generator: Generator, config: LoopConfig) -> Self {
        Self {
            generator,
            linter: Linter::new(),
            composer: FeedbackComposer::new(),
            config,
        }
    }

    /// Run a request to completion without cancellation support
    pub async fn run(&self, request: GenerationRequest) -> Result<GenerationResult> {
        self.run_with_signals(request, &NoOpSignalChecker).await
    }

    /// Run a request to completion, checking the signal before each attempt
    pub async fn run_with_signals(
        &self,
        request: GenerationRequest,
        signals: &dyn SignalChecker,
    ) -> Result<GenerationResult> {
        let (result, _records) = self.run_traced(request, signals).await?;
        Ok(result)
    }

    /// Like `run_with_signals`, also returning the per-iteration records
    pub async fn run_traced(
        &self,
        request: GenerationRequest,
        signals: &dyn SignalChecker,
    ) -> Result<(GenerationResult, Vec<IterationRecord>)> {
        let mut logs: Vec<String> = Vec::new();
        let mut records: Vec<IterationRecord> = Vec::new();
        let mut feedback: Option<String> = None;
        let mut candidate = String::new();
        let mut iterations = 0u32;

        for index in 1..=self.config.max_iterations {
            if signals.should_stop().await {
                log::warn!("request cancelled after {} iteration(s)", iterations);
                return Err(ArchitectError::Cancelled);
            }

            let started_at = Utc::now();
            let mut lines = vec![format!("[GEN] iteration {}: generating candidate", index)];

            candidate = match self.generator.generate(&request, feedback.as_deref()).await {
                Ok(code) => code,
                Err(e) => {
                    // Provider failure is fatal to the request, never retried here.
                    log::error!("provider failure with {} completed iterations: {}", iterations, e);
                    return Err(e);
                }
            };
            iterations += 1;

            lines.push(format!("[LINT] iteration {}: linting candidate ({} bytes)", index, candidate.len()));
            let findings = self.linter.lint(&candidate, &request.tokens);

            if findings.is_empty() {
                lines.push(format!("[OK] iteration {}: validation passed", index));
                log::info!("generation succeeded in {} iteration(s)", iterations);

                logs.extend(lines.iter().cloned());
                records.push(IterationRecord {
                    index,
                    candidate: candidate.clone(),
                    findings,
                    log_lines: lines,
                    started_at,
                });

                return Ok((
                    GenerationResult {
                        code: candidate,
                        iterations,
                        logs,
                        success: true,
                    },
                    records,
                ));
            }

            for finding in &findings {
                lines.push(format!("[LINT] {}", finding));
            }

            if index < self.config.max_iterations {
                lines.push(format!(
                    "[RETRY] iteration {}: {} finding(s), composing corrective feedback",
                    index,
                    findings.len()
                ));
                feedback = Some(self.composer.compose(&findings, &request.tokens));
            }

            log::debug!("iteration {} failed with {} finding(s)", index, findings.len());
            logs.extend(lines.iter().cloned());
            records.push(IterationRecord {
                index,
                candidate: candidate.clone(),
                findings,
                log_lines: lines,
                started_at,
            });
        }

        logs.push(format!(
            "[FAIL] max iterations ({}) exhausted, returning last candidate",
            self.config.max_iterations
        ));
        log::warn!("generation exhausted {} iterations without passing", iterations);

        Ok((
            GenerationResult {
                code: candidate,
                iterations,
                logs,
                success: false,
            },
            records,
        ))
    }
}
