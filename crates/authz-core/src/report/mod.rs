//  Copyright (c) 2026 Metaform Systems, Inc
//
//  This program and the accompanying materials are made available under the
//  terms of the Apache License, Version 2.0 which is available at
//  https://www.apache.org/licenses/LICENSE-2.0
//
//  SPDX-License-Identifier: Apache-2.0
//
//  Contributors:
//       Metaform Systems, Inc. - initial API and implementation
//

//! Result aggregation and reporting.
//!
//! Aggregation is read-only over a complete result sequence as produced by the harness: non-empty,
//! strictly ascending scenario IDs and a `passed` flag consistent with the recorded outcome. Anything
//! else is rejected with an [`AggregationError`].

mod aggregate;
mod mem;

#[cfg(test)]
mod tests;

pub use aggregate::{group_failures_by, sample_failures, summarize};
pub use mem::MemoryReportSink;

use crate::capability::Capability;
use crate::harness::{FixtureMap, ProbeStrategy, RunInfo};
use crate::scenario::{Action, Scenario, TestResult};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Counts over a result sequence. Ratios are fractions of `total`; `NOT_RUN` results are neither passed
/// nor failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub executed: usize,
    pub passed: usize,
    pub failed: usize,
    pub not_run: usize,
    pub pass_ratio: f64,
    pub fail_ratio: f64,
}

/// Scenario factor failures can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Audience,
    Action,
    Visibility,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Audience, Dimension::Action, Dimension::Visibility];

    /// Position of the scenario's value in the dimension's enumeration order, and its label.
    fn value_of(&self, scenario: &Scenario) -> (usize, &'static str) {
        match self {
            Dimension::Audience => (scenario.audience() as usize, scenario.audience().as_str()),
            Dimension::Action => (scenario.action() as usize, scenario.action().as_str()),
            Dimension::Visibility => (scenario.visibility() as usize, scenario.visibility().as_str()),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Audience => "audience",
            Dimension::Action => "action",
            Dimension::Visibility => "visibility",
        };
        f.write_str(name)
    }
}

/// Failures sharing one value of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureGroup {
    pub value: String,
    pub count: usize,
    /// Fraction of all failures.
    pub share: f64,
}

/// An action measured through a different capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub action: Action,
    pub probed_with: Capability,
}

/// Everything a sink receives about one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscrepancyReport {
    pub run: RunInfo,
    pub summary: Summary,
    pub failures_by_audience: Vec<FailureGroup>,
    pub failures_by_action: Vec<FailureGroup>,
    pub failures_by_visibility: Vec<FailureGroup>,
    pub sample_failures: Vec<TestResult>,
    pub fixtures: FixtureMap,
    pub substituted_actions: Vec<Substitution>,
    pub results: Vec<TestResult>,
}

impl DiscrepancyReport {
    /// Aggregates `results` and bundles them with the run's context.
    ///
    /// # Errors
    /// Returns an `AggregationError` if `results` is not a complete, consistent result sequence.
    pub fn build(
        run: RunInfo,
        fixtures: FixtureMap,
        probes: &ProbeStrategy,
        results: Vec<TestResult>,
        sample_size: usize,
    ) -> Result<Self, AggregationError> {
        let summary = summarize(&results)?;
        let failures_by_audience = group_failures_by(&results, Dimension::Audience)?;
        let failures_by_action = group_failures_by(&results, Dimension::Action)?;
        let failures_by_visibility = group_failures_by(&results, Dimension::Visibility)?;
        let sample_failures = sample_failures(&results, sample_size)?.into_iter().cloned().collect();
        let substituted_actions = probes
            .substitutions()
            .into_iter()
            .map(|(action, probed_with)| Substitution { action, probed_with })
            .collect();

        Ok(Self {
            run,
            summary,
            failures_by_audience,
            failures_by_action,
            failures_by_visibility,
            sample_failures,
            fixtures,
            substituted_actions,
            results,
        })
    }

    pub fn failures_by(&self, dimension: Dimension) -> &[FailureGroup] {
        match dimension {
            Dimension::Audience => &self.failures_by_audience,
            Dimension::Action => &self.failures_by_action,
            Dimension::Visibility => &self.failures_by_visibility,
        }
    }
}

/// Destination of finished reports.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&self, report: &DiscrepancyReport) -> Result<(), ReportError>;
}

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Result sequence is empty")]
    Empty,

    #[error("Result sequence is not in ascending scenario order: {previous} followed by {current}")]
    DuplicateOrUnordered { previous: u32, current: u32 },

    #[error("Result for scenario {scenario_id} is marked passed={passed} but expected {expected} and got {actual}")]
    InconsistentPassed {
        scenario_id: u32,
        passed: bool,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl ReportError {
    pub fn serialization(message: impl Into<String>) -> Self {
        ReportError::Serialization(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        ReportError::Io(message.into())
    }
}
