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

use super::{AggregationError, Dimension, FailureGroup, Summary};
use crate::scenario::TestResult;
use std::collections::BTreeMap;

/// Counts passed, failed and unexecuted results.
pub fn summarize(results: &[TestResult]) -> Result<Summary, AggregationError> {
    validate(results)?;

    let total = results.len();
    let executed = results.iter().filter(|r| r.actual.was_executed()).count();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| r.is_failure()).count();

    Ok(Summary {
        total,
        executed,
        passed,
        failed,
        not_run: total - executed,
        pass_ratio: passed as f64 / total as f64,
        fail_ratio: failed as f64 / total as f64,
    })
}

/// Failure counts per value of `dimension`, most failures first. Equal counts keep the dimension's
/// enumeration order. Values without failures are omitted.
pub fn group_failures_by(results: &[TestResult], dimension: Dimension) -> Result<Vec<FailureGroup>, AggregationError> {
    validate(results)?;

    let mut counts: BTreeMap<(usize, &'static str), usize> = BTreeMap::new();
    for result in results.iter().filter(|r| r.is_failure()) {
        *counts.entry(dimension.value_of(&result.scenario)).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    let mut groups: Vec<FailureGroup> = counts
        .into_iter()
        .map(|((_, value), count)| FailureGroup {
            value: value.to_string(),
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    // Stable sort, ties stay in enumeration order
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(groups)
}

/// The first `n` failures in scenario-ID order.
pub fn sample_failures(results: &[TestResult], n: usize) -> Result<Vec<&TestResult>, AggregationError> {
    validate(results)?;
    Ok(results.iter().filter(|r| r.is_failure()).take(n).collect())
}

fn validate(results: &[TestResult]) -> Result<(), AggregationError> {
    if results.is_empty() {
        return Err(AggregationError::Empty);
    }

    for pair in results.windows(2) {
        let (previous, current) = (pair[0].scenario_id(), pair[1].scenario_id());
        if current <= previous {
            return Err(AggregationError::DuplicateOrUnordered { previous, current });
        }
    }

    if let Some(result) = results.iter().find(|r| r.passed != r.actual.matches(r.expected)) {
        return Err(AggregationError::InconsistentPassed {
            scenario_id: result.scenario_id(),
            passed: result.passed,
            expected: result.expected.to_string(),
            actual: result.actual.to_string(),
        });
    }
    Ok(())
}
