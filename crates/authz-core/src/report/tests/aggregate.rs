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

use super::{all_passing, results_with};
use crate::report::{AggregationError, Dimension, group_failures_by, sample_failures, summarize};
use crate::scenario::{Action, Audience, Decision, Outcome, Visibility};
use rstest::rstest;

#[test]
fn test_summary_of_passing_run() {
    let summary = summarize(&all_passing()).unwrap();

    assert_eq!(summary.total, 64);
    assert_eq!(summary.executed, 64);
    assert_eq!(summary.passed, 64);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.not_run, 0);
    assert_eq!(summary.pass_ratio, 1.0);
    assert_eq!(summary.fail_ratio, 0.0);
}

#[test]
fn test_summary_counts_unknown_and_error_as_failures() {
    let results = results_with(|scenario| match (scenario.audience(), scenario.action()) {
        (Audience::External, Action::Read) => Outcome::Error,
        (Audience::External, Action::Write) => Outcome::Unknown,
        _ => scenario.expected().into(),
    });

    let summary = summarize(&results).unwrap();

    assert_eq!(summary.failed, 8);
    assert_eq!(summary.passed, 56);
    assert_eq!(summary.fail_ratio, 0.125);
}

#[test]
fn test_not_run_is_neither_passed_nor_failed() {
    let results = results_with(|scenario| {
        if scenario.id() > 60 {
            Outcome::NotRun
        } else {
            scenario.expected().into()
        }
    });

    let summary = summarize(&results).unwrap();

    assert_eq!(summary.executed, 60);
    assert_eq!(summary.passed, 60);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.not_run, 4);
    assert!(sample_failures(&results, 10).unwrap().is_empty());
}

#[test]
fn test_summarize_is_idempotent() {
    let results = results_with(|_| Outcome::Deny);

    assert_eq!(summarize(&results).unwrap(), summarize(&results).unwrap());
}

#[test]
fn test_empty_sequence_is_rejected() {
    assert!(matches!(summarize(&[]), Err(AggregationError::Empty)));
    assert!(matches!(
        group_failures_by(&[], Dimension::Audience),
        Err(AggregationError::Empty)
    ));
    assert!(matches!(sample_failures(&[], 3), Err(AggregationError::Empty)));
}

#[rstest]
#[case::duplicate(vec![0, 1, 1, 2])]
#[case::reversed(vec![3, 2, 1, 0])]
fn test_unordered_sequence_is_rejected(#[case] order: Vec<usize>) {
    let results = all_passing();
    let shuffled: Vec<_> = order.into_iter().map(|i| results[i].clone()).collect();

    assert!(matches!(
        summarize(&shuffled),
        Err(AggregationError::DuplicateOrUnordered { .. })
    ));
}

#[test]
fn test_inconsistent_passed_flag_is_rejected() {
    let mut results = results_with(|_| Outcome::Deny);
    let index = results.iter().position(|r| r.expected == Decision::Allow).unwrap();
    results[index].passed = true;

    let err = summarize(&results).unwrap_err();

    assert!(matches!(err, AggregationError::InconsistentPassed { scenario_id: 1, .. }));
}

#[test]
fn test_group_failures_by_sorts_by_count_then_enumeration_order() {
    // Owner is denied everywhere (16 failures); external gets ALLOW on private (4 failures),
    // collaborator gets ALLOW on private share and delete (2 failures)
    let results = results_with(|scenario| match (scenario.audience(), scenario.visibility(), scenario.action()) {
        (Audience::Owner, _, _) => Outcome::Deny,
        (Audience::External, Visibility::Private, _) => Outcome::Allow,
        (Audience::Collaborator, Visibility::Private, Action::Delete | Action::Share) => Outcome::Allow,
        _ => scenario.expected().into(),
    });

    let by_audience = group_failures_by(&results, Dimension::Audience).unwrap();
    let by_action = group_failures_by(&results, Dimension::Action).unwrap();

    let audiences: Vec<_> = by_audience.iter().map(|g| (g.value.as_str(), g.count)).collect();
    assert_eq!(audiences, vec![("owner", 16), ("external", 4), ("collaborator", 2)]);
    assert_eq!(by_audience[0].share, 16.0 / 22.0);

    // read and write tie at 5, delete and share tie at 6
    let actions: Vec<_> = by_action.iter().map(|g| (g.value.as_str(), g.count)).collect();
    assert_eq!(actions, vec![("delete", 6), ("share", 6), ("read", 5), ("write", 5)]);
}

#[test]
fn test_group_failures_by_breaks_ties_by_enumeration_not_first_failure() {
    // Public failures come first in ID order (owner), private ones last (external)
    let results = results_with(|scenario| match (scenario.audience(), scenario.visibility()) {
        (Audience::Owner, Visibility::Public) => Outcome::Deny,
        (Audience::External, Visibility::Private) => Outcome::Allow,
        _ => scenario.expected().into(),
    });

    let groups = group_failures_by(&results, Dimension::Visibility).unwrap();

    let visibilities: Vec<_> = groups.iter().map(|g| (g.value.as_str(), g.count)).collect();
    assert_eq!(visibilities, vec![("private", 4), ("public", 4)]);
    assert!(groups.iter().all(|g| g.share == 0.5));
}

#[test]
fn test_group_without_failures_is_empty() {
    for dimension in Dimension::ALL {
        assert!(group_failures_by(&all_passing(), dimension).unwrap().is_empty());
    }
}

#[rstest]
#[case(0, 0)]
#[case(3, 3)]
#[case(100, 16)]
fn test_sample_failures_takes_first_in_id_order(#[case] n: usize, #[case] expected: usize) {
    let results = results_with(|scenario| match scenario.audience() {
        Audience::External => Outcome::Error,
        _ => scenario.expected().into(),
    });

    let sample = sample_failures(&results, n).unwrap();

    assert_eq!(sample.len(), expected);
    assert!(sample.windows(2).all(|w| w[0].scenario_id() < w[1].scenario_id()));
    if let Some(first) = sample.first() {
        assert_eq!(first.scenario_id(), 49);
    }
}
