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

mod aggregate;

use crate::policy::PolicyEngine;
use crate::scenario::{Outcome, TestResult};
use chrono::{TimeZone, Utc};

/// Results for the full scenario population where `outcome` decides each observed outcome.
pub(super) fn results_with(outcome: impl Fn(&crate::scenario::Scenario) -> Outcome) -> Vec<TestResult> {
    let timestamp = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    PolicyEngine::new()
        .generate_scenarios()
        .into_iter()
        .map(|scenario| {
            let actual = outcome(&scenario);
            TestResult::new(scenario, actual, "tester", timestamp)
        })
        .collect()
}

/// Every result matches its expectation.
pub(super) fn all_passing() -> Vec<TestResult> {
    results_with(|scenario| scenario.expected().into())
}
