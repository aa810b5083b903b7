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

use crate::scenario::Outcome;
use std::ops::RangeInclusive;

/// Set of response statuses a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMatch {
    Range(RangeInclusive<u16>),
    Codes(Vec<u16>),
}

impl StatusMatch {
    pub fn matches(&self, status: u16) -> bool {
        match self {
            StatusMatch::Range(range) => range.contains(&status),
            StatusMatch::Codes(codes) => codes.contains(&status),
        }
    }
}

/// Maps a set of statuses to an outcome.
///
/// Rules can only produce `ALLOW`, `DENY` or `UNKNOWN`; `ERROR` is reserved for calls without a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    statuses: StatusMatch,
    outcome: Outcome,
}

impl ClassificationRule {
    pub fn allow(statuses: StatusMatch) -> Self {
        Self {
            statuses,
            outcome: Outcome::Allow,
        }
    }

    pub fn deny(statuses: StatusMatch) -> Self {
        Self {
            statuses,
            outcome: Outcome::Deny,
        }
    }

    pub fn unknown(statuses: StatusMatch) -> Self {
        Self {
            statuses,
            outcome: Outcome::Unknown,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

/// Ordered, total classification of response statuses. First matching rule wins; statuses no rule
/// matches are `UNKNOWN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusClassifier {
    rules: Vec<ClassificationRule>,
}

impl StatusClassifier {
    /// Success class is `ALLOW`; unauthorized, forbidden and not found are `DENY`.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                ClassificationRule::allow(StatusMatch::Range(200..=299)),
                ClassificationRule::deny(StatusMatch::Codes(vec![401, 403, 404])),
            ],
        }
    }

    /// Adds a rule ahead of all existing rules.
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, status: u16) -> Outcome {
        self.rules
            .iter()
            .find(|rule| rule.statuses.matches(status))
            .map(|rule| rule.outcome)
            .unwrap_or(Outcome::Unknown)
    }

    /// Whether a status signals success, as required of fixture setup calls.
    pub fn is_success(&self, status: u16) -> bool {
        self.classify(status) == Outcome::Allow
    }
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::standard()
    }
}
