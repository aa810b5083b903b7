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

//! Scenario model: the closed factor domains, the derived context and the immutable scenario and
//! result records shared by the engine, the harness and the aggregator.

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of requester relative to the owner of a resource.
///
/// Variant order is the enumeration order used for scenario numbering and report tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Owner,
    Collaborator,
    OrgMember,
    External,
}

impl Audience {
    pub const ALL: [Audience; 4] = [
        Audience::Owner,
        Audience::Collaborator,
        Audience::OrgMember,
        Audience::External,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Owner => "owner",
            Audience::Collaborator => "collaborator",
            Audience::OrgMember => "org_member",
            Audience::External => "external",
        }
    }
}

/// Sharing scope configured on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Shared,
    OrgPublic,
    Public,
}

impl Visibility {
    pub const ALL: [Visibility; 4] = [
        Visibility::Private,
        Visibility::Shared,
        Visibility::OrgPublic,
        Visibility::Public,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Shared => "shared",
            Visibility::OrgPublic => "org_public",
            Visibility::Public => "public",
        }
    }
}

/// Operation attempted on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Write,
    Delete,
    Share,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Write, Action::Delete, Action::Share];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
            Action::Share => "share",
        }
    }
}

/// Verdict of the policy for a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn from_granted(granted: bool) -> Self {
        if granted { Decision::Allow } else { Decision::Deny }
    }
}

/// Classified real-world result of attempting a scenario.
///
/// A superset of [`Decision`]: `Unknown` covers responses that are neither success nor denial, `Error`
/// covers calls that produced no response at all, and `NotRun` marks scenarios a cancelled run never
/// executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Allow,
    Deny,
    Unknown,
    Error,
    NotRun,
}

impl Outcome {
    pub fn matches(&self, decision: Decision) -> bool {
        matches!(
            (self, decision),
            (Outcome::Allow, Decision::Allow) | (Outcome::Deny, Decision::Deny)
        )
    }

    pub fn was_executed(&self) -> bool {
        !matches!(self, Outcome::NotRun)
    }
}

impl From<Decision> for Outcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => Outcome::Allow,
            Decision::Deny => Outcome::Deny,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Audience, Visibility, Action);

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Outcome::from(*self).fmt(f)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Allow => "ALLOW",
            Outcome::Deny => "DENY",
            Outcome::Unknown => "UNKNOWN",
            Outcome::Error => "ERROR",
            Outcome::NotRun => "NOT_RUN",
        };
        f.write_str(label)
    }
}

/// Booleans derived from the requester's audience. They are the only input the rule chain reads besides
/// visibility and action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Context {
    pub is_owner: bool,
    pub has_permission: bool,
    pub same_org: bool,
}

impl Context {
    /// Fixed audience to context mapping.
    ///
    /// Only `collaborator` holds an explicit permission; `org_member` reaches resources solely through
    /// `same_org`. Visibility does not currently influence the mapping.
    pub fn derive(audience: Audience, _visibility: Visibility) -> Self {
        Self {
            is_owner: audience == Audience::Owner,
            has_permission: audience == Audience::Collaborator,
            same_org: matches!(audience, Audience::Owner | Audience::OrgMember),
        }
    }
}

/// One fully specified test case. Only the policy engine creates scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    id: u32,
    audience: Audience,
    visibility: Visibility,
    action: Action,
    context: Context,
    expected: Decision,
}

impl Scenario {
    pub(crate) fn new(
        id: u32,
        audience: Audience,
        visibility: Visibility,
        action: Action,
        context: Context,
        expected: Decision,
    ) -> Self {
        Self {
            id,
            audience,
            visibility,
            action,
            context,
            expected,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn expected(&self) -> Decision {
        self.expected
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scenario {}: {} {} {}",
            self.id, self.audience, self.action, self.visibility
        )
    }
}

/// Recorded comparison of one scenario's expected decision with its observed outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub scenario: Scenario,
    pub expected: Decision,
    pub actual: Outcome,
    pub passed: bool,
    /// Identity label whose credential exercised the scenario.
    pub tested_as: String,
    pub timestamp: DateTime<Utc>,
    /// Raw response status, absent when no response was received.
    pub status: Option<u16>,
    pub detail: Option<String>,
}

impl TestResult {
    pub fn new(scenario: Scenario, actual: Outcome, tested_as: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let expected = scenario.expected();
        Self {
            scenario,
            expected,
            actual,
            passed: actual.matches(expected),
            tested_as: tested_as.into(),
            timestamp,
            status: None,
            detail: None,
        }
    }

    /// Result for a scenario a cancelled run never executed.
    pub fn not_run(scenario: Scenario, tested_as: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(scenario, Outcome::NotRun, tested_as, timestamp).with_detail("run cancelled before execution")
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn scenario_id(&self) -> u32 {
        self.scenario.id()
    }

    /// A failure is an executed scenario whose outcome differs from the expected decision.
    pub fn is_failure(&self) -> bool {
        self.actual.was_executed() && !self.passed
    }
}
