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

//! Policy evaluation engine.
//!
//! The expected decision for a scenario is derived by a fixed priority chain, first match wins:
//!
//! 1. The owner is allowed every action on every visibility.
//! 2. `public`: only `read` is allowed.
//! 3. `org_public`: allowed when the requester is in the same organization and the action is grantable.
//! 4. `shared`: allowed when the requester holds a permission and the action is grantable.
//! 5. `private`: allowed when the requester holds a permission and the action is grantable.
//!
//! The grantable action sets of rules 3 to 5 come from a [`RuleTable`]. Rules 1 and 2 are not
//! configurable, so owner scenarios and public reads are always expected to be allowed.

#[cfg(test)]
mod tests;

use crate::scenario::{Action, Audience, Context, Decision, Scenario, Visibility};
use bon::Builder;
use std::collections::BTreeSet;

fn read_write() -> BTreeSet<Action> {
    BTreeSet::from([Action::Read, Action::Write])
}

/// Actions grantable to non-owners per visibility.
///
/// The canonical table grants `read` and `write` only; `delete` and `share` stay owner-only.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    #[builder(default = read_write())]
    org_public: BTreeSet<Action>,
    #[builder(default = read_write())]
    shared: BTreeSet<Action>,
    #[builder(default = read_write())]
    private: BTreeSet<Action>,
}

impl RuleTable {
    pub fn canonical() -> Self {
        Self::builder().build()
    }

    /// Grantable actions for a visibility, `None` for `public` whose rule is fixed.
    pub fn grants(&self, visibility: Visibility) -> Option<&BTreeSet<Action>> {
        match visibility {
            Visibility::Public => None,
            Visibility::OrgPublic => Some(&self.org_public),
            Visibility::Shared => Some(&self.shared),
            Visibility::Private => Some(&self.private),
        }
    }

    fn grants_action(&self, visibility: Visibility, action: Action) -> bool {
        self.grants(visibility).is_some_and(|actions| actions.contains(&action))
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Ordered subsets of the factor domains to enumerate.
///
/// Values are kept in enumeration order and de-duplicated, so scenario numbering only depends on which
/// values are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioSpace {
    audiences: Vec<Audience>,
    visibilities: Vec<Visibility>,
    actions: Vec<Action>,
}

impl ScenarioSpace {
    pub fn full() -> Self {
        Self::new(Audience::ALL, Visibility::ALL, Action::ALL)
    }

    pub fn new(
        audiences: impl IntoIterator<Item = Audience>,
        visibilities: impl IntoIterator<Item = Visibility>,
        actions: impl IntoIterator<Item = Action>,
    ) -> Self {
        Self {
            audiences: normalize(audiences),
            visibilities: normalize(visibilities),
            actions: normalize(actions),
        }
    }

    pub fn audiences(&self) -> &[Audience] {
        &self.audiences
    }

    pub fn visibilities(&self) -> &[Visibility] {
        &self.visibilities
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of scenarios the space enumerates.
    pub fn population(&self) -> usize {
        self.audiences.len() * self.visibilities.len() * self.actions.len()
    }
}

impl Default for ScenarioSpace {
    fn default() -> Self {
        Self::full()
    }
}

fn normalize<T: Ord>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    values.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Deterministic oracle for expected authorization decisions.
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyEngine {
    #[builder(default)]
    rules: RuleTable,
}

impl PolicyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Returns the expected decision. Total over the closed domains.
    ///
    /// The audience is accepted for symmetry with the scenario tuple; the chain only reads it through
    /// `context`.
    pub fn evaluate(&self, _audience: Audience, visibility: Visibility, action: Action, context: &Context) -> Decision {
        if context.is_owner {
            return Decision::Allow;
        }

        let granted = match visibility {
            Visibility::Public => action == Action::Read,
            Visibility::OrgPublic => context.same_org && self.rules.grants_action(visibility, action),
            Visibility::Shared | Visibility::Private => {
                context.has_permission && self.rules.grants_action(visibility, action)
            }
        };
        Decision::from_granted(granted)
    }

    /// Enumerates the full factor domains.
    pub fn generate_scenarios(&self) -> Vec<Scenario> {
        self.generate_scenarios_in(&ScenarioSpace::full())
    }

    /// Enumerates `space` with audience outermost, then visibility, then action. Ids start at 1.
    pub fn generate_scenarios_in(&self, space: &ScenarioSpace) -> Vec<Scenario> {
        let mut scenarios = Vec::with_capacity(space.population());
        let mut next_id = 1u32;

        for &audience in space.audiences() {
            for &visibility in space.visibilities() {
                for &action in space.actions() {
                    let context = Context::derive(audience, visibility);
                    let expected = self.evaluate(audience, visibility, action, &context);
                    scenarios.push(Scenario::new(next_id, audience, visibility, action, context, expected));
                    next_id += 1;
                }
            }
        }

        scenarios
    }
}
