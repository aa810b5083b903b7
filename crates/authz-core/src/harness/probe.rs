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

use crate::capability::Capability;
use crate::scenario::Action;
use serde::Serialize;
use std::collections::BTreeMap;

/// Declares which remote capability exercises each action.
///
/// The standard strategy measures `delete` with a `read`: shared fixtures survive the run, but the result
/// for `delete` only shows whether the resource is reachable, not whether it could be deleted. Every
/// substitution is listed by [`ProbeStrategy::substitutions`] and carried into the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeStrategy {
    probes: BTreeMap<Action, Capability>,
}

impl ProbeStrategy {
    /// The capability that performs an action without substitution.
    pub fn natural(action: Action) -> Capability {
        match action {
            Action::Read => Capability::Read,
            Action::Write => Capability::Update,
            Action::Delete => Capability::Delete,
            Action::Share => Capability::Share,
        }
    }

    /// `read→read`, `write→update`, `delete→read`, `share→share`.
    pub fn standard() -> Self {
        Self::direct().with_probe(Action::Delete, Capability::Read)
    }

    /// Every action performs its natural capability, including destructive deletes.
    pub fn direct() -> Self {
        Self {
            probes: Action::ALL
                .into_iter()
                .map(|action| (action, Self::natural(action)))
                .collect(),
        }
    }

    pub fn with_probe(mut self, action: Action, capability: Capability) -> Self {
        self.probes.insert(action, capability);
        self
    }

    pub fn capability_for(&self, action: Action) -> Capability {
        self.probes
            .get(&action)
            .copied()
            .unwrap_or_else(|| Self::natural(action))
    }

    /// Actions measured through a capability other than their natural one.
    pub fn substitutions(&self) -> Vec<(Action, Capability)> {
        self.probes
            .iter()
            .filter(|(action, capability)| Self::natural(**action) != **capability)
            .map(|(action, capability)| (*action, *capability))
            .collect()
    }
}

impl Default for ProbeStrategy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_strategy_substitutes_delete_only() {
        let probes = ProbeStrategy::standard();

        assert_eq!(probes.capability_for(Action::Read), Capability::Read);
        assert_eq!(probes.capability_for(Action::Write), Capability::Update);
        assert_eq!(probes.capability_for(Action::Delete), Capability::Read);
        assert_eq!(probes.capability_for(Action::Share), Capability::Share);
        assert_eq!(probes.substitutions(), vec![(Action::Delete, Capability::Read)]);
    }

    #[test]
    fn test_direct_strategy_has_no_substitutions() {
        let probes = ProbeStrategy::direct();

        assert_eq!(probes.capability_for(Action::Delete), Capability::Delete);
        assert!(probes.substitutions().is_empty());
    }
}
