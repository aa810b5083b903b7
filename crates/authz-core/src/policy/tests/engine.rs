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

use crate::policy::{PolicyEngine, RuleTable, ScenarioSpace};
use crate::scenario::{Action, Audience, Context, Decision, Visibility};
use rstest::rstest;
use std::collections::BTreeSet;

fn ctx(is_owner: bool, same_org: bool, has_permission: bool) -> Context {
    Context {
        is_owner,
        has_permission,
        same_org,
    }
}

#[test]
fn test_owner_deletes_private_resource() {
    let engine = PolicyEngine::new();

    let decision = engine.evaluate(Audience::Owner, Visibility::Private, Action::Delete, &ctx(true, true, false));

    assert_eq!(decision, Decision::Allow);
}

#[test]
fn test_external_reads_private_resource() {
    let engine = PolicyEngine::new();

    let decision = engine.evaluate(Audience::External, Visibility::Private, Action::Read, &ctx(false, false, false));

    assert_eq!(decision, Decision::Deny);
}

#[test]
fn test_external_reads_public_resource() {
    let engine = PolicyEngine::new();

    let decision = engine.evaluate(Audience::External, Visibility::Public, Action::Read, &ctx(false, false, false));

    assert_eq!(decision, Decision::Allow);
}

#[rstest]
#[case(Visibility::Public, Action::Write, ctx(false, true, true), Decision::Deny)]
#[case(Visibility::OrgPublic, Action::Read, ctx(false, true, false), Decision::Allow)]
#[case(Visibility::OrgPublic, Action::Write, ctx(false, true, false), Decision::Allow)]
#[case(Visibility::OrgPublic, Action::Delete, ctx(false, true, false), Decision::Deny)]
#[case(Visibility::OrgPublic, Action::Read, ctx(false, false, true), Decision::Deny)]
#[case(Visibility::Shared, Action::Write, ctx(false, false, true), Decision::Allow)]
#[case(Visibility::Shared, Action::Share, ctx(false, false, true), Decision::Deny)]
#[case(Visibility::Shared, Action::Read, ctx(false, true, false), Decision::Deny)]
#[case(Visibility::Private, Action::Read, ctx(false, false, true), Decision::Allow)]
#[case(Visibility::Private, Action::Delete, ctx(false, false, true), Decision::Deny)]
fn test_rule_chain(
    #[case] visibility: Visibility,
    #[case] action: Action,
    #[case] context: Context,
    #[case] expected: Decision,
) {
    let engine = PolicyEngine::new();

    assert_eq!(engine.evaluate(Audience::External, visibility, action, &context), expected);
}

#[test]
fn test_canonical_matrix_allow_count() {
    let scenarios = PolicyEngine::new().generate_scenarios();

    let allowed: Vec<_> = scenarios
        .iter()
        .filter(|s| s.expected() == Decision::Allow)
        .map(|s| (s.audience(), s.visibility(), s.action()))
        .collect();

    // 16 owner scenarios, 4 collaborator grants (shared/private x read/write), 2 org member grants on
    // org_public, and public reads for the three non-owner audiences
    assert_eq!(allowed.len(), 16 + 4 + 2 + 3);
    assert!(allowed.contains(&(Audience::OrgMember, Visibility::OrgPublic, Action::Write)));
    assert!(!allowed.contains(&(Audience::OrgMember, Visibility::Shared, Action::Read)));
    assert!(!allowed.contains(&(Audience::Collaborator, Visibility::OrgPublic, Action::Read)));
}

#[test]
fn test_scenario_ordering_and_ids() {
    let scenarios = PolicyEngine::new().generate_scenarios();

    assert_eq!(scenarios.len(), 64);
    assert_eq!(scenarios[0].id(), 1);
    assert_eq!(
        (scenarios[0].audience(), scenarios[0].visibility(), scenarios[0].action()),
        (Audience::Owner, Visibility::Private, Action::Read)
    );
    assert_eq!(
        (scenarios[5].audience(), scenarios[5].visibility(), scenarios[5].action()),
        (Audience::Owner, Visibility::Shared, Action::Write)
    );
    assert_eq!(scenarios[16].audience(), Audience::Collaborator);
    assert_eq!(scenarios[63].id(), 64);
    assert_eq!(
        (scenarios[63].audience(), scenarios[63].visibility(), scenarios[63].action()),
        (Audience::External, Visibility::Public, Action::Share)
    );
    assert!(scenarios.windows(2).all(|w| w[1].id() == w[0].id() + 1));
}

#[test]
fn test_generation_is_deterministic() {
    let engine = PolicyEngine::new();

    assert_eq!(engine.generate_scenarios(), engine.generate_scenarios());
}

#[test]
fn test_space_normalizes_order_and_duplicates() {
    let space = ScenarioSpace::new(
        [Audience::External, Audience::Owner, Audience::External],
        [Visibility::Public],
        [Action::Share, Action::Read],
    );

    assert_eq!(space.audiences(), &[Audience::Owner, Audience::External]);
    assert_eq!(space.actions(), &[Action::Read, Action::Share]);
    assert_eq!(space.population(), 4);

    let scenarios = PolicyEngine::new().generate_scenarios_in(&space);
    let ids: Vec<u32> = scenarios.iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(scenarios[2].audience(), Audience::External);
    assert_eq!(scenarios[2].action(), Action::Read);
}

#[rstest]
#[case(ScenarioSpace::new([Audience::Owner], [Visibility::Private], [Action::Read]), 1)]
#[case(ScenarioSpace::new([Audience::External], Visibility::ALL, [Action::Share]), 4)]
#[case(ScenarioSpace::new(Audience::ALL, Visibility::ALL, []), 0)]
#[case(ScenarioSpace::full(), 64)]
fn test_population_matches_domain_product(#[case] space: ScenarioSpace, #[case] expected: usize) {
    let scenarios = PolicyEngine::new().generate_scenarios_in(&space);

    assert_eq!(scenarios.len(), expected);
    assert_eq!(space.population(), expected);
}

#[test]
fn test_custom_rule_table() {
    let rules = RuleTable::builder()
        .shared(BTreeSet::from([Action::Read]))
        .private(BTreeSet::new())
        .build();
    let engine = PolicyEngine::builder().rules(rules).build();
    let collaborator = ctx(false, false, true);

    assert_eq!(
        engine.evaluate(Audience::Collaborator, Visibility::Shared, Action::Read, &collaborator),
        Decision::Allow
    );
    assert_eq!(
        engine.evaluate(Audience::Collaborator, Visibility::Shared, Action::Write, &collaborator),
        Decision::Deny
    );
    assert_eq!(
        engine.evaluate(Audience::Collaborator, Visibility::Private, Action::Read, &collaborator),
        Decision::Deny
    );
    assert_eq!(
        engine.evaluate(Audience::OrgMember, Visibility::OrgPublic, Action::Write, &ctx(false, true, false)),
        Decision::Allow
    );
    assert!(engine.rules().grants(Visibility::Public).is_none());
}
