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

use super::classify::StatusClassifier;
use super::probe::ProbeStrategy;
use crate::capability::{LinkScope, LinkType, ShareParams};
use crate::policy::{PolicyEngine, ScenarioSpace};
use crate::util::{Clock, default_clock};
use bon::Builder;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_FIXTURE_PREFIX: &str = "multiuser_test";

/// Link requested by `share` scenarios: the least privileged link a requester can ask for.
pub const DEFAULT_PROBE_SHARE_PARAMS: ShareParams = ShareParams {
    link_type: LinkType::View,
    scope: LinkScope::Anonymous,
};

/// How scenarios are scheduled during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// All scenarios in ID order on the calling task.
    #[default]
    Sequential,
    /// One task per visibility; scenarios within a visibility run in ID order.
    Partitioned,
}

/// Configuration of a differential run.
#[derive(Builder, Clone)]
pub struct HarnessConfig {
    /// Engine producing the expected decisions
    #[builder(default)]
    pub engine: PolicyEngine,
    /// Scenarios to generate (defaults to all 64 combinations)
    #[builder(default)]
    pub space: ScenarioSpace,
    /// Capability used to exercise each action (defaults to the standard, non-destructive table)
    #[builder(default)]
    pub probes: ProbeStrategy,
    #[builder(default)]
    pub classifier: StatusClassifier,
    /// Link parameters used when sharing the `shared` fixture (defaults to edit/anonymous)
    #[builder(default)]
    pub share_params: ShareParams,
    /// Link parameters of every `share` scenario (defaults to view/anonymous)
    #[builder(default = DEFAULT_PROBE_SHARE_PARAMS)]
    pub probe_share_params: ShareParams,
    /// Prefix of fixture names, `{prefix}_{visibility}_file.txt`
    #[builder(default = DEFAULT_FIXTURE_PREFIX.to_string(), into)]
    pub fixture_prefix: String,
    /// Pause after setup so the remote service can apply sharing changes
    #[builder(default = Duration::ZERO)]
    pub settle_delay: Duration,
    /// Pause between consecutive scenarios of one sequence
    #[builder(default = Duration::ZERO)]
    pub scenario_delay: Duration,
    #[builder(default)]
    pub execution_mode: ExecutionMode,
    #[builder(default = default_clock())]
    pub clock: Arc<dyn Clock>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("engine", &self.engine)
            .field("space", &self.space)
            .field("probes", &self.probes)
            .field("classifier", &self.classifier)
            .field("share_params", &self.share_params)
            .field("probe_share_params", &self.probe_share_params)
            .field("fixture_prefix", &self.fixture_prefix)
            .field("settle_delay", &self.settle_delay)
            .field("scenario_delay", &self.scenario_delay)
            .field("execution_mode", &self.execution_mode)
            .field("clock", &"<clock>")
            .finish()
    }
}
