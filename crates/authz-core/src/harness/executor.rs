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

use super::FixtureMap;
use super::classify::StatusClassifier;
use super::probe::ProbeStrategy;
use crate::capability::{Capability, CapabilityClient, CapabilityError, ShareParams};
use crate::identity::{IdentityError, IdentityResolver};
use crate::scenario::{Audience, Outcome, Scenario, TestResult, Visibility};
use crate::util::Clock;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Recorded as `tested_as` when the audience has no identity mapping.
pub(crate) const UNMAPPED_IDENTITY: &str = "unmapped";

const PROGRESS_INTERVAL: usize = 10;

/// Failure of a single scenario. Recorded as an `ERROR` outcome; never aborts the run.
#[derive(Debug, Error)]
pub enum ScenarioExecutionError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("No fixture for visibility '{0}'")]
    MissingFixture(Visibility),
}

pub(crate) struct Progress {
    completed: AtomicUsize,
    total: usize,
}

impl Progress {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    fn record(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if completed % PROGRESS_INTERVAL == 0 {
            info!("Progress: {}/{} scenarios tested", completed, self.total);
        }
    }
}

/// Executes scenarios against one set of fixtures. Cheap to clone, one clone per partition task.
#[derive(Clone)]
pub(crate) struct ScenarioExecutor {
    pub(crate) client: Arc<dyn CapabilityClient>,
    pub(crate) resolver: Arc<IdentityResolver>,
    pub(crate) fixtures: Arc<FixtureMap>,
    pub(crate) probes: Arc<ProbeStrategy>,
    pub(crate) classifier: Arc<StatusClassifier>,
    pub(crate) share_params: ShareParams,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) scenario_delay: Duration,
    pub(crate) progress: Arc<Progress>,
}

impl ScenarioExecutor {
    /// Executes `scenarios` in the given order until `cancel` fires. Scenarios not executed by then,
    /// including one whose call was still pending, are recorded as `NOT_RUN`.
    pub(crate) async fn run_sequence(
        &self,
        scenarios: Vec<Scenario>,
        mut cancel: watch::Receiver<bool>,
    ) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(scenarios.len());
        let mut pending = scenarios.into_iter();

        while let Some(scenario) = pending.next() {
            if !results.is_empty() && !self.scenario_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancelled(&mut cancel) => {
                        results.push(self.not_run(&scenario));
                        break;
                    }
                    _ = tokio::time::sleep(self.scenario_delay) => {}
                }
            }

            if *cancel.borrow() {
                results.push(self.not_run(&scenario));
                break;
            }

            // A call that already completed is recorded even if cancellation arrived meanwhile
            tokio::select! {
                biased;
                result = self.execute(&scenario) => results.push(result),
                _ = cancelled(&mut cancel) => {
                    results.push(self.not_run(&scenario));
                    break;
                }
            }
        }

        results.extend(pending.map(|scenario| self.not_run(&scenario)));
        results
    }

    pub(crate) async fn execute(&self, scenario: &Scenario) -> TestResult {
        let tested_as = self.tested_as(scenario.audience());

        let result = match self.attempt(scenario).await {
            Ok(status) => {
                let actual = self.classifier.classify(status);
                if actual != Outcome::Allow {
                    debug!("{} classified {} (status {})", scenario, actual, status);
                }
                TestResult::new(scenario.clone(), actual, tested_as, self.clock.now()).with_status(status)
            }
            Err(e) => {
                warn!("Error testing {}: {}", scenario, e);
                TestResult::new(scenario.clone(), Outcome::Error, tested_as, self.clock.now()).with_detail(e.to_string())
            }
        };

        self.progress.record();
        result
    }

    fn not_run(&self, scenario: &Scenario) -> TestResult {
        TestResult::not_run(scenario.clone(), self.tested_as(scenario.audience()), self.clock.now())
    }

    fn tested_as(&self, audience: Audience) -> String {
        self.resolver
            .label_for(audience)
            .map(|label| label.to_string())
            .unwrap_or_else(|_| UNMAPPED_IDENTITY.to_string())
    }

    async fn attempt(&self, scenario: &Scenario) -> Result<u16, ScenarioExecutionError> {
        let identity = self.resolver.resolve(scenario.audience()).await?;
        let fixture = self
            .fixtures
            .get(scenario.visibility())
            .ok_or(ScenarioExecutionError::MissingFixture(scenario.visibility()))?;
        let credential = &identity.credential;

        let status = match self.probes.capability_for(scenario.action()) {
            Capability::Read => self.client.read(credential, &fixture.id).await?.status,
            Capability::Update => {
                let content = format!("Updated by {}", identity.label);
                self.client.update(credential, &fixture.id, &content).await?.status
            }
            Capability::Delete => self.client.delete(credential, &fixture.id).await?.status,
            Capability::Share => {
                self.client
                    .share(credential, &fixture.id, &self.share_params)
                    .await?
                    .status
            }
        };
        Ok(status)
    }
}

/// Completes once cancellation is requested. Never completes if the sender is gone without cancelling.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
