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

//! Differential test harness.
//!
//! A [`DifferentialHarness`] creates one fixture per visibility as the owner identity, then exercises
//! every generated scenario through the capability client with the identity mapped to the scenario's
//! audience and records the observed outcome next to the engine's expected decision.
//!
//! ```text
//! UNINITIALIZED --setup()--> ENVIRONMENT_READY --run_all()--> RUNNING --> COMPLETE
//! ```

mod classify;
mod config;
mod executor;
mod probe;

#[cfg(test)]
mod tests;

pub use classify::{ClassificationRule, StatusClassifier, StatusMatch};
pub use config::{DEFAULT_FIXTURE_PREFIX, DEFAULT_PROBE_SHARE_PARAMS, ExecutionMode, HarnessConfig};
pub use executor::ScenarioExecutionError;
pub use probe::ProbeStrategy;

use crate::capability::{CapabilityClient, CapabilityError};
use crate::identity::{Credential, IdentityError, IdentityLabel, IdentityResolver};
use crate::scenario::{Audience, Scenario, TestResult, Visibility};
use chrono::{DateTime, Utc};
use executor::{Progress, ScenarioExecutor};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarnessState {
    Uninitialized,
    EnvironmentReady,
    Running,
    Complete,
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarnessState::Uninitialized => "UNINITIALIZED",
            HarnessState::EnvironmentReady => "ENVIRONMENT_READY",
            HarnessState::Running => "RUNNING",
            HarnessState::Complete => "COMPLETE",
        };
        f.write_str(name)
    }
}

/// A resource created by the owner during setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub visibility: Visibility,
    pub id: String,
    pub name: String,
    /// Link returned when the fixture was shared.
    pub share_link: Option<String>,
}

/// Fixtures of one harness instance, keyed by visibility. Written during setup only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FixtureMap {
    fixtures: BTreeMap<Visibility, Fixture>,
}

impl FixtureMap {
    pub fn get(&self, visibility: Visibility) -> Option<&Fixture> {
        self.fixtures.get(&visibility)
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, Visibility, Fixture> {
        self.fixtures.values()
    }

    fn insert(&mut self, fixture: Fixture) {
        self.fixtures.insert(fixture.visibility, fixture);
    }
}

/// Identification of a run, carried into the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInfo {
    pub run_id: Uuid,
    /// Account label reported by the remote service, keyed by identity label.
    pub accounts: BTreeMap<String, String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunInfo {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            accounts: BTreeMap::new(),
            started_at: None,
            finished_at: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Fixture setup failed: {0}")]
    FixtureSetupError(String),

    #[error("Invalid harness state: expected {expected}, was {actual}")]
    InvalidState { expected: HarnessState, actual: HarnessState },

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl HarnessError {
    pub fn configuration_error(message: impl Into<String>) -> Self {
        HarnessError::ConfigurationError(message.into())
    }

    pub fn fixture_setup_error(message: impl Into<String>) -> Self {
        HarnessError::FixtureSetupError(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        HarnessError::InternalError(message.into())
    }
}

impl From<IdentityError> for HarnessError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::ConfigurationError(message) => HarnessError::ConfigurationError(message),
            other => HarnessError::ConfigurationError(other.to_string()),
        }
    }
}

/// Runs the scenario population of one configuration against a remote service.
///
/// Each instance owns its fixtures; separate instances never share state.
pub struct DifferentialHarness {
    client: Arc<dyn CapabilityClient>,
    resolver: Arc<IdentityResolver>,
    config: HarnessConfig,
    scenarios: Vec<Scenario>,
    state: HarnessState,
    fixtures: Arc<FixtureMap>,
    run_info: RunInfo,
    results: Vec<TestResult>,
}

impl DifferentialHarness {
    pub fn new(client: Arc<dyn CapabilityClient>, resolver: Arc<IdentityResolver>, config: HarnessConfig) -> Self {
        let scenarios = config.engine.generate_scenarios_in(&config.space);
        Self {
            client,
            resolver,
            config,
            scenarios,
            state: HarnessState::Uninitialized,
            fixtures: Arc::new(FixtureMap::default()),
            run_info: RunInfo::new(),
            results: Vec::new(),
        }
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Scenarios of this run in ID order.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn fixtures(&self) -> &FixtureMap {
        &self.fixtures
    }

    pub fn run_info(&self) -> &RunInfo {
        &self.run_info
    }

    /// Results in scenario-ID order, available once the run is complete.
    pub fn results(&self) -> Result<&[TestResult], HarnessError> {
        self.expect_state(HarnessState::Complete)?;
        Ok(&self.results)
    }

    /// Prepares the remote environment as the owner identity.
    ///
    /// # Errors
    /// * `HarnessError::ConfigurationError` - the owner identity is unmapped or has no credential
    /// * `HarnessError::FixtureSetupError` - the owner preflight, a create or the share call failed. The
    ///   message names every fixture created before the failure; they are left on the service.
    /// * `HarnessError::InvalidState` - setup was already performed
    pub async fn setup(&mut self) -> Result<&FixtureMap, HarnessError> {
        self.expect_state(HarnessState::Uninitialized)?;

        let owner_label = self.resolver.label_for(Audience::Owner)?;
        let owner_credential = self.resolver.credential_for(&owner_label).await?;
        let owner_account = self.preflight(&owner_label, &owner_credential).await?;
        self.preflight_others(&owner_label).await;

        let mut created = Vec::new();
        if let Err(e) = self
            .create_fixtures(&owner_credential, &owner_account, &mut created)
            .await
        {
            self.run_info.accounts.clear();
            return Err(with_created_fixtures(e, &created));
        }

        let mut fixtures = FixtureMap::default();
        for fixture in created {
            fixtures.insert(fixture);
        }
        info!("Created {} fixtures as '{}'", fixtures.len(), owner_account);
        self.fixtures = Arc::new(fixtures);

        if !self.config.settle_delay.is_zero() {
            debug!("Waiting {:?} for the remote service to settle", self.config.settle_delay);
            tokio::time::sleep(self.config.settle_delay).await;
        }

        self.state = HarnessState::EnvironmentReady;
        Ok(&self.fixtures)
    }

    /// Executes every scenario and records its result.
    pub async fn run_all(&mut self) -> Result<&[TestResult], HarnessError> {
        let (_never_cancelled, cancel) = watch::channel(false);
        self.run_all_with_cancellation(cancel).await
    }

    /// Executes every scenario until `cancel` turns `true`. Results recorded before cancellation are kept;
    /// every scenario not executed is recorded as `NOT_RUN`.
    pub async fn run_all_with_cancellation(
        &mut self,
        cancel: watch::Receiver<bool>,
    ) -> Result<&[TestResult], HarnessError> {
        self.expect_state(HarnessState::EnvironmentReady)?;
        self.state = HarnessState::Running;
        self.run_info.started_at = Some(self.config.clock.now());
        info!(
            "Running {} scenarios ({:?}, run {})",
            self.scenarios.len(),
            self.config.execution_mode,
            self.run_info.run_id
        );

        let executor = self.executor();
        let outcome = match self.config.execution_mode {
            ExecutionMode::Sequential => Ok(executor.run_sequence(self.scenarios.clone(), cancel).await),
            ExecutionMode::Partitioned => self.run_partitioned(&executor, cancel).await,
        };

        let results = match outcome {
            Ok(results) => results,
            Err(e) => {
                // Partition task failures leave no usable result sequence
                self.state = HarnessState::EnvironmentReady;
                return Err(e);
            }
        };

        let not_run = results.iter().filter(|r| !r.actual.was_executed()).count();
        if not_run > 0 {
            warn!("Run cancelled, {} scenarios not run", not_run);
        }

        self.results = results;
        self.run_info.finished_at = Some(self.config.clock.now());
        self.state = HarnessState::Complete;
        info!("Run {} complete", self.run_info.run_id);
        Ok(&self.results)
    }

    /// Deletes the fixtures as the owner after a completed run. Failures are logged and skipped.
    ///
    /// Returns the number of fixtures deleted.
    pub async fn teardown(&self) -> Result<usize, HarnessError> {
        self.expect_state(HarnessState::Complete)?;

        let owner_label = self.resolver.label_for(Audience::Owner)?;
        let owner_credential = self.resolver.credential_for(&owner_label).await?;

        let mut deleted = 0;
        for fixture in self.fixtures.iter() {
            match self.client.delete(&owner_credential, &fixture.id).await {
                Ok(response) if self.config.classifier.is_success(response.status) => deleted += 1,
                Ok(response) => warn!("Deleting fixture '{}' returned status {}", fixture.name, response.status),
                Err(e) => warn!("Failed to delete fixture '{}': {}", fixture.name, e),
            }
        }
        Ok(deleted)
    }

    fn executor(&self) -> ScenarioExecutor {
        ScenarioExecutor {
            client: self.client.clone(),
            resolver: self.resolver.clone(),
            fixtures: self.fixtures.clone(),
            probes: Arc::new(self.config.probes.clone()),
            classifier: Arc::new(self.config.classifier.clone()),
            share_params: self.config.probe_share_params,
            clock: self.config.clock.clone(),
            scenario_delay: self.config.scenario_delay,
            progress: Arc::new(Progress::new(self.scenarios.len())),
        }
    }

    async fn run_partitioned(
        &self,
        executor: &ScenarioExecutor,
        cancel: watch::Receiver<bool>,
    ) -> Result<Vec<TestResult>, HarnessError> {
        let mut partitions: BTreeMap<Visibility, Vec<Scenario>> = BTreeMap::new();
        for scenario in &self.scenarios {
            partitions.entry(scenario.visibility()).or_default().push(scenario.clone());
        }

        let mut tasks = JoinSet::new();
        for (visibility, scenarios) in partitions {
            debug!("Starting partition '{}' with {} scenarios", visibility, scenarios.len());
            let executor = executor.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move { executor.run_sequence(scenarios, cancel).await });
        }

        let mut results = Vec::with_capacity(self.scenarios.len());
        while let Some(joined) = tasks.join_next().await {
            let partition = joined.map_err(|e| HarnessError::internal_error(format!("Partition task failed: {}", e)))?;
            results.extend(partition);
        }
        results.sort_by_key(TestResult::scenario_id);
        Ok(results)
    }

    /// Confirms the identity against the remote service and records its account label.
    async fn preflight(&mut self, label: &IdentityLabel, credential: &Credential) -> Result<String, HarnessError> {
        let response = self.client.get_identity(credential).await.map_err(|e| {
            HarnessError::fixture_setup_error(format!("Identity check for '{}' failed: {}", label, e))
        })?;
        if !self.config.classifier.is_success(response.status) {
            return Err(HarnessError::fixture_setup_error(format!(
                "Identity check for '{}' returned status {}",
                label, response.status
            )));
        }

        let account = response.label.unwrap_or_else(|| label.to_string());
        info!("Identity '{}' authenticated as '{}'", label, account);
        self.run_info.accounts.insert(label.to_string(), account.clone());
        Ok(account)
    }

    /// Preflight for non-owner identities. Their problems surface per scenario, so they only warn here.
    async fn preflight_others(&mut self, owner_label: &IdentityLabel) {
        let others: Vec<IdentityLabel> = self
            .resolver
            .mapping()
            .labels()
            .into_iter()
            .filter(|label| label != owner_label)
            .collect();

        for label in others {
            let credential = match self.resolver.credential_for(&label).await {
                Ok(credential) => credential,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            };
            if let Err(e) = self.preflight(&label, &credential).await {
                warn!("{}", e);
            }
        }
    }

    /// Creates one fixture per visibility, pushing each onto `created` as soon as it exists remotely.
    async fn create_fixtures(
        &self,
        owner_credential: &Credential,
        owner_account: &str,
        created: &mut Vec<Fixture>,
    ) -> Result<(), HarnessError> {
        for visibility in self.config.space.visibilities().iter().copied() {
            let fixture = self.create_fixture(visibility, owner_credential, owner_account).await?;
            created.push(fixture);
            if visibility == Visibility::Shared
                && let Some(fixture) = created.last_mut()
            {
                fixture.share_link = self.share_fixture(fixture, owner_credential).await?;
            }
        }
        Ok(())
    }

    async fn create_fixture(
        &self,
        visibility: Visibility,
        owner_credential: &Credential,
        owner_account: &str,
    ) -> Result<Fixture, HarnessError> {
        let name = format!("{}_{}_file.txt", self.config.fixture_prefix, visibility);
        let content = format!(
            "This is a {} test file for multi-user authorization testing.\nCreated by: {}",
            visibility, owner_account
        );

        let created = self
            .client
            .create(owner_credential, &name, &content)
            .await
            .map_err(|e| setup_call_failed("create", visibility, e))?;
        if !self.config.classifier.is_success(created.status) {
            return Err(HarnessError::fixture_setup_error(format!(
                "Creating {} fixture returned status {}",
                visibility, created.status
            )));
        }
        let id = created.id.ok_or_else(|| {
            HarnessError::fixture_setup_error(format!("Creating {} fixture returned no resource id", visibility))
        })?;
        debug!("Created {} fixture '{}' ({})", visibility, name, id);

        Ok(Fixture {
            visibility,
            id,
            name: created.name.unwrap_or(name),
            share_link: None,
        })
    }

    async fn share_fixture(&self, fixture: &Fixture, owner_credential: &Credential) -> Result<Option<String>, HarnessError> {
        let params = &self.config.share_params;
        let shared = self
            .client
            .share(owner_credential, &fixture.id, params)
            .await
            .map_err(|e| setup_call_failed("share", fixture.visibility, e))?;
        if !self.config.classifier.is_success(shared.status) {
            return Err(HarnessError::fixture_setup_error(format!(
                "Sharing {} fixture returned status {}",
                fixture.visibility, shared.status
            )));
        }

        match self.client.permissions(owner_credential, &fixture.id).await {
            Ok(response) if self.config.classifier.is_success(response.status) => {
                info!("Fixture '{}' has {} permissions after sharing", fixture.name, response.permissions.len());
            }
            Ok(response) => warn!("Listing permissions of '{}' returned status {}", fixture.name, response.status),
            Err(e) => warn!("Listing permissions of '{}' failed: {}", fixture.name, e),
        }

        Ok(shared.link)
    }

    fn expect_state(&self, expected: HarnessState) -> Result<(), HarnessError> {
        if self.state != expected {
            return Err(HarnessError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }
}

fn with_created_fixtures(error: HarnessError, created: &[Fixture]) -> HarnessError {
    match error {
        HarnessError::FixtureSetupError(message) if !created.is_empty() => {
            let fixtures: Vec<String> = created.iter().map(|f| format!("{} ({})", f.name, f.id)).collect();
            HarnessError::FixtureSetupError(format!(
                "{}; fixtures already created: {}",
                message,
                fixtures.join(", ")
            ))
        }
        other => other,
    }
}

fn setup_call_failed(call: &str, visibility: Visibility, error: CapabilityError) -> HarnessError {
    HarnessError::fixture_setup_error(format!("Failed to {} {} fixture: {}", call, visibility, error))
}
