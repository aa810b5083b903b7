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

//! Identity resolution: which credential exercises which audience.
//!
//! Four audience labels collapse onto two credentials by default (`owner` and `non-owner`), because the
//! service's behavioral boundary at the identity level is owner versus everyone else. The mapping is an
//! explicit value so a per-audience mapping can be supplied without touching the harness or the engine.

#[cfg(test)]
mod tests;

mod file;
mod mem;

pub use file::FileCredentialSource;
pub use mem::MemoryCredentialSource;

use crate::scenario::Audience;
use async_trait::async_trait;
use bon::Builder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const OWNER_IDENTITY: &str = "owner";
pub const NON_OWNER_IDENTITY: &str = "non-owner";

/// Name of an identity whose credential exercises scenarios, e.g. `owner`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IdentityLabel(String);

impl IdentityLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn owner() -> Self {
        Self::new(OWNER_IDENTITY)
    }

    pub fn non_owner() -> Self {
        Self::new(NON_OWNER_IDENTITY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque bearer credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Audience to identity mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityMapping {
    labels: BTreeMap<Audience, IdentityLabel>,
}

impl IdentityMapping {
    /// `owner` maps to the owner identity, every other audience to the shared non-owner identity.
    pub fn two_tier() -> Self {
        Self::per_audience(Audience::ALL.into_iter().map(|audience| {
            let label = if audience == Audience::Owner {
                IdentityLabel::owner()
            } else {
                IdentityLabel::non_owner()
            };
            (audience, label)
        }))
    }

    /// Explicit mapping. Audiences left out have no identity and fail resolution.
    pub fn per_audience(entries: impl IntoIterator<Item = (Audience, IdentityLabel)>) -> Self {
        Self {
            labels: entries.into_iter().collect(),
        }
    }

    pub fn label_for(&self, audience: Audience) -> Option<&IdentityLabel> {
        self.labels.get(&audience)
    }

    /// Distinct identity labels in audience order.
    pub fn labels(&self) -> Vec<IdentityLabel> {
        let mut labels: Vec<IdentityLabel> = Vec::new();
        for label in self.labels.values() {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        labels
    }
}

impl Default for IdentityMapping {
    fn default() -> Self {
        Self::two_tier()
    }
}

/// Supplies one bearer credential per identity label.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// # Errors
    /// Returns `IdentityError::CredentialUnavailable` when no credential exists for the label.
    async fn credential(&self, label: &IdentityLabel) -> Result<Credential, IdentityError>;
}

/// An identity together with the credential to act as it.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub label: IdentityLabel,
    pub credential: Credential,
}

/// Maps audiences to identities and fetches their credentials.
#[derive(Builder, Clone)]
pub struct IdentityResolver {
    #[builder(default)]
    mapping: IdentityMapping,
    credential_source: Arc<dyn CredentialSource>,
}

impl IdentityResolver {
    pub fn mapping(&self) -> &IdentityMapping {
        &self.mapping
    }

    /// Identity label for an audience, without touching credentials.
    pub fn label_for(&self, audience: Audience) -> Result<IdentityLabel, IdentityError> {
        self.mapping
            .label_for(audience)
            .cloned()
            .ok_or_else(|| IdentityError::configuration_error(format!("No identity mapped for audience '{}'", audience)))
    }

    /// Resolves the identity and credential that must exercise `audience`.
    ///
    /// # Errors
    /// Returns `IdentityError::ConfigurationError` if the audience is unmapped or its identity has no
    /// credential.
    pub async fn resolve(&self, audience: Audience) -> Result<ResolvedIdentity, IdentityError> {
        let label = self.label_for(audience)?;
        let credential = self.credential_for(&label).await?;
        Ok(ResolvedIdentity { label, credential })
    }

    pub async fn credential_for(&self, label: &IdentityLabel) -> Result<Credential, IdentityError> {
        self.credential_source.credential(label).await.map_err(|e| match e {
            IdentityError::CredentialUnavailable { label, reason } => IdentityError::configuration_error(format!(
                "No credential available for identity '{}': {}",
                label, reason
            )),
            other => other,
        })
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Credential unavailable for identity '{label}': {reason}")]
    CredentialUnavailable { label: String, reason: String },
}

impl IdentityError {
    pub fn configuration_error(message: impl Into<String>) -> Self {
        IdentityError::ConfigurationError(message.into())
    }

    pub fn credential_unavailable(label: &IdentityLabel, reason: impl Into<String>) -> Self {
        IdentityError::CredentialUnavailable {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}
