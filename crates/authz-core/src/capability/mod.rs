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

//! Interface to the remote storage service under test.
//!
//! Implementations translate each capability into the service's wire protocol. A response with any
//! status is a successful call; only a call that produced no response (connection failure, timeout)
//! is an error. Timeouts belong to the implementation and nothing here retries.

use crate::identity::Credential;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Operation of the remote service a scenario can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Read,
    Update,
    Delete,
    Share,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Read => "read",
            Capability::Update => "update",
            Capability::Delete => "delete",
            Capability::Share => "share",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    View,
    #[default]
    Edit,
    Embed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkScope {
    #[default]
    Anonymous,
    Organization,
}

/// Parameters of a sharing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ShareParams {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub scope: LinkScope,
}

impl ShareParams {
    pub fn new(link_type: LinkType, scope: LinkScope) -> Self {
        Self { link_type, scope }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateResponse {
    pub status: u16,
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadResponse {
    pub status: u16,
    pub metadata: Option<Value>,
}

/// Response of calls that only report a status, such as update and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareResponse {
    pub status: u16,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityResponse {
    pub status: u16,
    /// Account label of the caller, e.g. its principal name.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionsResponse {
    pub status: u16,
    pub permissions: Vec<Value>,
}

/// Capabilities of the remote storage service. Every call acts with the supplied credential.
#[async_trait]
pub trait CapabilityClient: Send + Sync {
    async fn create(&self, credential: &Credential, name: &str, content: &str) -> Result<CreateResponse, CapabilityError>;

    async fn read(&self, credential: &Credential, id: &str) -> Result<ReadResponse, CapabilityError>;

    async fn update(&self, credential: &Credential, id: &str, content: &str) -> Result<StatusResponse, CapabilityError>;

    async fn delete(&self, credential: &Credential, id: &str) -> Result<StatusResponse, CapabilityError>;

    async fn share(&self, credential: &Credential, id: &str, params: &ShareParams) -> Result<ShareResponse, CapabilityError>;

    async fn get_identity(&self, credential: &Credential) -> Result<IdentityResponse, CapabilityError>;

    async fn permissions(&self, credential: &Credential, id: &str) -> Result<PermissionsResponse, CapabilityError>;
}

/// Failure to obtain any response from the remote service.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfiguration(String),
}

impl CapabilityError {
    pub fn transport(message: impl Into<String>) -> Self {
        CapabilityError::Transport(message.into())
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        CapabilityError::InvalidConfiguration(message.into())
    }
}
