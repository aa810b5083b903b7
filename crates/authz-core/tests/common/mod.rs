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

use async_trait::async_trait;
use dsdk_authz_core::capability::{
    CapabilityClient, CapabilityError, CreateResponse, IdentityResponse, PermissionsResponse, ReadResponse,
    ShareParams, ShareResponse, StatusResponse,
};
use dsdk_authz_core::identity::{Credential, IdentityLabel, MemoryCredentialSource};
use std::collections::HashMap;
use std::sync::Mutex;

pub const OWNER_TOKEN: &str = "owner-token";
pub const NON_OWNER_TOKEN: &str = "non-owner-token";

pub fn credentials() -> MemoryCredentialSource {
    MemoryCredentialSource::new()
        .with_credential(IdentityLabel::owner(), Credential::new(OWNER_TOKEN))
        .with_credential(IdentityLabel::non_owner(), Credential::new(NON_OWNER_TOKEN))
}

/// Storage service where only the owner may touch resources, except that anyone may read the public
/// fixture. Records every call it receives.
#[derive(Default)]
pub struct ScriptedCapabilityClient {
    items: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCapabilityClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn is_public(&self, id: &str) -> bool {
        self.items
            .lock()
            .unwrap()
            .get(id)
            .is_some_and(|name| name.contains("_public_") && !name.contains("org_public"))
    }
}

fn is_owner(credential: &Credential) -> bool {
    credential.bearer() == OWNER_TOKEN
}

#[async_trait]
impl CapabilityClient for ScriptedCapabilityClient {
    async fn create(&self, credential: &Credential, name: &str, _content: &str) -> Result<CreateResponse, CapabilityError> {
        self.record(format!("create {}", name));
        let id = format!("id-{}", self.items.lock().unwrap().len());
        self.items.lock().unwrap().insert(id.clone(), name.to_string());
        let status = if is_owner(credential) { 201 } else { 403 };
        Ok(CreateResponse {
            status,
            id: Some(id),
            name: Some(name.to_string()),
        })
    }

    async fn read(&self, credential: &Credential, id: &str) -> Result<ReadResponse, CapabilityError> {
        self.record(format!("read {}", id));
        let status = if is_owner(credential) || self.is_public(id) { 200 } else { 404 };
        Ok(ReadResponse { status, metadata: None })
    }

    async fn update(&self, credential: &Credential, id: &str, _content: &str) -> Result<StatusResponse, CapabilityError> {
        self.record(format!("update {}", id));
        let status = if is_owner(credential) { 200 } else { 403 };
        Ok(StatusResponse { status })
    }

    async fn delete(&self, credential: &Credential, id: &str) -> Result<StatusResponse, CapabilityError> {
        self.record(format!("delete {}", id));
        let status = if is_owner(credential) { 204 } else { 403 };
        Ok(StatusResponse { status })
    }

    async fn share(&self, credential: &Credential, id: &str, _params: &ShareParams) -> Result<ShareResponse, CapabilityError> {
        self.record(format!("share {}", id));
        if is_owner(credential) {
            Ok(ShareResponse {
                status: 200,
                link: Some(format!("https://share.example.com/{}", id)),
            })
        } else {
            Ok(ShareResponse { status: 403, link: None })
        }
    }

    async fn get_identity(&self, credential: &Credential) -> Result<IdentityResponse, CapabilityError> {
        let label = if is_owner(credential) {
            "owner@contoso.com"
        } else {
            "guest@fabrikam.com"
        };
        Ok(IdentityResponse {
            status: 200,
            label: Some(label.to_string()),
        })
    }

    async fn permissions(&self, _credential: &Credential, _id: &str) -> Result<PermissionsResponse, CapabilityError> {
        Ok(PermissionsResponse {
            status: 200,
            permissions: vec![],
        })
    }
}
