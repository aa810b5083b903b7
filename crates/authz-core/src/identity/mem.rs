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

use crate::identity::{Credential, CredentialSource, IdentityError, IdentityLabel};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory credential source, typically populated by whatever performed the sign-in.
pub struct MemoryCredentialSource {
    credentials: RwLock<HashMap<IdentityLabel, Credential>>,
}

impl MemoryCredentialSource {
    pub fn new() -> Self {
        Self {
            credentials: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_credential(self, label: IdentityLabel, credential: Credential) -> Self {
        self.insert(label, credential);
        self
    }

    pub fn insert(&self, label: IdentityLabel, credential: Credential) {
        let mut credentials = self.credentials.write().unwrap_or_else(|e| e.into_inner());
        credentials.insert(label, credential);
    }

    pub fn remove(&self, label: &IdentityLabel) {
        let mut credentials = self.credentials.write().unwrap_or_else(|e| e.into_inner());
        credentials.remove(label);
    }
}

impl Default for MemoryCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for MemoryCredentialSource {
    async fn credential(&self, label: &IdentityLabel) -> Result<Credential, IdentityError> {
        let credentials = self.credentials.read().unwrap_or_else(|e| e.into_inner());
        credentials
            .get(label)
            .cloned()
            .ok_or_else(|| IdentityError::credential_unavailable(label, "not supplied"))
    }
}
