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
use std::path::PathBuf;

/// Reads one bearer token per identity from a file, e.g. `token_owner.txt`.
///
/// Files are read on every request so a token rewritten by an external sign-in flow is picked up
/// without restarting the run. Surrounding whitespace is trimmed.
pub struct FileCredentialSource {
    paths: HashMap<IdentityLabel, PathBuf>,
}

impl FileCredentialSource {
    pub fn new() -> Self {
        Self { paths: HashMap::new() }
    }

    pub fn with_file(mut self, label: IdentityLabel, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(label, path.into());
        self
    }
}

impl Default for FileCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for FileCredentialSource {
    async fn credential(&self, label: &IdentityLabel) -> Result<Credential, IdentityError> {
        let path = self
            .paths
            .get(label)
            .ok_or_else(|| IdentityError::credential_unavailable(label, "no token file configured"))?;

        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            IdentityError::credential_unavailable(label, format!("failed to read {}: {}", path.display(), e))
        })?;

        let token = contents.trim();
        if token.is_empty() {
            return Err(IdentityError::credential_unavailable(
                label,
                format!("token file {} is empty", path.display()),
            ));
        }
        Ok(Credential::new(token))
    }
}
