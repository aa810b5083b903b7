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

use crate::config::GraphClientConfig;
use async_trait::async_trait;
use dsdk_authz_core::capability::{
    CapabilityClient, CapabilityError, CreateResponse, IdentityResponse, PermissionsResponse, ReadResponse,
    ShareParams, ShareResponse, StatusResponse,
};
use dsdk_authz_core::identity::Credential;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;

/// Drive API client acting as whichever identity's credential is passed to a call.
///
/// Responses are returned with their status whatever it is; only requests that produce no response
/// fail with `CapabilityError::Transport`.
pub struct GraphCapabilityClient {
    base_url: Url,
    http_client: Client,
}

impl GraphCapabilityClient {
    pub fn new(config: GraphClientConfig) -> Result<Self, CapabilityError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CapabilityError::invalid_configuration(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CapabilityError::invalid_configuration(format!("Invalid base URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CapabilityError::invalid_configuration(format!(
                "Base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self { base_url, http_client })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CapabilityError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CapabilityError::invalid_configuration(format!("Base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn item_url(&self, id: &str, trailing: &[&str]) -> Result<Url, CapabilityError> {
        let mut segments = vec!["me", "drive", "items", id];
        segments.extend_from_slice(trailing);
        self.endpoint(&segments)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        credential: &Credential,
        operation: &str,
    ) -> Result<Response, CapabilityError> {
        let response = request
            .bearer_auth(credential.bearer())
            .send()
            .await
            .map_err(|e| CapabilityError::transport(format!("Failed to {}: {}", operation, e)))?;
        debug!("{} returned status {}", operation, response.status());
        Ok(response)
    }
}

/// Status and, for success responses, the JSON body if there is one.
async fn status_and_body(response: Response) -> (u16, Option<Value>) {
    let status = response.status();
    if !status.is_success() {
        return (status.as_u16(), None);
    }
    (status.as_u16(), response.json::<Value>().await.ok())
}

fn string_field(body: Option<&Value>, pointer: &str) -> Option<String> {
    body.and_then(|b| b.pointer(pointer))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl CapabilityClient for GraphCapabilityClient {
    async fn create(&self, credential: &Credential, name: &str, content: &str) -> Result<CreateResponse, CapabilityError> {
        // root:/{name}:/content addresses the item by path
        let path = format!("{}:", name);
        let url = self.endpoint(&["me", "drive", "root:", &path, "content"])?;
        let request = self
            .http_client
            .put(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(content.to_string());
        let (status, body) = status_and_body(self.send(request, credential, "create item").await?).await;

        Ok(CreateResponse {
            status,
            id: string_field(body.as_ref(), "/id"),
            name: string_field(body.as_ref(), "/name"),
        })
    }

    async fn read(&self, credential: &Credential, id: &str) -> Result<ReadResponse, CapabilityError> {
        let request = self.http_client.get(self.item_url(id, &[])?);
        let (status, metadata) = status_and_body(self.send(request, credential, "read item").await?).await;
        Ok(ReadResponse { status, metadata })
    }

    async fn update(&self, credential: &Credential, id: &str, content: &str) -> Result<StatusResponse, CapabilityError> {
        let request = self
            .http_client
            .put(self.item_url(id, &["content"])?)
            .header(CONTENT_TYPE, "text/plain")
            .body(content.to_string());
        let response = self.send(request, credential, "update item").await?;
        Ok(StatusResponse {
            status: response.status().as_u16(),
        })
    }

    async fn delete(&self, credential: &Credential, id: &str) -> Result<StatusResponse, CapabilityError> {
        let request = self.http_client.delete(self.item_url(id, &[])?);
        let response = self.send(request, credential, "delete item").await?;
        Ok(StatusResponse {
            status: response.status().as_u16(),
        })
    }

    async fn share(&self, credential: &Credential, id: &str, params: &ShareParams) -> Result<ShareResponse, CapabilityError> {
        let request = self
            .http_client
            .post(self.item_url(id, &["createLink"])?)
            .json(params);
        let (status, body) = status_and_body(self.send(request, credential, "create sharing link").await?).await;

        Ok(ShareResponse {
            status,
            link: string_field(body.as_ref(), "/link/webUrl"),
        })
    }

    async fn get_identity(&self, credential: &Credential) -> Result<IdentityResponse, CapabilityError> {
        let request = self.http_client.get(self.endpoint(&["me"])?);
        let (status, body) = status_and_body(self.send(request, credential, "get identity").await?).await;

        Ok(IdentityResponse {
            status,
            label: string_field(body.as_ref(), "/userPrincipalName").or_else(|| string_field(body.as_ref(), "/mail")),
        })
    }

    async fn permissions(&self, credential: &Credential, id: &str) -> Result<PermissionsResponse, CapabilityError> {
        let request = self.http_client.get(self.item_url(id, &["permissions"])?);
        let (status, body) = status_and_body(self.send(request, credential, "list permissions").await?).await;

        let permissions = body
            .and_then(|mut b| b.get_mut("value").map(Value::take))
            .and_then(|value| match value {
                Value::Array(entries) => Some(entries),
                _ => None,
            })
            .unwrap_or_default();
        Ok(PermissionsResponse { status, permissions })
    }
}
