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

//! Capability client for Microsoft Graph style drive APIs.
//!
//! [`GraphCapabilityClient`] maps every capability of the differential harness onto one drive endpoint
//! of the calling identity (`/me/drive/...`).

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::GraphCapabilityClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, GraphClientConfig};
