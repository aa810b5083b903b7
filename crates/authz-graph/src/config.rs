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

use bon::Builder;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the Graph capability client.
#[derive(Builder, Clone, Debug)]
pub struct GraphClientConfig {
    /// API root, with or without a trailing slash (defaults to the public Graph v1.0 endpoint)
    #[builder(default = DEFAULT_BASE_URL.to_string(), into)]
    pub base_url: String,
    /// Timeout applied to every request (defaults to 10 seconds)
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
}

impl Default for GraphClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
