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

use anyhow::{Context, Result, bail};
use dsdk_authz_core::harness::ExecutionMode;
use dsdk_authz_graph::DEFAULT_BASE_URL;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) const DEFAULT_OWNER_TOKEN_FILE: &str = "token_owner.txt";
pub(crate) const DEFAULT_NON_OWNER_TOKEN_FILE: &str = "token_collaborator.txt";
pub(crate) const DEFAULT_RESULTS_FILE: &str = "results/multiuser_test_results.json";
pub(crate) const DEFAULT_SETTLE_DELAY_MS: u64 = 3000;
pub(crate) const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Runner settings read from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub graph_url: String,
    pub owner_token_file: PathBuf,
    pub non_owner_token_file: PathBuf,
    pub results_file: PathBuf,
    pub run_mode: ExecutionMode,
    pub settle_delay: Duration,
    pub scenario_delay: Duration,
    pub sample_size: usize,
    pub cleanup_fixtures: bool,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let run_mode = match string("RUN_MODE", "sequential").as_str() {
            "sequential" => ExecutionMode::Sequential,
            "partitioned" => ExecutionMode::Partitioned,
            other => bail!("Unknown RUN_MODE '{}', expected 'sequential' or 'partitioned'", other),
        };

        Ok(Self {
            graph_url: string("GRAPH_URL", DEFAULT_BASE_URL),
            owner_token_file: string("OWNER_TOKEN_FILE", DEFAULT_OWNER_TOKEN_FILE).into(),
            non_owner_token_file: string("NON_OWNER_TOKEN_FILE", DEFAULT_NON_OWNER_TOKEN_FILE).into(),
            results_file: string("RESULTS_FILE", DEFAULT_RESULTS_FILE).into(),
            run_mode,
            settle_delay: Duration::from_millis(parse(&lookup, "SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS)?),
            scenario_delay: Duration::from_millis(parse(&lookup, "SCENARIO_DELAY_MS", 0)?),
            sample_size: parse(&lookup, "SAMPLE_SIZE", DEFAULT_SAMPLE_SIZE)?,
            cleanup_fixtures: parse(&lookup, "CLEANUP_FIXTURES", false)?,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", value, key)),
        None => Ok(default),
    }
}
