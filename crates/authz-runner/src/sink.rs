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
use dsdk_authz_core::report::{DiscrepancyReport, ReportError, ReportSink};
use std::path::{Path, PathBuf};

/// Writes each report as pretty-printed JSON to one file, replacing earlier contents.
pub(crate) struct JsonFileReportSink {
    path: PathBuf,
}

impl JsonFileReportSink {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportSink for JsonFileReportSink {
    async fn publish(&self, report: &DiscrepancyReport) -> Result<(), ReportError> {
        let json = serde_json::to_vec_pretty(report)
            .map_err(|e| ReportError::serialization(format!("Failed to serialize report: {}", e)))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ReportError::io(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ReportError::io(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}
