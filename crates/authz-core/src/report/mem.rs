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

use super::{DiscrepancyReport, ReportError, ReportSink};
use async_trait::async_trait;
use std::sync::RwLock;

/// Keeps published reports in memory.
#[derive(Default)]
pub struct MemoryReportSink {
    reports: RwLock<Vec<DiscrepancyReport>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports in publication order.
    pub fn reports(&self) -> Vec<DiscrepancyReport> {
        self.reports.read().map(|reports| reports.clone()).unwrap_or_default()
    }

    pub fn latest(&self) -> Option<DiscrepancyReport> {
        self.reports.read().ok().and_then(|reports| reports.last().cloned())
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn publish(&self, report: &DiscrepancyReport) -> Result<(), ReportError> {
        let mut reports = self
            .reports
            .write()
            .map_err(|e| ReportError::io(format!("Report store unavailable: {}", e)))?;
        reports.push(report.clone());
        Ok(())
    }
}
