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

//! Runs the differential authorization experiment against a live drive API.
//!
//! Credentials are read from one token file per identity. The process exits successfully whenever the
//! experiment completes, however many scenarios failed.

mod settings;
mod sink;

use anyhow::{Context, Result};
use dsdk_authz_core::harness::{DifferentialHarness, HarnessConfig};
use dsdk_authz_core::identity::{FileCredentialSource, IdentityLabel, IdentityResolver};
use dsdk_authz_core::report::{Dimension, DiscrepancyReport, ReportSink};
use dsdk_authz_graph::{GraphCapabilityClient, GraphClientConfig};
use settings::Settings;
use sink::JsonFileReportSink;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    println!("=== Multi-User Authorization Differential Test ===");
    println!("Graph URL: {}", settings.graph_url);
    println!("Owner token file: {}", settings.owner_token_file.display());
    println!("Non-owner token file: {}", settings.non_owner_token_file.display());
    println!("Run mode: {:?}", settings.run_mode);
    println!();

    let client = GraphCapabilityClient::new(GraphClientConfig::builder().base_url(&settings.graph_url).build())
        .context("Failed to create Graph client")?;
    let credentials = FileCredentialSource::new()
        .with_file(IdentityLabel::owner(), &settings.owner_token_file)
        .with_file(IdentityLabel::non_owner(), &settings.non_owner_token_file);
    let resolver = IdentityResolver::builder().credential_source(Arc::new(credentials)).build();
    let config = HarnessConfig::builder()
        .settle_delay(settings.settle_delay)
        .scenario_delay(settings.scenario_delay)
        .execution_mode(settings.run_mode)
        .build();
    let mut harness = DifferentialHarness::new(Arc::new(client), Arc::new(resolver), config);

    println!("[SETUP] Creating {} fixtures", harness.config().space.visibilities().len());
    let fixtures = harness.setup().await.context("Failed to set up test environment")?;
    for fixture in fixtures.iter() {
        println!("[SETUP] {} -> {} ({})", fixture.visibility, fixture.name, fixture.id);
    }
    for (identity, account) in &harness.run_info().accounts {
        println!("[SETUP] Identity '{}' is {}", identity, account);
    }

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("[RUN] Interrupted, finishing with recorded results");
            let _ = cancel_tx.send(true);
        }
    });

    println!("[RUN] Executing {} scenarios", harness.scenarios().len());
    harness
        .run_all_with_cancellation(cancel_rx)
        .await
        .context("Failed to run scenarios")?;

    let report = DiscrepancyReport::build(
        harness.run_info().clone(),
        harness.fixtures().clone(),
        &harness.config().probes,
        harness.results()?.to_vec(),
        settings.sample_size,
    )
    .context("Failed to aggregate results")?;
    print_report(&report);

    let sink = JsonFileReportSink::new(&settings.results_file);
    sink.publish(&report).await.context("Failed to write report")?;
    println!();
    println!("Results written to {}", sink.path().display());

    if settings.cleanup_fixtures {
        let deleted = harness.teardown().await.context("Failed to clean up fixtures")?;
        println!("[CLEANUP] Deleted {}/{} fixtures", deleted, harness.fixtures().len());
    }

    Ok(())
}

fn print_report(report: &DiscrepancyReport) {
    let summary = &report.summary;
    println!();
    println!("=== Summary ===");
    println!("Total: {}", summary.total);
    println!("Passed: {} ({:.1}%)", summary.passed, summary.pass_ratio * 100.0);
    println!("Failed: {} ({:.1}%)", summary.failed, summary.fail_ratio * 100.0);
    if summary.not_run > 0 {
        println!("Not run: {}", summary.not_run);
    }
    for substitution in &report.substituted_actions {
        println!(
            "Note: '{}' was probed with '{}'",
            substitution.action, substitution.probed_with
        );
    }

    if summary.failed == 0 {
        return;
    }

    for dimension in Dimension::ALL {
        println!();
        println!("Failures by {}:", dimension);
        for group in report.failures_by(dimension) {
            println!("  {}: {} ({:.1}%)", group.value, group.count, group.share * 100.0);
        }
    }

    println!();
    println!("Sample failures:");
    for result in &report.sample_failures {
        let status = result.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "  {} as {}: expected {}, got {} (status {})",
            result.scenario, result.tested_as, result.expected, result.actual, status
        );
    }
}
