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

//! Differential authorization testing.
//!
//! Compares the authorization decisions of a remote storage service against a declared policy. The
//! [`policy`] engine derives the expected decision for every scenario, the [`harness`] exercises each
//! scenario against the live service through a [`capability::CapabilityClient`], and [`report`]
//! aggregates the discrepancies.

pub mod capability;
pub mod harness;
pub mod identity;
pub mod policy;
pub mod report;
pub mod scenario;
pub mod util;
