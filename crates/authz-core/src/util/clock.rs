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

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

/// Source of timestamps for recorded test results.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub fn default_clock() -> Arc<dyn Clock> {
    Arc::new(Utc)
}

impl Clock for Utc {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for reproducible runs.
///
/// The n-th reading (counting from zero) is `start + n * step`, so a sequential run stamps its
/// start, each result and its finish one step apart in execution order. A zero step pins every
/// reading to `start`.
pub struct SteppingClock {
    start: DateTime<Utc>,
    step: TimeDelta,
    readings: AtomicI32,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            start,
            step,
            readings: AtomicI32::new(0),
        }
    }

    pub fn fixed(instant: DateTime<Utc>) -> Self {
        Self::new(instant, TimeDelta::zero())
    }

    /// Number of times the clock has been read.
    pub fn readings(&self) -> i32 {
        self.readings.load(Ordering::SeqCst)
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.readings.fetch_add(1, Ordering::SeqCst);
        self.start + self.step * n
    }
}
