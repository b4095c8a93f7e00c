//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Lock-free metrics for the matrix device link

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free link metrics
///
/// All counters are atomics and can be read concurrently with wire traffic.
/// Use [`LinkMetrics::snapshot`] to get a consistent point-in-time view.
#[derive(Debug, Default)]
pub struct LinkMetrics {
    connects: AtomicU64,
    commands_sent: AtomicU64,
    responses_received: AtomicU64,
    transport_errors: AtomicU64,
    retries: AtomicU64,
}

impl LinkMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful connection
    pub fn connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a command put on the wire
    pub fn command_sent(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed response
    pub fn response_received(&self) {
        self.responses_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transport failure
    pub fn transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a retry of a failed command
    pub fn retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> LinkMetricsSnapshot {
        LinkMetricsSnapshot {
            connects: self.connects.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            responses_received: self.responses_received.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the link counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkMetricsSnapshot {
    /// Successful connections over the process lifetime
    pub connects: u64,
    /// Commands put on the wire
    pub commands_sent: u64,
    /// Completed responses
    pub responses_received: u64,
    /// Transport failures
    pub transport_errors: u64,
    /// Command retries
    pub retries: u64,
}
