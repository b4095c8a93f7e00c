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

//! Short-lived memoization of the device routing table

use crate::types::RoutingSnapshot;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Memoizes the last full routing snapshot for a fixed freshness window.
///
/// Read queries consult the cache first so bursts of status requests do not
/// hammer the device; any successful switch invalidates it immediately so
/// stale routing data is never served. The slot is replaced wholesale, never
/// patched, so readers always see a table consistent with one device reply.
#[derive(Debug)]
pub struct StatusCache {
    ttl: Duration,
    slot: Mutex<Option<RoutingSnapshot>>,
}

impl StatusCache {
    /// Create a cache with the given freshness window
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The configured freshness window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the cached snapshot if it is still fresh
    pub fn get(&self) -> Option<RoutingSnapshot> {
        let slot = self.lock();
        slot.as_ref()
            .filter(|snapshot| snapshot.captured_at.elapsed() < self.ttl)
            .cloned()
    }

    /// Store a freshly captured routing table, replacing any prior snapshot
    pub fn put(&self, routes: BTreeMap<u8, u8>) -> RoutingSnapshot {
        let snapshot = RoutingSnapshot {
            routes,
            captured_at: Instant::now(),
        };
        *self.lock() = Some(snapshot.clone());
        snapshot
    }

    /// Clear the cached snapshot
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        if slot.take().is_some() {
            debug!("routing cache invalidated");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<RoutingSnapshot>> {
        // The slot only ever holds a complete snapshot, poisoned or not.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
