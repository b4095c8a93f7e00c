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

//! The command gateway
//!
//! Single orchestration point between callers and the wire: authorize, then
//! validate, then send, then reconcile the status cache. Authorization and
//! validation failures never generate wire traffic.

use crate::auth::AccessControl;
use crate::cache::StatusCache;
use crate::error::{Result, ServiceError};
use crate::types::{Permission, RoutingSnapshot};
use matrixctl_link::{Command, LinkError, LinkStatus, MatrixLink, fold_mappings};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a switch command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    /// The input that was routed (0 = off)
    pub input: u8,
    /// The output it was routed to
    pub output: u8,
    /// Raw device acknowledgment
    pub response: String,
}

/// Result of an explicit connect request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOutcome {
    /// Whether this call ended with a live connection
    pub success: bool,
    /// The connected flag after the attempt
    pub connected: bool,
}

/// Orchestrates access control, the status cache, and the device link.
pub struct CommandGateway {
    link: Arc<MatrixLink>,
    access: Arc<AccessControl>,
    cache: StatusCache,
}

impl CommandGateway {
    /// Create the gateway over its collaborators
    pub fn new(link: Arc<MatrixLink>, access: Arc<AccessControl>, cache_ttl: Duration) -> Self {
        Self {
            link,
            access,
            cache: StatusCache::new(cache_ttl),
        }
    }

    /// The access control layer behind this gateway
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Route `input` to `output` on the device.
    ///
    /// Requires the `switch` permission. Parameters are validated locally —
    /// inputs run 0–8 with 0 meaning "off", outputs 1–8 — and rejects never
    /// reach the wire. On success the status cache is invalidated before the
    /// acknowledgment is returned, so no caller can read routing state that
    /// predates the switch.
    pub async fn switch_route(
        &self,
        token: Option<&str>,
        input: i64,
        output: i64,
    ) -> Result<SwitchOutcome> {
        self.access.require_permission(token, Permission::Switch)?;

        if !(0..=8).contains(&input) {
            return Err(ServiceError::InvalidParameter {
                name: "input",
                value: input,
            });
        }
        if !(1..=8).contains(&output) {
            return Err(ServiceError::InvalidParameter {
                name: "output",
                value: output,
            });
        }
        let (input, output) = (input as u8, output as u8);
        let command = Command::switch_route(input, output).map_err(LinkError::from)?;

        let response = self.link.send(command).await?;
        self.cache.invalidate();
        info!(input, output, "route switched");
        Ok(SwitchOutcome {
            input,
            output,
            response: response.text(),
        })
    }

    /// Read the full routing table, serving from cache when fresh.
    ///
    /// Requires the `query` permission. A cache miss issues the full status
    /// query, folds the device's mapping lines into a snapshot (noise lines
    /// skipped, last write per output wins), and stores it. A reply with no
    /// parseable mapping line is a protocol-level bad read and surfaces as
    /// [`ServiceError::EmptyResponse`] without touching the cache.
    pub async fn query_routing(&self, token: Option<&str>) -> Result<RoutingSnapshot> {
        self.access.require_permission(token, Permission::Query)?;

        if let Some(snapshot) = self.cache.get() {
            debug!(age = ?snapshot.captured_at.elapsed(), "serving routing from cache");
            return Ok(snapshot);
        }

        let response = self.link.send(Command::query_all_mappings()).await?;
        let routes = fold_mappings(response.lines().iter().map(String::as_str));
        if routes.is_empty() {
            warn!(
                lines = response.lines().len(),
                "status query returned no parseable mappings"
            );
            return Err(ServiceError::EmptyResponse);
        }
        Ok(self.cache.put(routes))
    }

    /// Explicitly (re)connect to the device.
    ///
    /// Requires the `switch` permission. Subject to the link's reconnect
    /// cooldown; inside the window no wire attempt is made.
    pub async fn connect(&self, token: Option<&str>) -> Result<ConnectOutcome> {
        self.access.require_permission(token, Permission::Switch)?;
        let success = self.link.ensure_connected().await;
        Ok(ConnectOutcome {
            success,
            connected: self.link.is_connected(),
        })
    }

    /// Link status for the session-holder status endpoint
    pub fn link_status(&self, token: Option<&str>) -> Result<LinkStatus> {
        self.access.require_session(token)?;
        Ok(self.link.status())
    }

    /// Close the device connection; no permission beyond a session required.
    pub async fn disconnect(&self, token: Option<&str>) -> Result<()> {
        self.access.require_session(token)?;
        self.link.disconnect().await;
        Ok(())
    }
}
