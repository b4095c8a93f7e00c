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

//! Access control configuration

use crate::types::AllowedNet;
use std::time::Duration;

/// Access control configuration
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Master switch; when false every request is allowed through.
    ///
    /// Exists for bench setups on isolated networks. The server logs a
    /// prominent warning when it is off.
    pub enable_auth: bool,

    /// Consecutive failures per (address, username) before lockout
    pub max_attempts: u32,

    /// How long a lockout lasts; also bounds how long failures accumulate
    pub lockout_window: Duration,

    /// How long a session stays valid after login
    pub session_ttl: Duration,

    /// Client address allow-list; empty means allow all
    pub allowed_nets: Vec<AllowedNet>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            enable_auth: true,
            max_attempts: 5,
            lockout_window: Duration::from_secs(15 * 60),
            session_ttl: Duration::from_secs(60 * 60),
            allowed_nets: Vec::new(),
        }
    }
}

impl AccessConfig {
    /// Create a configuration with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable authentication entirely
    pub fn with_enable_auth(mut self, enabled: bool) -> Self {
        self.enable_auth = enabled;
        self
    }

    /// Set the failure count that triggers a lockout
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the lockout duration
    pub fn with_lockout_window(mut self, window: Duration) -> Self {
        self.lockout_window = window;
        self
    }

    /// Set the session lifetime
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the client address allow-list
    pub fn with_allowed_nets(mut self, nets: Vec<AllowedNet>) -> Self {
        self.allowed_nets = nets;
        self
    }
}
