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

//! Link manager configuration

use std::time::Duration;

/// Matrix device link configuration
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Device hostname or IP address
    pub host: String,

    /// Device port
    pub port: u16,

    /// Timeout for establishing the TCP connection
    pub connect_timeout: Duration,

    /// Timeout waiting for the first response line after a command
    pub response_timeout: Duration,

    /// Quiet window after which a multi-line response is considered complete
    pub drain_window: Duration,

    /// Maximum number of send attempts before giving up
    pub max_retries: u32,

    /// Fixed delay between send attempts
    pub retry_backoff: Duration,

    /// Minimum interval between reconnection attempts after a failure
    pub reconnect_cooldown: Duration,

    /// Bound on a single response line
    pub max_line_length: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 23,
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(1),
            drain_window: Duration::from_millis(150),
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
            reconnect_cooldown: Duration::from_secs(5),
            max_line_length: 1024,
        }
    }
}

impl LinkConfig {
    /// Create a new link configuration for the given device address
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the first-line response timeout
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the quiet window that ends a multi-line response
    pub fn with_drain_window(mut self, window: Duration) -> Self {
        self.drain_window = window;
        self
    }

    /// Set the maximum number of send attempts
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the delay between send attempts
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the reconnection cooldown
    pub fn with_reconnect_cooldown(mut self, cooldown: Duration) -> Self {
        self.reconnect_cooldown = cooldown;
        self
    }

    /// Set the bound on a single response line
    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// Get the device address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
