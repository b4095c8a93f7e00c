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

//! Server configuration loaded from a JSON file
//!
//! The file supplies everything the core treats as an injected, immutable
//! snapshot: device address and timeouts, retry and lockout thresholds,
//! cache TTL, the address allow-list, and the account table. Unknown fields
//! are ignored so operator tooling can annotate the file freely.

use anyhow::Context;
use matrixctl_service::{AccessConfig, Account, AllowedNet, LinkConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerSection,
    /// Matrix device link settings
    pub matrix: MatrixSection,
    /// Authentication and lockout settings
    #[serde(default)]
    pub security: SecuritySection,
    /// Provisioned accounts, keyed by username
    #[serde(default)]
    pub users: HashMap<String, Account>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Matrix device link settings
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixSection {
    /// Device hostname or IP address
    pub host: String,
    /// Device port
    pub port: u16,
    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// First-response timeout per command in milliseconds
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    /// Maximum send attempts per command
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay between send attempts in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Minimum interval between reconnection attempts in milliseconds
    #[serde(default = "default_reconnect_cooldown_ms")]
    pub reconnect_cooldown_ms: u64,
    /// Routing snapshot freshness window in milliseconds
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
}

/// Authentication and lockout settings
#[derive(Debug, Clone, Deserialize)]
pub struct SecuritySection {
    /// Master authentication switch
    #[serde(default = "default_true")]
    pub enable_auth: bool,
    /// Failures per (address, username) pair before lockout
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    /// Lockout duration in milliseconds
    #[serde(default = "default_lockout_ms")]
    pub lockout_ms: u64,
    /// Session lifetime in milliseconds
    #[serde(default = "default_session_ttl_ms")]
    pub session_ttl_ms: u64,
    /// Client allow-list entries: single addresses or CIDR networks
    #[serde(default)]
    pub allowed_ips: Vec<String>,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            enable_auth: default_true(),
            max_login_attempts: default_max_login_attempts(),
            lockout_ms: default_lockout_ms(),
            session_ttl_ms: default_session_ttl_ms(),
            allowed_ips: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load and parse the configuration file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        let config: AppConfig =
            serde_json::from_str(&raw).context("parsing configuration file")?;
        Ok(config)
    }

    /// Device link configuration
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig::new(self.matrix.host.clone(), self.matrix.port)
            .with_connect_timeout(Duration::from_millis(self.matrix.connect_timeout_ms))
            .with_response_timeout(Duration::from_millis(self.matrix.response_timeout_ms))
            .with_max_retries(self.matrix.max_retries)
            .with_retry_backoff(Duration::from_millis(self.matrix.retry_backoff_ms))
            .with_reconnect_cooldown(Duration::from_millis(self.matrix.reconnect_cooldown_ms))
    }

    /// Access control configuration, with allow-list entries parsed
    pub fn access_config(&self) -> anyhow::Result<AccessConfig> {
        let allowed_nets = self
            .security
            .allowed_ips
            .iter()
            .map(|spec| {
                spec.parse::<AllowedNet>()
                    .with_context(|| format!("allow-list entry {spec:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(AccessConfig::new()
            .with_enable_auth(self.security.enable_auth)
            .with_max_attempts(self.security.max_login_attempts)
            .with_lockout_window(Duration::from_millis(self.security.lockout_ms))
            .with_session_ttl(Duration::from_millis(self.security.session_ttl_ms))
            .with_allowed_nets(allowed_nets))
    }

    /// Routing snapshot freshness window
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.matrix.cache_ttl_ms)
    }
}

fn default_bind() -> SocketAddr {
    "0.0.0.0:3000".parse().expect("static default bind address")
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_response_timeout_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_reconnect_cooldown_ms() -> u64 {
    5000
}

fn default_cache_ttl_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_max_login_attempts() -> u32 {
    5
}

fn default_lockout_ms() -> u64 {
    15 * 60 * 1000
}

fn default_session_ttl_ms() -> u64 {
    60 * 60 * 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_applies_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "matrix": { "host": "10.0.1.50", "port": 23 } }"#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.matrix.max_retries, 3);
        assert!(config.security.enable_auth);
        assert!(config.users.is_empty());

        let link = config.link_config();
        assert_eq!(link.address(), "10.0.1.50:23");
        assert_eq!(link.reconnect_cooldown, Duration::from_secs(5));
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_full_config_parses() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "server": { "bind": "127.0.0.1:8443" },
                "matrix": {
                    "host": "matrix.local",
                    "port": 4001,
                    "connect_timeout_ms": 2000,
                    "response_timeout_ms": 800,
                    "max_retries": 5,
                    "retry_backoff_ms": 500,
                    "reconnect_cooldown_ms": 10000,
                    "cache_ttl_ms": 2500
                },
                "security": {
                    "enable_auth": true,
                    "max_login_attempts": 3,
                    "lockout_ms": 60000,
                    "session_ttl_ms": 600000,
                    "allowed_ips": ["10.0.0.0/8", "192.168.1.10"]
                },
                "users": {
                    "alice": {
                        "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$x",
                        "role": "admin",
                        "permissions": ["switch", "query", "config"]
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.matrix.max_retries, 5);
        assert_eq!(config.security.max_login_attempts, 3);
        assert_eq!(config.users.len(), 1);

        let access = config.access_config().unwrap();
        assert_eq!(access.allowed_nets.len(), 2);
        assert_eq!(access.lockout_window, Duration::from_secs(60));
    }

    #[test]
    fn test_bad_allow_list_entry_is_an_error() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "matrix": { "host": "m", "port": 23 },
                "security": { "allowed_ips": ["10.0.0.0/40"] }
            }"#,
        )
        .unwrap();
        assert!(config.access_config().is_err());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "matrix": { "host": "m", "port": 23, "model": "VM-0808" },
                "ssl": { "enabled": false }
            }"#,
        )
        .unwrap();
        assert_eq!(config.matrix.host, "m");
    }
}
