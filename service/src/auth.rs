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

//! Authentication, sessions, and lockout tracking
//!
//! Orchestrates the credential store, the login attempt tracker, and the
//! session store to answer "may this request do X". All side effects stay in
//! the two tracking maps; nothing here performs network I/O.

use crate::config::AccessConfig;
use crate::credentials::{CredentialStore, verify_password};
use crate::error::AuthError;
use crate::types::{Permission, Session};
use dashmap::DashMap;
use std::net::IpAddr;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Upper bound on username length accepted at login
pub const MAX_USERNAME_LENGTH: usize = 50;
/// Upper bound on password length accepted at login
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Failure bookkeeping is keyed per (client address, username) pair so one
/// pairing cannot lock out another.
type AttemptKey = (IpAddr, String);

#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    failures: u32,
    last_failure: Instant,
}

/// The access control layer.
///
/// Holds the immutable account table plus the mutable session and attempt
/// stores. Shared across concurrent requests; the stores are concurrent maps
/// and every method takes `&self`.
pub struct AccessControl {
    config: AccessConfig,
    credentials: CredentialStore,
    sessions: DashMap<String, Session>,
    attempts: DashMap<AttemptKey, AttemptRecord>,
    lockouts: DashMap<AttemptKey, Instant>,
}

impl AccessControl {
    /// Create the access control layer over a provisioned account table
    pub fn new(config: AccessConfig, credentials: CredentialStore) -> Self {
        if !config.enable_auth {
            warn!("authentication is DISABLED, every request will be allowed");
        }
        Self {
            config,
            credentials,
            sessions: DashMap::new(),
            attempts: DashMap::new(),
            lockouts: DashMap::new(),
        }
    }

    /// Whether authentication is enforced at all
    pub fn auth_enabled(&self) -> bool {
        self.config.enable_auth
    }

    /// Verify credentials and mint a session.
    ///
    /// Checks run in a fixed order: address allow-list, credential shape,
    /// lockout state, then account lookup and password verification. Unknown
    /// usernames and wrong passwords produce the same error and both count
    /// toward the lockout threshold.
    pub fn authenticate(
        &self,
        addr: IpAddr,
        username: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if !self.address_allowed(addr) {
            warn!(%addr, "login rejected by address allow-list");
            return Err(AuthError::AddressDenied);
        }
        if !credential_shape_ok(username, password) {
            return Err(AuthError::InvalidFormat);
        }

        let key = (addr, username.to_string());
        if let Some(locked_at) = self.lockouts.get(&key).map(|entry| *entry.value()) {
            if locked_at.elapsed() < self.config.lockout_window {
                warn!(%addr, username, "login rejected, pair is locked out");
                return Err(AuthError::Locked);
            }
            // Lockout aged out; forget it and the failures behind it.
            self.lockouts.remove(&key);
            self.attempts.remove(&key);
        }

        let Some(account) = self.credentials.account(username) else {
            self.record_failure(&key);
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &account.password_hash) {
            self.record_failure(&key);
            return Err(AuthError::InvalidCredentials);
        }

        self.attempts.remove(&key);
        let session = Session {
            token: Uuid::new_v4().to_string(),
            username: username.to_string(),
            role: account.role,
            permissions: account.permissions.clone(),
            issued_at: Instant::now(),
        };
        self.sessions.insert(session.token.clone(), session.clone());
        info!(username, role = %session.role, "login succeeded");
        Ok(session)
    }

    /// Look up a live session by token.
    ///
    /// Expired sessions and sessions whose account no longer exists are
    /// destroyed on sight and reported as [`AuthError::InvalidSession`].
    pub fn session(&self, token: &str) -> Result<Session, AuthError> {
        let Some(entry) = self.sessions.get(token) else {
            return Err(AuthError::InvalidSession);
        };
        let session = entry.value().clone();
        drop(entry);

        if session.issued_at.elapsed() > self.config.session_ttl {
            self.sessions.remove(token);
            debug!(username = %session.username, "session expired");
            return Err(AuthError::InvalidSession);
        }
        if self.credentials.account(&session.username).is_none() {
            self.sessions.remove(token);
            warn!(username = %session.username, "session referenced a missing account, destroyed");
            return Err(AuthError::InvalidSession);
        }
        Ok(session)
    }

    /// Check whether the caller behind `token` may perform `permission`.
    ///
    /// Always true when authentication is disabled. Otherwise requires a
    /// live session whose account still exists and grants the permission.
    pub fn authorize(&self, token: &str, permission: Permission) -> bool {
        if !self.config.enable_auth {
            return true;
        }
        match self.session(token) {
            Ok(session) => self.account_grants(&session, permission),
            Err(_) => false,
        }
    }

    /// Session lookup for endpoints that need a caller but no permission.
    ///
    /// Returns `Ok(None)` when authentication is disabled.
    pub fn require_session(&self, token: Option<&str>) -> Result<Option<Session>, AuthError> {
        if !self.config.enable_auth {
            return Ok(None);
        }
        let token = token.ok_or(AuthError::InvalidSession)?;
        self.session(token).map(Some)
    }

    /// Session-plus-permission check for mutating endpoints.
    pub fn require_permission(
        &self,
        token: Option<&str>,
        permission: Permission,
    ) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.require_session(token)? else {
            return Ok(None);
        };
        if !self.account_grants(&session, permission) {
            warn!(username = %session.username, %permission, "permission denied");
            return Err(AuthError::Forbidden { permission });
        }
        Ok(Some(session))
    }

    /// Destroy the session unconditionally; idempotent.
    pub fn logout(&self, token: &str) {
        if let Some((_, session)) = self.sessions.remove(token) {
            debug!(username = %session.username, "session destroyed");
        }
    }

    fn account_grants(&self, session: &Session, permission: Permission) -> bool {
        self.credentials
            .account(&session.username)
            .map(|account| account.permissions.contains(&permission))
            .unwrap_or(false)
    }

    fn address_allowed(&self, addr: IpAddr) -> bool {
        if self.config.allowed_nets.is_empty() {
            return true;
        }
        self.config.allowed_nets.iter().any(|net| net.contains(addr))
    }

    fn record_failure(&self, key: &AttemptKey) {
        let now = Instant::now();
        let mut entry = self.attempts.entry(key.clone()).or_insert(AttemptRecord {
            failures: 0,
            last_failure: now,
        });
        if entry.last_failure.elapsed() > self.config.lockout_window {
            // Failures older than the window no longer count toward lockout.
            entry.failures = 0;
        }
        entry.failures += 1;
        entry.last_failure = now;
        let failures = entry.failures;
        drop(entry);

        warn!(addr = %key.0, username = %key.1, failures, "login failure recorded");
        if failures >= self.config.max_attempts {
            warn!(addr = %key.0, username = %key.1, "lockout engaged");
            self.lockouts.insert(key.clone(), now);
        }
    }
}

fn credential_shape_ok(username: &str, password: &str) -> bool {
    !username.is_empty()
        && username.len() <= MAX_USERNAME_LENGTH
        && username.chars().all(|c| c.is_ascii_alphanumeric())
        && !password.is_empty()
        && password.len() <= MAX_PASSWORD_LENGTH
}
