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

//! The immutable account table and password verification

use crate::types::{Permission, Role};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// One provisioned account.
///
/// Accounts are created by external provisioning, loaded from configuration
/// at startup, and never change during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Argon2id hash of the account password, in PHC string format
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Operations the account may perform
    pub permissions: HashSet<Permission>,
}

/// Read-only store of provisioned accounts, keyed by username.
#[derive(Debug, Default)]
pub struct CredentialStore {
    accounts: HashMap<String, Account>,
}

impl CredentialStore {
    /// Create a store over the given account table
    pub fn new(accounts: HashMap<String, Account>) -> Self {
        Self { accounts }
    }

    /// Look up an account by username
    pub fn account(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }

    /// Number of provisioned accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Hash a password into a PHC string suitable for the account table.
///
/// Used by external provisioning and by tests; the service itself only ever
/// verifies.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)?;
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Argon2id keeps verification deliberately slow and the underlying digest
/// comparison constant-time. An unparseable stored hash verifies as false —
/// the account is effectively disabled, not bypassed.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same password", &first));
        assert!(verify_password("same password", &second));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_store_lookup() {
        let mut accounts = HashMap::new();
        accounts.insert(
            "alice".to_string(),
            Account {
                password_hash: hash_password("secret").unwrap(),
                role: Role::Admin,
                permissions: HashSet::from([Permission::Switch, Permission::Query]),
            },
        );
        let store = CredentialStore::new(accounts);
        assert_eq!(store.len(), 1);
        assert!(store.account("alice").is_some());
        assert!(store.account("bob").is_none());
    }
}
