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

//! Authentication, lockout, and authorization tests

use matrixctl_service::{
    AccessConfig, AccessControl, Account, AuthError, CredentialStore, Permission, Role,
    hash_password,
};
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

const ALICE_PASSWORD: &str = "sw0rdfish";
const BOB_PASSWORD: &str = "querypass";

fn client() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))
}

fn other_client() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))
}

fn store() -> CredentialStore {
    let mut accounts = HashMap::new();
    accounts.insert(
        "alice".to_string(),
        Account {
            password_hash: hash_password(ALICE_PASSWORD).unwrap(),
            role: Role::Admin,
            permissions: HashSet::from([
                Permission::Switch,
                Permission::Query,
                Permission::Config,
            ]),
        },
    );
    accounts.insert(
        "bob".to_string(),
        Account {
            password_hash: hash_password(BOB_PASSWORD).unwrap(),
            role: Role::Operator,
            permissions: HashSet::from([Permission::Query]),
        },
    );
    CredentialStore::new(accounts)
}

fn access(config: AccessConfig) -> AccessControl {
    AccessControl::new(config, store())
}

#[test]
fn test_login_mints_a_usable_session() {
    let access = access(AccessConfig::default());
    let session = access.authenticate(client(), "alice", ALICE_PASSWORD).unwrap();

    assert!(!session.token.is_empty());
    assert_eq!(session.role, Role::Admin);
    assert!(session.permissions.contains(&Permission::Switch));

    let looked_up = access.session(&session.token).unwrap();
    assert_eq!(looked_up.username, "alice");
}

#[test]
fn test_unknown_user_indistinguishable_from_wrong_password() {
    let access = access(AccessConfig::default());

    let unknown = access
        .authenticate(client(), "mallory", "whatever")
        .unwrap_err();
    let wrong = access
        .authenticate(client(), "alice", "not the password")
        .unwrap_err();

    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[test]
fn test_lockout_after_threshold_failures() {
    let access = access(AccessConfig::default().with_max_attempts(3));

    for _ in 0..3 {
        let err = access
            .authenticate(client(), "alice", "wrong")
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    // Even the correct password is refused while the lockout is live.
    let err = access
        .authenticate(client(), "alice", ALICE_PASSWORD)
        .unwrap_err();
    assert!(matches!(err, AuthError::Locked));
}

#[test]
fn test_lockout_is_scoped_to_the_address_username_pair() {
    let access = access(AccessConfig::default().with_max_attempts(3));

    for _ in 0..3 {
        let _ = access.authenticate(client(), "alice", "wrong");
    }

    // Same account from another address still works.
    assert!(
        access
            .authenticate(other_client(), "alice", ALICE_PASSWORD)
            .is_ok()
    );
    // Another account from the locked address still works.
    assert!(access.authenticate(client(), "bob", BOB_PASSWORD).is_ok());
}

#[test]
fn test_expired_lockout_clears_and_allows_login() {
    let access = access(
        AccessConfig::default()
            .with_max_attempts(3)
            .with_lockout_window(Duration::from_millis(80)),
    );

    for _ in 0..3 {
        let _ = access.authenticate(client(), "alice", "wrong");
    }
    assert!(matches!(
        access.authenticate(client(), "alice", ALICE_PASSWORD),
        Err(AuthError::Locked)
    ));

    std::thread::sleep(Duration::from_millis(120));
    assert!(
        access
            .authenticate(client(), "alice", ALICE_PASSWORD)
            .is_ok()
    );
}

#[test]
fn test_success_clears_accumulated_failures() {
    let access = access(AccessConfig::default().with_max_attempts(3));

    for _ in 0..2 {
        let _ = access.authenticate(client(), "alice", "wrong");
    }
    assert!(
        access
            .authenticate(client(), "alice", ALICE_PASSWORD)
            .is_ok()
    );

    // The counter restarted, so two fresh failures stay below the threshold.
    for _ in 0..2 {
        let _ = access.authenticate(client(), "alice", "wrong");
    }
    assert!(
        access
            .authenticate(client(), "alice", ALICE_PASSWORD)
            .is_ok()
    );
}

#[test]
fn test_malformed_credentials_are_rejected_before_lookup() {
    let access = access(AccessConfig::default());

    for (username, password) in [
        ("", "pw"),
        ("alice", ""),
        ("al ice", "pw"),
        ("alice'--", "pw"),
        (&"a".repeat(51) as &str, "pw"),
        ("alice", &"p".repeat(101) as &str),
    ] {
        let err = access
            .authenticate(client(), username, password)
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidFormat), "{username:?}");
    }
}

#[test]
fn test_allow_list_rejects_outside_addresses() {
    let access = access(
        AccessConfig::default().with_allowed_nets(vec!["10.0.0.0/24".parse().unwrap()]),
    );

    assert!(
        access
            .authenticate(client(), "alice", ALICE_PASSWORD)
            .is_ok()
    );

    let outside = IpAddr::V4(Ipv4Addr::new(172, 16, 0, 9));
    assert!(matches!(
        access.authenticate(outside, "alice", ALICE_PASSWORD),
        Err(AuthError::AddressDenied)
    ));
}

#[test]
fn test_authorize_checks_the_permission_set() {
    let access = access(AccessConfig::default());
    let bob = access.authenticate(client(), "bob", BOB_PASSWORD).unwrap();

    assert!(access.authorize(&bob.token, Permission::Query));
    assert!(!access.authorize(&bob.token, Permission::Switch));
    assert!(!access.authorize("no-such-token", Permission::Query));
}

#[test]
fn test_require_permission_surfaces_forbidden() {
    let access = access(AccessConfig::default());
    let bob = access.authenticate(client(), "bob", BOB_PASSWORD).unwrap();

    let err = access
        .require_permission(Some(&bob.token), Permission::Switch)
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Forbidden {
            permission: Permission::Switch
        }
    ));
}

#[test]
fn test_logout_is_idempotent() {
    let access = access(AccessConfig::default());
    let session = access.authenticate(client(), "alice", ALICE_PASSWORD).unwrap();

    access.logout(&session.token);
    assert!(matches!(
        access.session(&session.token),
        Err(AuthError::InvalidSession)
    ));
    // A second logout of the same token is a no-op.
    access.logout(&session.token);
}

#[test]
fn test_sessions_expire_after_ttl() {
    let access = access(AccessConfig::default().with_session_ttl(Duration::from_millis(50)));
    let session = access.authenticate(client(), "alice", ALICE_PASSWORD).unwrap();

    std::thread::sleep(Duration::from_millis(80));
    assert!(matches!(
        access.session(&session.token),
        Err(AuthError::InvalidSession)
    ));
}

#[test]
fn test_disabled_auth_allows_everything() {
    let access = access(AccessConfig::default().with_enable_auth(false));

    assert!(access.authorize("garbage", Permission::Switch));
    assert!(access.require_session(None).unwrap().is_none());
    assert!(
        access
            .require_permission(None, Permission::Switch)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_tokens_are_unique_per_login() {
    let access = access(AccessConfig::default());
    let first = access.authenticate(client(), "alice", ALICE_PASSWORD).unwrap();
    let second = access.authenticate(client(), "alice", ALICE_PASSWORD).unwrap();

    assert_ne!(first.token, second.token);
    // Both sessions are independently live.
    assert!(access.session(&first.token).is_ok());
    assert!(access.session(&second.token).is_ok());
}
