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

//! # Matrixctl Service
//!
//! The control plane between HTTP callers and the matrix device link:
//!
//! - [`AccessControl`] — credential verification against an immutable account
//!   table, session issuance and expiry, per-(address, username) failure
//!   tracking with time-boxed lockouts, and permission enforcement.
//! - [`StatusCache`] — short-lived memoization of the full routing table so
//!   read queries do not hammer the device.
//! - [`CommandGateway`] — the orchestration point: validates parameters,
//!   consults access control, issues wire commands through the link manager,
//!   and invalidates the cache on state-changing commands.
//!
//! Every mutating command passes through both access control and the link
//! manager before reaching the wire; authorization failures never generate
//! wire traffic.

mod auth;
mod cache;
mod config;
mod credentials;
mod error;
mod gateway;
mod types;

pub use auth::{AccessControl, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH};
pub use cache::StatusCache;
pub use config::AccessConfig;
pub use credentials::{Account, CredentialStore, hash_password, verify_password};
pub use error::{AuthError, Result, ServiceError};
pub use gateway::{CommandGateway, ConnectOutcome, SwitchOutcome};
pub use types::{AllowedNet, InvalidNetwork, Permission, Role, RoutingSnapshot, Session};

// Re-export the layers below so the server depends on one crate.
pub use matrixctl_link::{Command, LinkConfig, LinkError, LinkStatus, MatrixLink, Response};
