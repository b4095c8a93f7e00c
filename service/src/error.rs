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

//! Error types for access control and the command gateway

use crate::types::Permission;
use matrixctl_link::LinkError;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Authentication and authorization failures.
///
/// `InvalidCredentials` deliberately covers both "unknown user" and "wrong
/// password" — the two must be indistinguishable to a caller.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password failed the basic shape checks
    #[error("invalid credentials format")]
    InvalidFormat,

    /// Unknown user or wrong password; no distinction is revealed
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Too many failures from this (address, username) pair
    #[error("account temporarily locked")]
    Locked,

    /// Client address rejected by the allow-list
    #[error("access denied from this address")]
    AddressDenied,

    /// Missing, expired, or destroyed session
    #[error("authentication required")]
    InvalidSession,

    /// The session is valid but lacks the required permission
    #[error("insufficient permissions: {permission} required")]
    Forbidden {
        /// The permission the operation requires
        permission: Permission,
    },
}

/// Service error types
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Authentication or authorization failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A request parameter failed local validation; never reaches the wire
    #[error("invalid {name} value: {value}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
        /// The rejected value
        value: i64,
    },

    /// The device answered a status query with no parseable mapping lines
    #[error("no mapping data received from device")]
    EmptyResponse,

    /// Failure from the device link
    #[error(transparent)]
    Link(#[from] LinkError),
}

impl ServiceError {
    /// Check if the error is a local validation failure (never retried,
    /// never on the wire)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidParameter { .. } | ServiceError::Auth(AuthError::InvalidFormat)
        )
    }

    /// Check if the error came from the device link or protocol
    pub fn is_link(&self) -> bool {
        matches!(self, ServiceError::Link(_) | ServiceError::EmptyResponse)
    }
}
