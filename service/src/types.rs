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

//! Core types for the access control layer

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;

/// Operations an account may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Change routing state on the device
    Switch,
    /// Read routing state from the device
    Query,
    /// Reserved for configuration management
    Config,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch => write!(f, "switch"),
            Self::Query => write!(f, "query"),
            Self::Config => write!(f, "config"),
        }
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full operational access
    Admin,
    /// Day-to-day switching and monitoring
    Operator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Operator => write!(f, "operator"),
        }
    }
}

/// An authenticated caller.
///
/// Minted on successful login, destroyed on logout, on expiry, or when the
/// referenced account no longer exists. The permissions field is a snapshot
/// taken at login; authorization decisions consult the live account so the
/// two cannot drift apart while the account table is immutable.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque, unguessable session token
    pub token: String,
    /// Account the session was minted for
    pub username: String,
    /// Role snapshot at login
    pub role: Role,
    /// Permission snapshot at login
    pub permissions: HashSet<Permission>,
    /// When the session was minted
    pub issued_at: Instant,
}

/// The full routing table as last reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSnapshot {
    /// Output number → input number; input 0 means the output is off
    pub routes: BTreeMap<u8, u8>,
    /// When the snapshot was captured
    pub captured_at: Instant,
}

/// A malformed allow-list entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid network specification: {0}")]
pub struct InvalidNetwork(pub String);

/// One entry of the client address allow-list.
///
/// Either a single address or a CIDR network. Containment is a real subnet
/// mask comparison, not a textual prefix match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedNet {
    /// Exactly one address
    Addr(IpAddr),
    /// An IPv4 network in CIDR form
    V4 {
        /// Network address
        network: Ipv4Addr,
        /// Prefix length, 0..=32
        prefix: u8,
    },
    /// An IPv6 network in CIDR form
    V6 {
        /// Network address
        network: Ipv6Addr,
        /// Prefix length, 0..=128
        prefix: u8,
    },
}

impl AllowedNet {
    /// Check whether the given address falls inside this entry
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self, addr) {
            (Self::Addr(allowed), addr) => *allowed == addr,
            (Self::V4 { network, prefix }, IpAddr::V4(addr)) => {
                let mask = if *prefix == 0 {
                    0
                } else {
                    u32::MAX << (32 - u32::from(*prefix))
                };
                u32::from(*network) & mask == u32::from(addr) & mask
            }
            (Self::V6 { network, prefix }, IpAddr::V6(addr)) => {
                let mask = if *prefix == 0 {
                    0
                } else {
                    u128::MAX << (128 - u32::from(*prefix))
                };
                u128::from(*network) & mask == u128::from(addr) & mask
            }
            _ => false,
        }
    }
}

impl FromStr for AllowedNet {
    type Err = InvalidNetwork;

    fn from_str(spec: &str) -> Result<Self, InvalidNetwork> {
        let Some((network, prefix)) = spec.split_once('/') else {
            let addr = spec
                .parse()
                .map_err(|_| InvalidNetwork(spec.to_string()))?;
            return Ok(Self::Addr(addr));
        };
        let prefix: u8 = prefix.parse().map_err(|_| InvalidNetwork(spec.to_string()))?;
        match network.parse::<IpAddr>() {
            Ok(IpAddr::V4(network)) if prefix <= 32 => Ok(Self::V4 { network, prefix }),
            Ok(IpAddr::V6(network)) if prefix <= 128 => Ok(Self::V6 { network, prefix }),
            _ => Err(InvalidNetwork(spec.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(addr: &str) -> IpAddr {
        addr.parse().unwrap()
    }

    #[test]
    fn test_single_address_entry() {
        let net: AllowedNet = "192.168.1.10".parse().unwrap();
        assert!(net.contains(v4("192.168.1.10")));
        assert!(!net.contains(v4("192.168.1.11")));
    }

    #[test]
    fn test_cidr_containment() {
        let net: AllowedNet = "192.168.1.0/24".parse().unwrap();
        assert!(net.contains(v4("192.168.1.1")));
        assert!(net.contains(v4("192.168.1.254")));
        assert!(!net.contains(v4("192.168.2.1")));
    }

    #[test]
    fn test_cidr_is_not_a_string_prefix_match() {
        // 19.2.0.1 shares the leading characters of "192." but is nowhere
        // near 192.0.0.0/8; a bitmask check must reject it.
        let net: AllowedNet = "192.0.0.0/8".parse().unwrap();
        assert!(net.contains(v4("192.200.7.7")));
        assert!(!net.contains(v4("19.2.0.1")));
    }

    #[test]
    fn test_non_octet_aligned_prefix() {
        let net: AllowedNet = "10.0.0.0/12".parse().unwrap();
        assert!(net.contains(v4("10.15.255.255")));
        assert!(!net.contains(v4("10.16.0.0")));
    }

    #[test]
    fn test_zero_prefix_matches_everything() {
        let net: AllowedNet = "0.0.0.0/0".parse().unwrap();
        assert!(net.contains(v4("8.8.8.8")));
        assert!(net.contains(v4("127.0.0.1")));
    }

    #[test]
    fn test_v6_cidr_containment() {
        let net: AllowedNet = "fd00::/8".parse().unwrap();
        assert!(net.contains("fd12::1".parse().unwrap()));
        assert!(!net.contains("fe80::1".parse().unwrap()));
        assert!(!net.contains(v4("10.0.0.1")));
    }

    #[test]
    fn test_invalid_specifications() {
        assert!("10.0.0.0/33".parse::<AllowedNet>().is_err());
        assert!("not-an-address".parse::<AllowedNet>().is_err());
        assert!("10.0.0.0/x".parse::<AllowedNet>().is_err());
    }

    #[test]
    fn test_permission_serde_names() {
        let permission: Permission = serde_json::from_str("\"switch\"").unwrap();
        assert_eq!(permission, Permission::Switch);
        assert_eq!(serde_json::to_string(&Permission::Query).unwrap(), "\"query\"");
    }
}
