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

//! # Matrixctl Link Manager
//!
//! Owns the single outbound connection to the matrix device and serializes
//! every command through it. The device speaks a half-duplex, line-terminated
//! protocol over one session; concurrent commands on one connection would
//! interleave their responses, so all wire access funnels through an internal
//! mutex and exactly one command is in flight at a time.
//!
//! The manager deals with an unreliable transport:
//!
//! - Reconnection attempts are rate-limited to one per cooldown window, so a
//!   dead device is not hammered by every incoming request.
//! - [`MatrixLink::send`] retries transient transport failures with a fixed
//!   backoff up to a configured bound, reconnecting at the top of each
//!   attempt, and surfaces exhaustion as [`LinkError::RetriesExhausted`]
//!   rather than masking it.
//! - Per-attempt connect and response timeouts bound every wait.
//!
//! ```no_run
//! use matrixctl_link::{Command, LinkConfig, MatrixLink};
//!
//! # async fn example() -> matrixctl_link::Result<()> {
//! let link = MatrixLink::new(LinkConfig::new("10.0.1.50", 23));
//! let response = link.send(Command::switch_route(2, 1)?).await?;
//! println!("device said: {}", response.text());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod link;
mod metrics;

pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use link::{LinkStatus, MatrixLink, Response};
pub use metrics::{LinkMetrics, LinkMetricsSnapshot};

// Re-export the wire layer so callers need only one dependency.
pub use matrixctl_linecodec::{
    Command, LineCodec, LineCodecError, LineCodecResult, MappingLine, fold_mappings,
};
