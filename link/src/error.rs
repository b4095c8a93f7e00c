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

//! Error types for the matrix device link

use matrixctl_linecodec::LineCodecError;
use std::time::Duration;
use thiserror::Error;

/// Result type for link operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Matrix link error types
#[derive(Debug, Error)]
pub enum LinkError {
    /// Command rejected before transmission; never retried.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// No connection to the device and reconnection did not succeed.
    #[error("not connected to matrix device")]
    NotConnected,

    /// Every send attempt failed; the last transport error was logged.
    #[error("command failed after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// The device produced no response line within the timeout.
    #[error("no response from device within {0:?}")]
    ResponseTimeout(Duration),

    /// I/O error on the transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing error from the codec layer
    #[error("codec error: {0}")]
    Codec(LineCodecError),
}

impl From<LineCodecError> for LinkError {
    fn from(err: LineCodecError) -> Self {
        match err {
            LineCodecError::InvalidCommand(command) => LinkError::InvalidCommand(command),
            other => LinkError::Codec(other),
        }
    }
}

impl LinkError {
    /// Check if the error is recoverable by reconnecting and retrying.
    ///
    /// Transport faults and garbled responses may clear on a fresh
    /// connection; validation failures and exhausted retries never do.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LinkError::Io(_) | LinkError::ResponseTimeout(_) | LinkError::Codec(_)
        )
    }

    /// Check if the error indicates the link is down
    pub fn is_connection_error(&self) -> bool {
        matches!(self, LinkError::NotConnected | LinkError::Io(_))
    }
}
