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

use thiserror::Error;

/// Result type for codec operations
pub type LineCodecResult<T> = Result<T, LineCodecError>;

/// Errors produced by the wire layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineCodecError {
    /// The command verb or its operands fall outside the recognized set.
    ///
    /// Commands rejected here are never transmitted and never retried.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A line exceeded the maximum permitted length without a terminator.
    ///
    /// The decoder discards input until the next line boundary so a
    /// misbehaving device cannot force unbounded buffering.
    #[error("line exceeded {limit} bytes without a terminator")]
    LineTooLong {
        /// The configured maximum line length
        limit: usize,
    },

    /// An I/O error surfaced through the framed transport.
    #[error("I/O error: {kind}")]
    Io {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
    },
}

impl From<std::io::Error> for LineCodecError {
    fn from(err: std::io::Error) -> Self {
        LineCodecError::Io { kind: err.kind() }
    }
}
