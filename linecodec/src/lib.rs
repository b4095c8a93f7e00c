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

//! # Matrixctl Line Codec
//!
//! Wire layer for the video matrix control protocol: a fixed, line-terminated
//! command/response exchange over a single TCP session. This is deliberately
//! not a full telnet implementation — the device speaks plain CRLF-terminated
//! ASCII with no option negotiation.
//!
//! The crate provides three pieces:
//!
//! - [`LineCodec`] — a [`tokio_util::codec`] encoder/decoder that frames the
//!   stream into text lines, tolerating both `\r\n` and bare `\n` endings.
//! - [`Command`] — the typed outbound command set. Only recognized verbs are
//!   representable and operand ranges are validated at construction, so
//!   malformed traffic can never reach the wire.
//! - [`MappingLine`] — typed parsing of the `MP in<N> out<M>` routing lines
//!   the device emits in response to a full status query, plus
//!   [`fold_mappings`] to collapse a response into a routing table.

mod codec;
mod command;
mod mapping;
mod result;

pub use codec::LineCodec;
pub use command::{Command, MAX_INPUT, MAX_OUTPUT, MIN_INPUT, MIN_OUTPUT};
pub use mapping::{MappingLine, fold_mappings};
pub use result::{LineCodecError, LineCodecResult};
