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

use crate::command::Command;
use crate::result::LineCodecError;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Default bound on a single response line.
const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// A codec for the matrix device's line protocol.
///
/// Decodes the inbound stream into text lines split on `\n`, trimming a
/// trailing `\r` so both CRLF and bare-LF devices are handled. Encodes
/// [`Command`] values as CRLF-terminated ASCII, which is the only line
/// ending the device accepts.
///
/// Inbound bytes are converted lossily: the device nominally speaks ASCII,
/// and anything unprintable lands in noise lines the mapping parser skips.
pub struct LineCodec {
    max_line_length: usize,
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default line length bound.
    pub fn new() -> LineCodec {
        LineCodec::default()
    }

    /// Create a codec with an explicit line length bound.
    ///
    /// Lines longer than `max_line_length` with no terminator produce a
    /// [`LineCodecError::LineTooLong`] and the remainder of the offending
    /// line is discarded, keeping the decode buffer bounded.
    pub fn with_max_line_length(max_line_length: usize) -> LineCodec {
        LineCodec {
            max_line_length,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        LineCodec {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            discarding: false,
        }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = LineCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, LineCodecError> {
        loop {
            let Some(newline) = src.iter().position(|&b| b == b'\n') else {
                if src.len() > self.max_line_length {
                    warn!(
                        limit = self.max_line_length,
                        buffered = src.len(),
                        "discarding oversized line from device"
                    );
                    src.clear();
                    self.discarding = true;
                    return Err(LineCodecError::LineTooLong {
                        limit: self.max_line_length,
                    });
                }
                return Ok(None);
            };

            let mut line = src.split_to(newline + 1);
            if self.discarding {
                // Tail end of a line that was already reported oversized.
                self.discarding = false;
                continue;
            }
            line.truncate(newline);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, LineCodecError> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None if src.is_empty() || self.discarding => Ok(None),
            None => {
                // Final unterminated fragment when the device closes mid-line.
                let line = src.split_to(src.len());
                Ok(Some(String::from_utf8_lossy(&line).into_owned()))
            }
        }
    }
}

impl Encoder<Command> for LineCodec {
    type Error = LineCodecError;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<(), LineCodecError> {
        let line = command.wire_format();
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
