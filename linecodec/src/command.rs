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

//! Typed outbound commands for the matrix device

use crate::result::{LineCodecError, LineCodecResult};
use std::fmt;

/// Lowest valid input number; input 0 switches an output off.
pub const MIN_INPUT: u8 = 0;
/// Highest valid input number.
pub const MAX_INPUT: u8 = 8;
/// Lowest valid output number.
pub const MIN_OUTPUT: u8 = 1;
/// Highest valid output number.
pub const MAX_OUTPUT: u8 = 8;

/// The outbound command set for the matrix device.
///
/// The device accepts exactly two verbs, so the allow-list is structural:
/// nothing outside this enum can be encoded onto the wire, and the
/// constructors validate operand ranges before a value ever exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Route `input` to `output` (`SET SW in<N> out<M>`). Input 0 switches
    /// the output off.
    SwitchRoute {
        /// Source input number (0 = off)
        input: u8,
        /// Destination output number
        output: u8,
    },
    /// Query the full routing table (`GET MP all`).
    QueryAllMappings,
}

impl Command {
    /// Build a switch command, validating operand ranges.
    ///
    /// Inputs run 0 through [`MAX_INPUT`] (0 meaning "off"), outputs
    /// [`MIN_OUTPUT`] through [`MAX_OUTPUT`]. Anything else is rejected with
    /// [`LineCodecError::InvalidCommand`] and never reaches the wire.
    pub fn switch_route(input: u8, output: u8) -> LineCodecResult<Self> {
        if input > MAX_INPUT {
            return Err(LineCodecError::InvalidCommand(format!(
                "input {input} outside {MIN_INPUT}..={MAX_INPUT}"
            )));
        }
        if !(MIN_OUTPUT..=MAX_OUTPUT).contains(&output) {
            return Err(LineCodecError::InvalidCommand(format!(
                "output {output} outside {MIN_OUTPUT}..={MAX_OUTPUT}"
            )));
        }
        Ok(Command::SwitchRoute { input, output })
    }

    /// Build the full-table status query.
    pub fn query_all_mappings() -> Self {
        Command::QueryAllMappings
    }

    /// The wire form of the command, without the line terminator.
    pub fn wire_format(&self) -> String {
        match self {
            Command::SwitchRoute { input, output } => {
                format!("SET SW in{input} out{output}")
            }
            Command::QueryAllMappings => "GET MP all".to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_format())
    }
}
