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

//! Typed parsing of the device's `MP in<N> out<M>` routing lines

use crate::command::{MAX_INPUT, MAX_OUTPUT, MIN_OUTPUT};
use std::collections::BTreeMap;

/// A single routing assignment reported by the device.
///
/// Produced by [`MappingLine::parse`] from response lines of the form
/// `MP in<N> out<M>`. The match is case-insensitive, tolerates surrounding
/// noise tokens, and skips anything that does not fit the pattern — the
/// device interleaves banner and blank lines with real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingLine {
    /// Source input number (0 = off)
    pub input: u8,
    /// Destination output number
    pub output: u8,
}

impl MappingLine {
    /// Parse one response line into a mapping, or `None` for noise.
    ///
    /// Numbers outside the device's valid input/output ranges are treated
    /// as noise too, so a snapshot never holds an impossible route.
    pub fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        for window in tokens.windows(3) {
            if !window[0].eq_ignore_ascii_case("mp") {
                continue;
            }
            let Some(input) = numeric_suffix(window[1], "in") else {
                continue;
            };
            let Some(output) = numeric_suffix(window[2], "out") else {
                continue;
            };
            if input > MAX_INPUT || !(MIN_OUTPUT..=MAX_OUTPUT).contains(&output) {
                continue;
            }
            return Some(MappingLine { input, output });
        }
        None
    }
}

/// Fold response lines into an output → input routing table.
///
/// Non-matching lines are skipped silently and later lines for the same
/// output overwrite earlier ones; the device is authoritative and does not
/// duplicate outputs in practice.
pub fn fold_mappings<'a, I>(lines: I) -> BTreeMap<u8, u8>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut routes = BTreeMap::new();
    for line in lines {
        if let Some(mapping) = MappingLine::parse(line) {
            routes.insert(mapping.output, mapping.input);
        }
    }
    routes
}

/// Strip a case-insensitive prefix and parse the remainder as a number.
fn numeric_suffix(token: &str, prefix: &str) -> Option<u8> {
    if token.len() <= prefix.len() {
        return None;
    }
    let (head, tail) = token.split_at(prefix.len());
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    tail.parse().ok()
}
