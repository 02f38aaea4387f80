// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/structured_text.rs - Parser for ODB++ structured text files.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `structured_text` Module
 *
 * Structured text files (`matrix/matrix`, drill `tools`, ...) hold
 * `KEY=VALUE` lines, either at the top level or grouped into named arrays:
 *
 * ```text
 * THICKNESS=0
 * TOOLS {
 *     NUM=1
 *     DRILL_SIZE=12
 * }
 * ```
 */

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::io::prelude::*;
use std::path::Path;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::structures::{Value, try_parse_number};

static ARRAY_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\s+\{").expect("valid array start pattern"));

/// One `NAME { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredArray {
    pub name: String,
    pub attributes: BTreeMap<String, Value>,
}

impl StructuredArray {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Like [StructuredArray::get], but a missing key is an error.
    pub fn require(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| Error::MissingKey(format!("{}.{}", self.name, key)))
    }
}

/// A parsed structured text file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredText {
    /// Top-level `KEY=VALUE` pairs.
    pub metadata: BTreeMap<String, Value>,
    /// Arrays in file order.
    pub arrays: Vec<StructuredArray>,
}

impl StructuredText {
    /// Parses structured text lines.
    ///
    /// Lines that are neither assignments, array starts nor array ends are
    /// ignored. An array that is still open at the end of input is kept.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut text = Self::default();
        let mut current: Option<StructuredArray> = None;

        for line in lines {
            let line = line.as_ref().trim();

            if let Some((key, value)) = line.split_once('=') {
                let value = try_parse_number(value);
                match current.as_mut() {
                    Some(array) => array.attributes.insert(key.to_string(), value),
                    None => text.metadata.insert(key.to_string(), value),
                };
                continue;
            }

            if line == "}" {
                text.arrays.extend(current.take());
                continue;
            }

            if let Some(captures) = ARRAY_START.captures(line) {
                current = Some(StructuredArray {
                    name: captures[1].to_string(),
                    attributes: BTreeMap::new(),
                });
            }
        }

        text.arrays.extend(current);
        text
    }

    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    pub fn from_filename<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("reading structured text from {}", path.display());

        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Reads a whole structured text file from `reader`. The contents must
    /// be valid UTF-8.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::parse(&String::from_utf8(buffer)?))
    }

    /// Arrays named `name`, in file order.
    pub fn arrays_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a StructuredArray> {
        self.arrays.iter().filter(move |array| array.name == name)
    }
}

#[cfg(test)]
pub(crate) const DRILL_TOOLS: &str = "
THICKNESS=0
USER_PARAMS=
TOOLS {
    NUM=1
    TYPE=VIA
    TYPE2=STANDARD
    MIN_TOL=0
    MAX_TOL=0
    BIT=
    FINISH_SIZE=12
    DRILL_SIZE=12
}
(
TOOLS {
    NUM=2
    TYPE=NON_PLATED
    TYPE2=STANDARD
    MIN_TOL=0
    MAX_TOL=0
    BIT=
    FINISH_SIZE=39.3701
    DRILL_SIZE=39.3701
}";

#[cfg(test)]
mod tests {
    use super::*;

    use crate::structures::parse_decimal;

    #[test]
    fn rejects_invalid_utf8() {
        let bytes: &[u8] = b"UNITS=\xc3\x28\n";
        assert!(matches!(StructuredText::from_reader(bytes), Err(Error::Utf8(_))));
    }

    #[test]
    fn parses_metadata_and_arrays() {
        let text = StructuredText::parse(DRILL_TOOLS);

        assert_eq!(text.metadata["THICKNESS"], Value::Integer(0));
        assert_eq!(text.metadata["USER_PARAMS"], Value::Text(String::new()));
        assert_eq!(text.arrays.len(), 2);

        let second = &text.arrays[1];
        assert_eq!(second.name, "TOOLS");
        assert_eq!(second.attributes.len(), 8);
        assert_eq!(second.get("TYPE"), Some(&Value::Text("NON_PLATED".to_string())));
        assert_eq!(
            second.get("DRILL_SIZE"),
            Some(&Value::Decimal(parse_decimal("39.3701").unwrap()))
        );
        assert!(second.require("NOPE").is_err());
    }

    #[test]
    fn unterminated_array_is_kept() {
        let text = StructuredText::parse("LAYER {\nNAME=TOP\n");
        assert_eq!(text.arrays.len(), 1);
        assert_eq!(text.arrays_named("LAYER").count(), 1);
    }
}
