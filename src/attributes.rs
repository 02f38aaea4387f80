// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/attributes.rs - Feature attribute parser for ODB++ records.
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

use std::collections::BTreeMap;

use crate::error::Result;
use crate::structures::parse_int;

/// The value of one attribute assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    /// The attribute was listed without a value (`;5`).
    Set,
    /// `;5=3`. For text attributes this is an index into the attribute
    /// text string table.
    Number(i64),
}

/// Attributes of a record, keyed by attribute name index.
pub type Attributes = BTreeMap<u32, AttributeValue>;

/// Parses the attribute part of a record (`0=0,2=0,7`).
pub fn parse_attributes(attributes: &str) -> Result<Attributes> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(attributes.as_bytes());

    let mut parsed = Attributes::new();
    for result in reader.records() {
        let record = result?;
        for field in record.iter().filter(|field| !field.is_empty()) {
            let (key, value) = match field.split_once('=') {
                Some((key, value)) => (key.trim(), AttributeValue::Number(parse_int(value.trim())?)),
                None => (field, AttributeValue::Set),
            };
            parsed.insert(parse_int(key)?, value);
        }
    }
    Ok(parsed)
}

/// Parses the optional `;`-prefixed tail captured by a record pattern.
pub fn parse_optional_attributes(tail: Option<&str>) -> Result<Attributes> {
    match tail.map(|t| t.trim_start_matches(';').trim()) {
        Some(attributes) if !attributes.is_empty() => parse_attributes(attributes),
        _ => Ok(Attributes::new()),
    }
}

/// Parses the attributes of a whole record line, i.e. everything after the
/// first `;`.
pub fn parse_attributes_from_line(line: &str) -> Result<Attributes> {
    parse_optional_attributes(line.split_once(';').map(|(_, tail)| tail))
}
