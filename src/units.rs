// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/units.rs - Unit handling for ODB++ files.
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

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::linerecord::LineRecords;

static UNIT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^U\s+([A-Za-z]+)").expect("valid unit line pattern"));

/// Represents the unit system a file's coordinates are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Millimeters.
    Millimeters,
    /// Micrometers.
    Micrometers,
    /// Inches.
    Inches,
    /// Mils (1/1000 inch).
    Mils,
}

impl Unit {
    /// Size of one unit in millimeters.
    pub fn mm_factor(self) -> Decimal {
        match self {
            Unit::Millimeters => Decimal::ONE,
            Unit::Micrometers => Decimal::new(1, 3),
            Unit::Inches => Decimal::new(254, 1),
            Unit::Mils => Decimal::new(254, 4),
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MM" => Ok(Unit::Millimeters),
            "UM" => Ok(Unit::Micrometers),
            "IN" | "INCH" => Ok(Unit::Inches),
            "MIL" => Ok(Unit::Mils),
            _ => Err(Error::InvalidUnit(s.to_string())),
        }
    }
}

/// Converts `value` to millimeters. `None` if the result does not fit in a
/// [Decimal].
pub fn to_mm(value: Decimal, from: Unit) -> Option<Decimal> {
    value.checked_mul(from.mm_factor())
}

fn convert(value: Decimal, from: Unit, to: Unit) -> Option<Decimal> {
    if from == to {
        return Some(value);
    }
    to_mm(value, from)?.checked_div(to.mm_factor())
}

pub fn to_mil(value: Decimal, from: Unit) -> Option<Decimal> {
    convert(value, from, Unit::Mils)
}

pub fn to_micrometers(value: Decimal, from: Unit) -> Option<Decimal> {
    convert(value, from, Unit::Micrometers)
}

pub fn to_inches(value: Decimal, from: Unit) -> Option<Decimal> {
    convert(value, from, Unit::Inches)
}

/// Extracts the unit from the `U <unit>` line of a line record file.
///
/// The line is looked up in the `Units` section, or in the unnamed header
/// section when the file has no such section. Exactly one unit line is
/// accepted.
pub fn linerecords_unit(records: &LineRecords) -> Result<Unit> {
    let lines: Vec<&String> = match records.get("Units") {
        Some(lines) => lines.iter().collect(),
        None => records
            .header()
            .iter()
            .filter(|line| UNIT_LINE.is_match(line))
            .collect(),
    };

    let [line] = lines.as_slice() else {
        return Err(Error::InvalidUnit(format!(
            "expected exactly one unit line, found {}",
            lines.len()
        )));
    };

    let captures = UNIT_LINE
        .captures(line)
        .ok_or_else(|| Error::InvalidUnit(format!("invalid unit line {line:?}")))?;
    captures[1].parse()
}
