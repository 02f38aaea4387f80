// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/structures.rs - Common ODB++ data structures.
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

use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Capture group for a number field as written in line records.
pub const NUMBER: &str = r"(-?[\.\d]+)";

/// An X/Y point in the ODB++ plane.
///
/// The unit and origin of the coordinates depend on the file the point was
/// read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: Decimal,
    pub y: Decimal,
}

impl Point {
    pub fn new(x: Decimal, y: Decimal) -> Self {
        Self { x, y }
    }

    /// Parses a pair of coordinate strings.
    pub fn parse(x: &str, y: &str) -> Result<Self> {
        Ok(Self::new(parse_decimal(x)?, parse_decimal(y)?))
    }

    /// Component-wise minimum.
    pub fn min(self, other: Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Point) -> Point {
        Point::new(self.x.max(other.x), self.y.max(other.y))
    }
}

macro_rules! point_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Point {
            type Output = Point;

            fn $method(self, rhs: Point) -> Point {
                Point::new(self.x $op rhs.x, self.y $op rhs.y)
            }
        }

        impl $trait<Decimal> for Point {
            type Output = Point;

            fn $method(self, rhs: Decimal) -> Point {
                Point::new(self.x $op rhs, self.y $op rhs)
            }
        }
    };
}

point_op!(Add, add, +);
point_op!(Sub, sub, -);
point_op!(Mul, mul, *);
point_op!(Div, div, /);

/// Polarity of a feature or layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

impl FromStr for Polarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P" | "POSITIVE" => Ok(Polarity::Positive),
            "N" | "NEGATIVE" => Ok(Polarity::Negative),
            _ => Err(unknown("polarity", s)),
        }
    }
}

/// Mirror setting of a component or toeprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirror {
    No,
    /// Mirrored, axis unspecified.
    Mirror,
    MirrorX,
    MirrorY,
    MirrorXY,
}

impl FromStr for Mirror {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "N" => Ok(Mirror::No),
            "M" => Ok(Mirror::Mirror),
            "X" => Ok(Mirror::MirrorX),
            "Y" => Ok(Mirror::MirrorY),
            "XY" => Ok(Mirror::MirrorXY),
            _ => Err(unknown("mirror", s)),
        }
    }
}

/// Plating status of a drilled hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HolePlating {
    Plated,
    NonPlated,
    Via,
}

impl FromStr for HolePlating {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PLATED" | "P" => Ok(HolePlating::Plated),
            "NON_PLATED" | "N" => Ok(HolePlating::NonPlated),
            "VIA" | "V" => Ok(HolePlating::Via),
            _ => Err(unknown("hole plating", s)),
        }
    }
}

/// A reference to a symbol defined elsewhere, with a resize factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolReference {
    pub symbol: u32,
    pub resize_factor: Decimal,
}

impl SymbolReference {
    pub fn new(symbol: u32) -> Self {
        Self {
            symbol,
            resize_factor: Decimal::ONE,
        }
    }

    pub fn resized(symbol: u32, resize_factor: Decimal) -> Self {
        Self {
            symbol,
            resize_factor,
        }
    }
}

/// A loosely typed value from a structured text file or record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Integer(i64),
    Decimal(Decimal),
    Text(String),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(i) => Some(Decimal::from(*i)),
            Value::Decimal(d) => Some(*d),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Interprets `s` as an integer, then as a decimal, and falls back to text.
///
/// Strings with a leading zero (other than `0` itself and `0.`-prefixed
/// decimals) are identifiers such as part numbers and stay text.
pub fn try_parse_number(s: &str) -> Value {
    if s.starts_with('0') && s.len() != 1 && !s.starts_with("0.") {
        return Value::Text(s.to_string());
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    match parse_decimal(s) {
        Ok(d) => Value::Decimal(d),
        Err(_) => Value::Text(s.to_string()),
    }
}

/// Parses a decimal number as written in ODB++ files.
///
/// Accepts a missing integer part (`.5`, `-.5`).
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let normalized = if let Some(rest) = s.strip_prefix("-.") {
        format!("-0.{rest}")
    } else if let Some(rest) = s.strip_prefix('.') {
        format!("0.{rest}")
    } else {
        s.to_string()
    };
    Decimal::from_str(&normalized).map_err(|_| Error::InvalidNumber(s.to_string()))
}

/// Parses an integer record field.
pub fn parse_int<T: FromStr>(s: &str) -> Result<T> {
    s.parse::<T>()
        .map_err(|_| Error::InvalidNumber(s.to_string()))
}

pub(crate) fn unknown(what: &'static str, value: &str) -> Error {
    Error::UnknownCode {
        what,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        parse_decimal(s).unwrap()
    }

    fn p(x: &str, y: &str) -> Point {
        Point::parse(x, y).unwrap()
    }

    #[test]
    fn point_arithmetic() {
        assert_eq!(p("4", "10"), p("1", "1") + p("3", "9"));
        assert_eq!(p("4", "12"), p("1", "9") + d("3"));
        assert_eq!(p("-2", "-8"), p("1", "1") - p("3", "9"));
        assert_eq!(p("-2", "6"), p("1", "9") - d("3"));
        assert_eq!(p("3", "8"), p("1", "2") * p("3", "4"));
        assert_eq!(p("-3", "-27"), p("1", "9") * d("-3"));
        assert_eq!(p("1", "2"), p("3", "8") / p("3", "4"));
        assert_eq!(p("1", "9"), p("-3", "-27") / d("-3"));
    }

    #[test]
    fn try_parse_number_keeps_identifiers() {
        assert_eq!(try_parse_number("01"), Value::Text("01".to_string()));
        assert_eq!(try_parse_number("0"), Value::Integer(0));
        assert_eq!(try_parse_number("0.1"), Value::Decimal(d("0.1")));
        assert_eq!(try_parse_number("-12"), Value::Integer(-12));
        assert_eq!(try_parse_number("R12"), Value::Text("R12".to_string()));
        assert_eq!(try_parse_number(""), Value::Text(String::new()));
    }

    #[test]
    fn decimal_without_integer_part() {
        assert_eq!(d(".5"), Decimal::new(5, 1));
        assert_eq!(d("-.25"), Decimal::new(-25, 2));
        assert!(parse_decimal("1.2.3").is_err());
    }

    #[test]
    fn codes() {
        assert_eq!("POSITIVE".parse::<Polarity>().unwrap(), Polarity::Positive);
        assert_eq!("N".parse::<Polarity>().unwrap(), Polarity::Negative);
        assert_eq!("XY".parse::<Mirror>().unwrap(), Mirror::MirrorXY);
        assert!("Q".parse::<Mirror>().is_err());
        assert_eq!("non_plated".parse::<HolePlating>().unwrap(), HolePlating::NonPlated);
    }
}
