// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/drill_tools.rs - Parser for ODB++ drill tool tables.
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
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::structured_text::{StructuredArray, StructuredText};
use crate::structures::{HolePlating, Value, unknown};

/// Keys consumed by [DrillTool] itself; everything else ends up in
/// [DrillTool::info].
const TOOL_KEYS: [&str; 4] = ["NUM", "TYPE", "TYPE2", "DRILL_SIZE"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrillToolType {
    #[default]
    Standard,
    Photo,
    Laser,
    PressFit,
}

impl FromStr for DrillToolType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(DrillToolType::Standard),
            "PHOTO" => Ok(DrillToolType::Photo),
            "LASER" => Ok(DrillToolType::Laser),
            "PRESS_FIT" => Ok(DrillToolType::PressFit),
            _ => Err(unknown("drill tool type", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillTool {
    pub num: i64,
    pub plating: HolePlating,
    pub tool_type: DrillToolType,
    /// Drill diameter, in mils.
    pub size: Decimal,
    pub info: BTreeMap<String, Value>,
}

fn text<'a>(array: &'a StructuredArray, key: &str) -> Result<&'a str> {
    array
        .require(key)?
        .as_text()
        .ok_or_else(|| Error::Structure(format!("{}.{key} is not text", array.name)))
}

impl DrillTool {
    /// Builds a tool from a `TOOL` or `TOOLS` array. A missing `TYPE2` means
    /// a standard tool.
    pub fn from_array(array: &StructuredArray) -> Result<Self> {
        if array.name != "TOOL" && array.name != "TOOLS" {
            return Err(Error::Structure(format!(
                "expected a TOOLS array, found {}",
                array.name
            )));
        }

        let num = array
            .require("NUM")?
            .as_integer()
            .ok_or_else(|| Error::Structure("tool NUM is not an integer".to_string()))?;
        let size = array
            .require("DRILL_SIZE")?
            .as_decimal()
            .ok_or_else(|| Error::Structure(format!("tool {num} has no numeric DRILL_SIZE")))?;
        let tool_type = match array.get("TYPE2") {
            Some(_) => text(array, "TYPE2")?.parse()?,
            None => DrillToolType::default(),
        };

        let info = array
            .attributes
            .iter()
            .filter(|(key, _)| !TOOL_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            num,
            plating: text(array, "TYPE")?.parse()?,
            tool_type,
            size,
            info,
        })
    }
}

/// The drill tool table of a drill layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillToolSet {
    pub metadata: BTreeMap<String, Value>,
    pub tools: BTreeMap<i64, DrillTool>,
}

impl DrillToolSet {
    pub fn from_structured_text(text: &StructuredText) -> Result<Self> {
        let tools = text
            .arrays
            .iter()
            .map(|array| DrillTool::from_array(array).map(|tool| (tool.num, tool)))
            .collect::<Result<_>>()?;

        Ok(Self {
            metadata: text.metadata.clone(),
            tools,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::structured_text::DRILL_TOOLS;
    use crate::structures::parse_decimal;

    fn d(s: &str) -> Decimal {
        parse_decimal(s).unwrap()
    }

    fn info(finish: Value) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("MIN_TOL".to_string(), Value::Integer(0)),
            ("MAX_TOL".to_string(), Value::Integer(0)),
            ("BIT".to_string(), Value::Text(String::new())),
            ("FINISH_SIZE".to_string(), finish),
        ])
    }

    #[test]
    fn parse_tool_set() {
        let actual = DrillToolSet::from_structured_text(&StructuredText::parse(DRILL_TOOLS)).unwrap();

        let expected = DrillToolSet {
            metadata: BTreeMap::from([
                ("THICKNESS".to_string(), Value::Integer(0)),
                ("USER_PARAMS".to_string(), Value::Text(String::new())),
            ]),
            tools: BTreeMap::from([
                (
                    1,
                    DrillTool {
                        num: 1,
                        plating: HolePlating::Via,
                        tool_type: DrillToolType::Standard,
                        size: d("12"),
                        info: info(Value::Integer(12)),
                    },
                ),
                (
                    2,
                    DrillTool {
                        num: 2,
                        plating: HolePlating::NonPlated,
                        tool_type: DrillToolType::Standard,
                        size: d("39.3701"),
                        info: info(Value::Decimal(d("39.3701"))),
                    },
                ),
            ]),
        };
        assert_eq!(actual, expected);
    }

    #[test]
    fn wrong_array_name() {
        let text = StructuredText::parse("LAYER {\nNUM=1\nTYPE=VIA\nDRILL_SIZE=1\n}\n");
        assert!(matches!(
            DrillToolSet::from_structured_text(&text),
            Err(Error::Structure(_))
        ));
    }

    #[test]
    fn tool_type_defaults_to_standard() {
        let text = StructuredText::parse("TOOL {\nNUM=4\nTYPE=PLATED\nDRILL_SIZE=8\n}\n");
        let set = DrillToolSet::from_structured_text(&text).unwrap();
        assert_eq!(set.tools[&4].tool_type, DrillToolType::Standard);
        assert!(set.tools[&4].info.is_empty());

        let text = StructuredText::parse("TOOL {\nNUM=5\nTYPE=PLATED\nTYPE2=LASER\nDRILL_SIZE=8\n}\n");
        let set = DrillToolSet::from_structured_text(&text).unwrap();
        assert_eq!(set.tools[&5].tool_type, DrillToolType::Laser);
    }
}
