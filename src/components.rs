// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/components.rs - Parser for ODB++ component files.
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
 * # `components` Module
 *
 * Every component of a `components` file lives in its own `CMP <n>`
 * section holding one `CMP` record, its `PRP` properties and its `TOP`
 * toeprints. Each section is decoded on its own and consolidated into a
 * single [Component].
 *
 * ## Usage Example
 *
 * ```no_run
 * use odbpp::components::{map_components_by_name, parse_components};
 * use odbpp::linerecord::LineRecords;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let records = LineRecords::from_filename("job/steps/pcb/layers/comp_+_top/components")?;
 *     let components = parse_components(&records)?;
 *     for (name, component) in map_components_by_name(components.values()) {
 *         println!("{name}: {}", component.part_name);
 *     }
 *     Ok(())
 * }
 * ```
 */

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::trace;
use once_cell::sync::Lazy;
use regex::Captures;
use rust_decimal::Decimal;

use crate::attributes::{Attributes, parse_optional_attributes};
use crate::decoder::{DecodeOption, decode_tags};
use crate::error::{Error, Result};
use crate::linerecord::LineRecords;
use crate::structures::{
    Mirror, NUMBER, Point, Value, parse_decimal, parse_int, try_parse_number,
};

/// One decoded record of a component section.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentRecord {
    /// `CMP <pkg_ref> <x> <y> <rot> <mirror> <name> <part_name> [;attrs]`
    Component {
        package_ref: u32,
        location: Point,
        rotation: Decimal,
        mirror: Mirror,
        name: Value,
        part_name: Value,
        attributes: Attributes,
    },
    /// `PRP <key> '<value>'`
    Property { key: String, value: String },
    /// `TOP <pin> <x> <y> <rot> <mirror> <net> <subnet> <name>`
    Toeprint(Toeprint),
}

/// A pin of a component as placed on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Toeprint {
    pub pin_num: u32,
    pub location: Point,
    pub rotation: Decimal,
    pub mirror: Mirror,
    pub net_num: u32,
    pub subnet_num: u32,
    pub name: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: Value,
    pub part_name: Value,
    pub package_ref: u32,
    pub location: Point,
    pub rotation: Decimal,
    pub mirror: Mirror,
    pub attributes: Attributes,
    pub properties: BTreeMap<String, String>,
    pub toeprints: Vec<Toeprint>,
}

/// Key of a component in a components file: the number from a `CMP <n>`
/// section name, or the whole section name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentId {
    Index(u32),
    Name(String),
}

impl ComponentId {
    pub fn from_section_name(name: &str) -> Self {
        name.strip_prefix("CMP")
            .and_then(|rest| rest.trim().parse().ok())
            .map_or_else(|| ComponentId::Name(name.to_string()), ComponentId::Index)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentId::Index(i) => write!(f, "CMP {i}"),
            ComponentId::Name(name) => f.write_str(name),
        }
    }
}

fn parse_property(caps: &Captures<'_>) -> Result<ComponentRecord> {
    Ok(ComponentRecord::Property {
        key: caps[1].to_string(),
        value: caps[2].to_string(),
    })
}

fn parse_toeprint(caps: &Captures<'_>) -> Result<ComponentRecord> {
    Ok(ComponentRecord::Toeprint(Toeprint {
        pin_num: parse_int(&caps[1])?,
        location: Point::parse(&caps[2], &caps[3])?,
        rotation: parse_decimal(&caps[4])?,
        mirror: caps[5].parse()?,
        net_num: parse_int(&caps[6])?,
        subnet_num: parse_int(&caps[7])?,
        name: try_parse_number(&caps[8]),
    }))
}

fn parse_component(caps: &Captures<'_>) -> Result<ComponentRecord> {
    Ok(ComponentRecord::Component {
        package_ref: parse_int(&caps[1])?,
        location: Point::parse(&caps[2], &caps[3])?,
        rotation: parse_decimal(&caps[4])?,
        mirror: caps[5].parse()?,
        name: try_parse_number(caps[6].trim()),
        part_name: try_parse_number(caps[7].trim()),
        attributes: parse_optional_attributes(caps.get(8).map(|m| m.as_str()))?,
    })
}

static COMPONENT_OPTIONS: Lazy<Vec<DecodeOption<ComponentRecord>>> = Lazy::new(|| {
    let num = NUMBER;
    vec![
        DecodeOption::new(r"^PRP\s+(\S+)\s+'([^']+)'\s*$", parse_property),
        DecodeOption::new(
            &format!(
                r"^TOP\s+(\d+)\s+{num}\s+{num}\s+{num}\s+(N|M|X|Y|XY)\s+(\d+)\s+(\d+)\s+(\S+)\s*$"
            ),
            parse_toeprint,
        ),
        DecodeOption::new(
            &format!(
                r"^CMP\s+(\d+)\s+{num}\s+{num}\s+{num}\s+(N|M|X|Y|XY)\s+(\S+)\s+(\S+)\s*(;\s*.+?)?$"
            ),
            parse_component,
        ),
    ]
    .into_iter()
    .collect::<Result<_>>()
    .expect("valid component patterns")
});

/// Decoder options for `PRP`, `TOP` and `CMP` records.
pub fn component_decoder_options() -> &'static [DecodeOption<ComponentRecord>] {
    &COMPONENT_OPTIONS
}

/// Merges the records of one component section. The section must hold
/// exactly one `CMP` record; later properties override earlier ones.
pub fn consolidate_component_records<I>(records: I) -> Result<Component>
where
    I: IntoIterator<Item = ComponentRecord>,
{
    let mut header = None;
    let mut properties = BTreeMap::new();
    let mut toeprints = Vec::new();

    for record in records {
        match record {
            cmp @ ComponentRecord::Component { .. } => {
                if header.is_some() {
                    return Err(Error::Structure(format!(
                        "multiple CMP records in section, last one: {cmp:?}"
                    )));
                }
                header = Some(cmp);
            }
            ComponentRecord::Property { key, value } => {
                properties.insert(key, value);
            }
            ComponentRecord::Toeprint(toeprint) => toeprints.push(toeprint),
        }
    }

    let Some(ComponentRecord::Component {
        package_ref,
        location,
        rotation,
        mirror,
        name,
        part_name,
        attributes,
    }) = header
    else {
        return Err(Error::Structure("no CMP record in section".to_string()));
    };

    Ok(Component {
        name,
        part_name,
        package_ref,
        location,
        rotation,
        mirror,
        attributes,
        properties,
        toeprints,
    })
}

/// Parses every named section of a components file. The unnamed header
/// section (units, ids) is skipped.
pub fn parse_components(records: &LineRecords) -> Result<BTreeMap<ComponentId, Component>> {
    records
        .sections()
        .map(|(name, lines)| -> Result<(ComponentId, Component)> {
            trace!("consolidating component section {name:?}");
            let tags = decode_tags(lines, component_decoder_options())?;
            Ok((
                ComponentId::from_section_name(name),
                consolidate_component_records(tags)?,
            ))
        })
        .collect()
}

/// Indexes components by their reference designator.
pub fn map_components_by_name<'a, I>(components: I) -> HashMap<String, &'a Component>
where
    I: IntoIterator<Item = &'a Component>,
{
    components
        .into_iter()
        .map(|component| (component.name.to_string(), component))
        .collect()
}

/// The components of both board sides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub top: BTreeMap<ComponentId, Component>,
    pub bottom: BTreeMap<ComponentId, Component>,
}

impl Components {
    /// All components, top side first.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.top.values().chain(self.bottom.values())
    }

    pub fn len(&self) -> usize {
        self.top.len() + self.bottom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.bottom.is_empty()
    }
}
