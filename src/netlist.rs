// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/netlist.rs - Parser for ODB++ netlist files.
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
 * # `netlist` Module
 *
 * Parses `steps/<step>/netlists/cadnet/netlist`: the `H optimize` header
 * flag, the `Nets names` table and the `Netlist points` records.
 *
 * ## Usage Example
 *
 * ```no_run
 * use odbpp::linerecord::LineRecords;
 * use odbpp::netlist::Netlist;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let records = LineRecords::from_filename("job/steps/pcb/netlists/cadnet/netlist")?;
 *     let netlist = Netlist::from_linerecords(&records)?;
 *     for (net, points) in netlist.by_net() {
 *         println!("{net}: {} point(s)", points.len());
 *     }
 *     Ok(())
 * }
 * ```
 */

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};
use rust_decimal::Decimal;

use crate::decoder::{DecodeOption, decode_tags};
use crate::error::{Error, Result};
use crate::linerecord::LineRecords;
use crate::structures::{NUMBER, Point, parse_decimal, parse_int, unknown};

static H_OPTIMIZE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^H\s+optimize\s+([YN])\s*$")
        .case_insensitive(true)
        .build()
        .expect("valid optimize header pattern")
});

/// The net a point belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NetId {
    /// Net number; `-1` marks tooling holes.
    Number(i64),
    /// `$NONE$`
    Unassigned,
    /// Net number replaced by its name.
    Name(String),
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetId::Number(n) => write!(f, "{n}"),
            NetId::Unassigned => f.write_str("$NONE$"),
            NetId::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetSide {
    Top,
    Bottom,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetPointLocation {
    EndPoint,
    MidPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetPointExposure {
    SolderMaskExposed,
    SolderMaskCovered,
    SolderMaskCoveredPrimaryTop,
    SolderMaskCoveredSecondaryBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestpointTestSide {
    ComponentSide,
    SolderSide,
    BothSides,
    AnyOneSide,
    #[default]
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaggeringParameters {
    pub location: Point,
    pub radius: Decimal,
}

/// Flags trailing a netlist point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetlistPointType {
    pub is_via: bool,
    pub is_fiducial: bool,
    pub is_testpoint: bool,
    pub force_midpoint_testability: bool,
    pub extension: Option<String>,
    pub testpoint_test_side: TestpointTestSide,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetlistPoint {
    pub net: NetId,
    pub radius: Decimal,
    pub location: Point,
    pub side: NetSide,
    /// Width and height, only given for non-round points (radius 0).
    pub size: Option<Point>,
    pub point_location: NetPointLocation,
    pub exposure: NetPointExposure,
    pub staggered: Option<StaggeringParameters>,
    pub point_type: NetlistPointType,
}

fn net_side(s: &str) -> Result<NetSide> {
    match s {
        "T" => Ok(NetSide::Top),
        "D" => Ok(NetSide::Bottom),
        "B" => Ok(NetSide::Both),
        _ => Err(unknown("net side", s)),
    }
}

fn point_location(s: &str) -> Result<NetPointLocation> {
    match s {
        "e" => Ok(NetPointLocation::EndPoint),
        "m" => Ok(NetPointLocation::MidPoint),
        _ => Err(unknown("net point location", s)),
    }
}

fn exposure(s: &str) -> Result<NetPointExposure> {
    match s {
        "e" => Ok(NetPointExposure::SolderMaskExposed),
        "c" => Ok(NetPointExposure::SolderMaskCovered),
        "p" => Ok(NetPointExposure::SolderMaskCoveredPrimaryTop),
        "s" => Ok(NetPointExposure::SolderMaskCoveredSecondaryBottom),
        _ => Err(unknown("net point exposure", s)),
    }
}

fn test_side(s: Option<&str>) -> Result<TestpointTestSide> {
    match s {
        Some("c") => Ok(TestpointTestSide::ComponentSide),
        Some("s") => Ok(TestpointTestSide::SolderSide),
        Some("b") => Ok(TestpointTestSide::BothSides),
        Some("a") => Ok(TestpointTestSide::AnyOneSide),
        Some("n") | None => Ok(TestpointTestSide::Undefined),
        Some(other) => Err(unknown("test side", other)),
    }
}

/// Flags are set by their lowercase letter only.
fn flag(caps: &Captures<'_>, i: usize) -> bool {
    caps.get(i)
        .is_some_and(|m| m.as_str().chars().all(|c| c.is_ascii_lowercase()))
}

fn parse_netlist_point(caps: &Captures<'_>) -> Result<NetlistPoint> {
    let net = match &caps[1] {
        "$NONE$" => NetId::Unassigned,
        id => NetId::Number(parse_int(id)?),
    };

    let size = match (caps.get(6), caps.get(7)) {
        (Some(w), Some(h)) => Some(Point::parse(w.as_str(), h.as_str())?),
        _ => None,
    };

    let staggered = match (caps.get(10), caps.get(11), caps.get(12)) {
        (Some(x), Some(y), Some(r)) => Some(StaggeringParameters {
            location: Point::parse(x.as_str(), y.as_str())?,
            radius: parse_decimal(r.as_str())?,
        }),
        _ => None,
    };

    Ok(NetlistPoint {
        net,
        radius: parse_decimal(&caps[2])?,
        location: Point::parse(&caps[3], &caps[4])?,
        side: net_side(&caps[5])?,
        size,
        point_location: point_location(&caps[8])?,
        exposure: exposure(&caps[9])?,
        staggered,
        point_type: NetlistPointType {
            is_via: flag(caps, 13),
            is_fiducial: flag(caps, 14),
            is_testpoint: flag(caps, 15),
            force_midpoint_testability: flag(caps, 16),
            extension: caps.get(17).map(|m| m.as_str().to_string()),
            testpoint_test_side: test_side(caps.get(18).map(|m| m.as_str()))?,
        },
    })
}

static NETLIST_OPTIONS: Lazy<Vec<DecodeOption<NetlistPoint>>> = Lazy::new(|| {
    let num = NUMBER;
    let pattern = format!(
        concat!(
            r"^(-?\d+|\$NONE\$)\s+{num}\s+{num}\s+{num}\s+([TDB])",
            r"(?:\s+{num}\s+{num})?",
            r"\s+([em])\s+([ecps])",
            r"(?:\s+staggered\s+{num}\s+{num}\s+{num})?",
            r"(?:\s+([vV]))?(?:\s+([fF]))?(?:\s+([tT]))?(?:\s+([mM]))?",
            r"(?:\s+eXtended\s+(\S+))?",
            r"(?:\s+([csban]))?",
        ),
        num = num
    );
    vec![DecodeOption::new(&pattern, parse_netlist_point)]
        .into_iter()
        .collect::<Result<_>>()
        .expect("valid netlist point pattern")
});

/// Decoder options for netlist point records.
pub fn netlist_decoder_options() -> &'static [DecodeOption<NetlistPoint>] {
    &NETLIST_OPTIONS
}

/// The `H optimize` flag of a netlist, if present in the header section.
pub fn netlist_optimization(records: &LineRecords) -> Option<bool> {
    records
        .header()
        .iter()
        .find_map(|line| H_OPTIMIZE.captures(line))
        .map(|caps| caps[1].eq_ignore_ascii_case("Y"))
}

/// Whether the netlist was produced by the netlist optimizer. A netlist
/// without an `H optimize` line is an error.
pub fn is_netlist_optimized(records: &LineRecords) -> Result<bool> {
    netlist_optimization(records).ok_or_else(|| Error::MissingKey("H optimize".to_string()))
}

/// Parses the `Nets names` section (`$<id> <name>`).
pub fn parse_net_names(records: &LineRecords) -> Result<BTreeMap<i64, String>> {
    records
        .section("Nets names")
        .iter()
        .map(|line| -> Result<(i64, String)> {
            let (id, name) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            // Drop the `$` sigil.
            let id = id.get(1..).unwrap_or_default();
            Ok((parse_int(id)?, name.to_string()))
        })
        .collect()
}

/// Replaces a point's net number by the net's name, if it has one.
pub fn assign_net_name(names: &BTreeMap<i64, String>, mut point: NetlistPoint) -> NetlistPoint {
    if let NetId::Number(id) = point.net {
        if let Some(name) = names.get(&id) {
            point.net = NetId::Name(name.clone());
        }
    }
    point
}

/// Groups points by net, keeping file order within each net.
pub fn group_by_net<'a, I>(points: I) -> BTreeMap<&'a NetId, Vec<&'a NetlistPoint>>
where
    I: IntoIterator<Item = &'a NetlistPoint>,
{
    let mut nets: BTreeMap<&NetId, Vec<&NetlistPoint>> = BTreeMap::new();
    for point in points {
        nets.entry(&point.net).or_default().push(point);
    }
    nets
}

/// A parsed netlist with net names already assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Netlist {
    pub optimized: Option<bool>,
    pub names: BTreeMap<i64, String>,
    pub points: Vec<NetlistPoint>,
}

impl Netlist {
    pub fn from_linerecords(records: &LineRecords) -> Result<Self> {
        let names = parse_net_names(records)?;
        let points = decode_tags(records.section("Netlist points"), netlist_decoder_options())?
            .into_iter()
            .map(|point| assign_net_name(&names, point))
            .collect();

        Ok(Self {
            optimized: netlist_optimization(records),
            names,
            points,
        })
    }

    pub fn by_net(&self) -> BTreeMap<&NetId, Vec<&NetlistPoint>> {
        group_by_net(&self.points)
    }
}
