// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/features.rs - Layer feature parser for ODB++ line records.
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
 * # `features` Module
 *
 * Parses the `Layer features` section of a layer's `features` file. Pads,
 * lines and arcs are single-line records; surfaces span several lines and
 * are rebuilt by running the contour grammar over the same section, which
 * simply skips the single-line records.
 *
 * ## Usage Example
 *
 * ```no_run
 * use odbpp::features::LayerFeatures;
 * use odbpp::linerecord::LineRecords;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let records = LineRecords::from_filename("job/steps/pcb/layers/top/features")?;
 *     let features = LayerFeatures::from_linerecords(&records)?;
 *     println!("{} features, {} surfaces", features.features.len(), features.surfaces.len());
 *     Ok(())
 * }
 * ```
 */

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Captures;
use rust_decimal::Decimal;

use crate::attributes::{AttributeValue, Attributes, parse_optional_attributes};
use crate::decoder::{DecodeOption, decode_tags};
use crate::error::{Error, Result};
use crate::linerecord::LineRecords;
use crate::polygon::Contour;
use crate::structures::{
    Mirror, NUMBER, Point, Polarity, SymbolReference, parse_decimal, parse_int, unknown,
};
use crate::surface::{Surface, contour_decoder_options, contour_treeify_rules};
use crate::symbols::StandardSymbol;
use crate::treeifier::treeify;

/// A pad (flash) feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    pub center: Point,
    pub symbol: SymbolReference,
    pub polarity: Polarity,
    pub dcode: u32,
    pub mirror: Mirror,
    /// Rotation in degrees.
    pub angle: Decimal,
    pub attributes: Attributes,
}

/// A line (draw) feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
    pub symbol: SymbolReference,
    pub polarity: Polarity,
    pub dcode: u32,
    pub attributes: Attributes,
}

/// An arc (draw) feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcFeature {
    pub start: Point,
    pub end: Point,
    pub center: Point,
    pub symbol: SymbolReference,
    pub polarity: Polarity,
    pub dcode: u32,
    pub clockwise: bool,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Pad(Pad),
    Line(Line),
    Arc(ArcFeature),
}

/// Converts a legacy orientation (0-7) to the `8|9 <angle>` form.
fn legacy_orientation(code: u8) -> Result<(u8, Decimal)> {
    if code > 7 {
        return Err(unknown("orientation", &code.to_string()));
    }
    let mirror_code = if code < 4 { 8 } else { 9 };
    Ok((mirror_code, Decimal::from(90 * u32::from(code % 4))))
}

fn orientation_mirror(code: u8) -> Result<Mirror> {
    match code {
        8 => Ok(Mirror::No),
        9 => Ok(Mirror::MirrorX),
        _ => Err(unknown("orientation", &code.to_string())),
    }
}

fn parse_pad(caps: &Captures<'_>) -> Result<Feature> {
    // `<sym>` or `-1 <sym> <resize factor>`
    let aperture: Vec<&str> = caps[3].split_whitespace().collect();
    let symbol = match aperture.as_slice() {
        [sym] => SymbolReference::new(parse_int(sym)?),
        [_, sym, resize] => SymbolReference::resized(parse_int(sym)?, parse_decimal(resize)?),
        _ => return Err(unknown("aperture definition", &caps[3])),
    };

    // `<legacy code>` or `8|9 <angle>`
    let orientation: Vec<&str> = caps[6].split_whitespace().collect();
    let (code, angle) = match orientation.as_slice() {
        [code] => legacy_orientation(parse_int(code)?)?,
        [code, angle] => (parse_int(code)?, parse_decimal(angle)?),
        _ => return Err(unknown("orientation", &caps[6])),
    };

    Ok(Feature::Pad(Pad {
        center: Point::parse(&caps[1], &caps[2])?,
        symbol,
        polarity: caps[4].parse()?,
        dcode: parse_int(&caps[5])?,
        mirror: orientation_mirror(code)?,
        angle,
        attributes: parse_optional_attributes(caps.get(7).map(|m| m.as_str()))?,
    }))
}

fn parse_line(caps: &Captures<'_>) -> Result<Feature> {
    Ok(Feature::Line(Line {
        start: Point::parse(&caps[1], &caps[2])?,
        end: Point::parse(&caps[3], &caps[4])?,
        symbol: SymbolReference::new(parse_int(&caps[5])?),
        polarity: caps[6].parse()?,
        dcode: parse_int(&caps[7])?,
        attributes: parse_optional_attributes(caps.get(8).map(|m| m.as_str()))?,
    }))
}

fn parse_arc(caps: &Captures<'_>) -> Result<Feature> {
    Ok(Feature::Arc(ArcFeature {
        start: Point::parse(&caps[1], &caps[2])?,
        end: Point::parse(&caps[3], &caps[4])?,
        center: Point::parse(&caps[5], &caps[6])?,
        symbol: SymbolReference::new(parse_int(&caps[7])?),
        polarity: caps[8].parse()?,
        dcode: parse_int(&caps[9])?,
        clockwise: &caps[10] == "Y",
        attributes: parse_optional_attributes(caps.get(11).map(|m| m.as_str()))?,
    }))
}

static FEATURE_OPTIONS: Lazy<Vec<DecodeOption<Feature>>> = Lazy::new(|| {
    let num = NUMBER;
    let attrs = r"\s*(;\s*.+?)?$";
    vec![
        DecodeOption::new(
            &format!(
                r"^P\s+{num}\s+{num}\s+(\d+|-1\s+\d+\s+-?[\.\d]+)\s+([PN])\s+(\d+)\s+([0-7]|[89]\s+-?[\.\d]+){attrs}"
            ),
            parse_pad,
        ),
        DecodeOption::new(
            &format!(r"^L\s+{num}\s+{num}\s+{num}\s+{num}\s+(\d+)\s+([PN])\s+(\d+){attrs}"),
            parse_line,
        ),
        DecodeOption::new(
            &format!(
                r"^A\s+{num}\s+{num}\s+{num}\s+{num}\s+{num}\s+{num}\s+(\d+)\s+([PN])\s+(\d+)\s+([YN]){attrs}"
            ),
            parse_arc,
        ),
    ]
    .into_iter()
    .collect::<Result<_>>()
    .expect("valid feature patterns")
});

/// Decoder options for `P`, `L` and `A` records.
pub fn feature_decoder_options() -> &'static [DecodeOption<Feature>] {
    &FEATURE_OPTIONS
}

/// Decodes the single-line features of a `Layer features` section.
pub fn decode_features(records: &LineRecords) -> Result<Vec<Feature>> {
    decode_tags(records.section("Layer features"), feature_decoder_options())
}

/// Rebuilds the surfaces of a `Layer features` section.
pub fn decode_surfaces(records: &LineRecords) -> Result<Vec<Surface>> {
    let tags = decode_tags(records.section("Layer features"), contour_decoder_options())?;
    Ok(treeify(tags, &contour_treeify_rules())?
        .into_iter()
        .filter_map(|node| match node.into_reduced() {
            Some(Contour::Surface(surface)) => Some(surface),
            _ => None,
        })
        .collect())
}

/// Index tables shared by all features of a layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureInfo {
    /// `$<n> <symbol name>`
    pub symbol_names: BTreeMap<u32, String>,
    /// `@<n> <attribute name>`
    pub attribute_names: BTreeMap<u32, String>,
    /// `&<n> <text>`
    pub strings: BTreeMap<u32, String>,
}

fn parse_feature_map(lines: &[String]) -> Result<BTreeMap<u32, String>> {
    let mut map = BTreeMap::new();
    for line in lines {
        // The leading `$`, `@` or `&` is implied by the section.
        let (key, value) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        let index = key.get(1..).unwrap_or_default();
        map.insert(parse_int(index)?, value.to_string());
    }
    Ok(map)
}

impl FeatureInfo {
    pub fn from_linerecords(records: &LineRecords) -> Result<Self> {
        Ok(Self {
            symbol_names: parse_feature_map(records.section("Feature symbol names"))?,
            attribute_names: parse_feature_map(records.section("Feature attribute names"))?,
            strings: parse_feature_map(records.section("Feature attribute text strings"))?,
        })
    }

    /// Replaces attribute indices by attribute names. Indices without a
    /// name are an error.
    pub fn apply(&self, attributes: &Attributes) -> Result<BTreeMap<String, AttributeValue>> {
        attributes
            .iter()
            .map(|(index, value)| {
                self.attribute_names
                    .get(index)
                    .map(|name| (name.clone(), *value))
                    .ok_or_else(|| Error::MissingKey(format!("@{index}")))
            })
            .collect()
    }

    /// The name a feature's symbol reference points to.
    pub fn symbol_name(&self, symbol: &SymbolReference) -> Option<&str> {
        self.symbol_names.get(&symbol.symbol).map(String::as_str)
    }

    /// The standard symbol a feature's symbol reference points to, if the
    /// name is one of the standard forms.
    pub fn standard_symbol(&self, symbol: &SymbolReference) -> Result<Option<StandardSymbol>> {
        match self.symbol_name(symbol) {
            Some(name) => StandardSymbol::parse(name),
            None => Ok(None),
        }
    }
}

/// Everything drawn on one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerFeatures {
    pub info: FeatureInfo,
    pub features: Vec<Feature>,
    pub surfaces: Vec<Surface>,
}

impl LayerFeatures {
    pub fn from_linerecords(records: &LineRecords) -> Result<Self> {
        Ok(Self {
            info: FeatureInfo::from_linerecords(records)?,
            features: decode_features(records)?,
            surfaces: decode_surfaces(records)?,
        })
    }
}
