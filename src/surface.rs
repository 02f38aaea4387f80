// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/surface.rs - Surface grammar for ODB++ line records.
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

use once_cell::sync::Lazy;
use regex::Captures;

use crate::attributes::{Attributes, parse_optional_attributes};
use crate::decoder::DecodeOption;
use crate::error::{Error, Result};
use crate::polygon::{
    Contour, ContourKind, ContourNode, ContourTag, Polygon, polygon_decoder_options,
    polygon_treeify_rules,
};
use crate::structures::{Polarity, parse_int};
use crate::treeifier::{NestingRule, Node};

/// A filled area bounded by island and hole polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub polarity: Polarity,
    pub dcode: u32,
    pub polygons: Vec<Polygon>,
    pub attributes: Attributes,
}

fn parse_surface_start(caps: &Captures<'_>) -> Result<ContourTag> {
    Ok(ContourTag::SurfaceBegin {
        polarity: caps[1].parse()?,
        dcode: parse_int(&caps[2])?,
        attributes: parse_optional_attributes(caps.get(3).map(|m| m.as_str()))?,
    })
}

fn parse_surface_end(_: &Captures<'_>) -> Result<ContourTag> {
    Ok(ContourTag::SurfaceEnd)
}

static SURFACE_OPTIONS: Lazy<Vec<DecodeOption<ContourTag>>> = Lazy::new(|| {
    vec![
        DecodeOption::new(r"^S\s+([PN])\s+(\d+)\s*(;\s*.+?)?$", parse_surface_start),
        DecodeOption::new(r"^SE\s*$", parse_surface_end),
    ]
    .into_iter()
    .collect::<Result<_>>()
    .expect("valid surface patterns")
});

static CONTOUR_OPTIONS: Lazy<Vec<DecodeOption<ContourTag>>> = Lazy::new(|| {
    surface_decoder_options()
        .iter()
        .chain(polygon_decoder_options())
        .cloned()
        .collect()
});

/// Decoder options for `S` and `SE` records.
pub fn surface_decoder_options() -> &'static [DecodeOption<ContourTag>] {
    &SURFACE_OPTIONS
}

/// Surface options followed by polygon options, for files where surfaces
/// and their contours are interleaved.
pub fn contour_decoder_options() -> &'static [DecodeOption<ContourTag>] {
    &CONTOUR_OPTIONS
}

/// Builds a [Surface] from an `S ... SE` scope. Only the polygons reduced
/// inside the scope are kept, in order.
fn reduce_surface(scope: Vec<ContourNode>) -> Result<Contour> {
    let mut nodes = scope.into_iter();
    let Some(Node::Tag(ContourTag::SurfaceBegin {
        polarity,
        dcode,
        attributes,
    })) = nodes.next()
    else {
        return Err(Error::Structure(
            "surface scope does not start with an S record".to_string(),
        ));
    };

    let polygons = nodes
        .filter_map(|node| match node {
            Node::Reduced(Contour::Polygon(polygon)) => Some(polygon),
            _ => None,
        })
        .collect();

    Ok(Contour::Surface(Surface {
        polarity,
        dcode,
        polygons,
        attributes,
    }))
}

/// The `S`/`SE` nesting rule.
pub fn surface_treeify_rules() -> Vec<NestingRule<ContourTag, Contour>> {
    vec![NestingRule::new(
        ContourKind::SurfaceBegin,
        ContourKind::SurfaceEnd,
        reduce_surface,
    )]
}

/// Surface rule followed by polygon rule.
pub fn contour_treeify_rules() -> Vec<NestingRule<ContourTag, Contour>> {
    let mut rules = surface_treeify_rules();
    rules.extend(polygon_treeify_rules());
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::attributes::AttributeValue;
    use crate::decoder::{decode_line, decode_tags};
    use crate::polygon::{PolygonStep, PolygonType};
    use crate::structures::Point;
    use crate::treeifier::treeify;

    fn begin(polarity: Polarity, dcode: u32, attributes: Attributes) -> Option<ContourTag> {
        Some(ContourTag::SurfaceBegin {
            polarity,
            dcode,
            attributes,
        })
    }

    fn decode(line: &str) -> Option<ContourTag> {
        decode_line(line, surface_decoder_options()).unwrap()
    }

    #[test]
    fn parse_surface_begin() {
        let five = Attributes::from([(3, AttributeValue::Number(5))]);
        assert_eq!(decode("S P 0"), begin(Polarity::Positive, 0, Attributes::new()));
        assert_eq!(decode("S N 0"), begin(Polarity::Negative, 0, Attributes::new()));
        assert_eq!(decode("S P 1"), begin(Polarity::Positive, 1, Attributes::new()));
        assert_eq!(decode("S P 1;3=5"), begin(Polarity::Positive, 1, five.clone()));
        assert_eq!(decode("S P 1 ; 3=5"), begin(Polarity::Positive, 1, five));
        assert_eq!(decode("SB P 1 2"), None);
        assert_eq!(decode("SE"), Some(ContourTag::SurfaceEnd));
    }

    #[test]
    fn rectangle_surface() {
        let lines = [
            "S P 0",
            "OB 0 0 I",
            "OS 0 10",
            "OS 20 10",
            "OS 20 0",
            "OS 0 0",
            "OE",
            "SE",
        ];
        let tags = decode_tags(lines, contour_decoder_options()).unwrap();
        assert_eq!(tags.len(), lines.len());

        let out = treeify(tags, &contour_treeify_rules()).unwrap();
        assert_eq!(out.len(), 1);
        let Some(Contour::Surface(surface)) = out[0].as_reduced() else {
            panic!("expected a surface, got {:?}", out[0]);
        };

        assert_eq!(surface.polarity, Polarity::Positive);
        assert_eq!(surface.polygons.len(), 1);
        let polygon = &surface.polygons[0];
        assert_eq!(polygon.polygon_type, PolygonType::Island);
        assert_eq!(polygon.steps.len(), 4);

        let ends: Vec<Point> = polygon.steps.iter().map(PolygonStep::end).collect();
        let expected: Vec<Point> = [("0", "10"), ("20", "10"), ("20", "0"), ("0", "0")]
            .iter()
            .map(|(x, y)| Point::parse(x, y).unwrap())
            .collect();
        assert_eq!(ends, expected);
    }

    #[test]
    fn polygon_order_is_kept() {
        let lines = ["S N 2", "OB 0 0 I", "OS 1 1", "OE", "OB 5 5 H", "OS 6 6", "OE", "SE"];
        let tags = decode_tags(lines, contour_decoder_options()).unwrap();
        let out = treeify(tags, &contour_treeify_rules()).unwrap();
        let Some(Contour::Surface(surface)) = out[0].as_reduced() else {
            panic!("expected a surface");
        };
        let types: Vec<_> = surface.polygons.iter().map(|p| p.polygon_type).collect();
        assert_eq!(types, [PolygonType::Island, PolygonType::Hole]);
    }

    #[test]
    fn truncated_surface_is_dropped() {
        let lines = ["S P 0", "OB 0 0 I", "OS 1 1", "OE"];
        let tags = decode_tags(lines, contour_decoder_options()).unwrap();
        assert!(treeify(tags, &contour_treeify_rules()).unwrap().is_empty());
    }
}
