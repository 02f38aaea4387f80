// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/polygon.rs - Contour (polygon) grammar for ODB++ line records.
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
 * # `polygon` Module
 *
 * Contours are written as a begin record, one record per step and an end
 * record:
 *
 * ```text
 * OB -38.104 -0.6351 I
 * OS -38.104 19.3649
 * OC -18.104 19.3649 -28.104 19.3649 Y
 * OE
 * ```
 *
 * Contours only appear inside surfaces, so the tag type [ContourTag] and
 * the reduced type [Contour] cover both grammars; see [crate::surface].
 */

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use once_cell::sync::Lazy;
use regex::Captures;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::attributes::Attributes;
use crate::decoder::DecodeOption;
use crate::error::{Error, Result};
use crate::structures::{NUMBER, Point, Polarity, unknown};
use crate::surface::Surface;
use crate::treeifier::{NestingRule, Node, Tag};

/// Tags of the surface and contour grammars.
#[derive(Debug, Clone, PartialEq)]
pub enum ContourTag {
    /// `S P|N <dcode> [;attributes]`
    SurfaceBegin {
        polarity: Polarity,
        dcode: u32,
        attributes: Attributes,
    },
    /// `SE`
    SurfaceEnd,
    /// `OB <x> <y> I|H`
    PolygonBegin {
        start: Point,
        polygon_type: PolygonType,
    },
    /// `OS <x> <y>`
    Segment { end: Point },
    /// `OC <xe> <ye> <xc> <yc> Y|N`
    Arc {
        end: Point,
        center: Point,
        direction: CircleDirection,
    },
    /// `OE`
    PolygonEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    SurfaceBegin,
    SurfaceEnd,
    PolygonBegin,
    Segment,
    Arc,
    PolygonEnd,
}

impl Tag for ContourTag {
    type Kind = ContourKind;

    fn kind(&self) -> ContourKind {
        match self {
            ContourTag::SurfaceBegin { .. } => ContourKind::SurfaceBegin,
            ContourTag::SurfaceEnd => ContourKind::SurfaceEnd,
            ContourTag::PolygonBegin { .. } => ContourKind::PolygonBegin,
            ContourTag::Segment { .. } => ContourKind::Segment,
            ContourTag::Arc { .. } => ContourKind::Arc,
            ContourTag::PolygonEnd => ContourKind::PolygonEnd,
        }
    }
}

/// Objects built from closed contour and surface scopes.
#[derive(Debug, Clone, PartialEq)]
pub enum Contour {
    Polygon(Polygon),
    Surface(Surface),
}

pub type ContourNode = Node<ContourTag, Contour>;

/// Whether a polygon adds area or cuts it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonType {
    Island,
    Hole,
}

/// Direction of an arc step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircleDirection {
    Clockwise,
    CounterClockwise,
}

/// A straight polygon step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A circular polygon step. Identical start and end describe a full circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    pub start: Point,
    pub end: Point,
    pub center: Point,
    pub direction: CircleDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonStep {
    Segment(Segment),
    Arc(Arc),
}

/// A closed contour.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub polygon_type: PolygonType,
    pub steps: Vec<PolygonStep>,
}

impl Segment {
    pub fn min(&self) -> Point {
        self.start.min(self.end)
    }

    pub fn max(&self) -> Point {
        self.start.max(self.end)
    }
}

impl Arc {
    /// Lower-left corner of the arc's bounding box.
    pub fn min(&self) -> Point {
        self.bounds().0
    }

    /// Upper-right corner of the arc's bounding box.
    pub fn max(&self) -> Point {
        self.bounds().1
    }

    /// Falls back to the box spanned by the endpoints when the extent of
    /// the circle does not fit in a [Decimal].
    fn bounds(&self) -> (Point, Point) {
        let mut lo = self.start.min(self.end);
        let mut hi = self.start.max(self.end);

        let (Some(radius), Some(from), Some(to)) = (
            self.radius(),
            self.angle_of(self.start),
            self.angle_of(self.end),
        ) else {
            return (lo, hi);
        };

        // Walk counter-clockwise from `from` to `to`.
        let (from, to) = match self.direction {
            CircleDirection::CounterClockwise => (from, to),
            CircleDirection::Clockwise => (to, from),
        };
        let mut span = (to - from).rem_euclid(TAU);
        if span == 0.0 {
            span = TAU;
        }

        let Point { x, y } = self.center;
        let extremes = [
            (0.0, x.checked_add(radius).map(|x| Point::new(x, y))),
            (FRAC_PI_2, y.checked_add(radius).map(|y| Point::new(x, y))),
            (PI, x.checked_sub(radius).map(|x| Point::new(x, y))),
            (3.0 * FRAC_PI_2, y.checked_sub(radius).map(|y| Point::new(x, y))),
        ];
        for (theta, point) in extremes {
            let Some(point) = point else {
                return (self.start.min(self.end), self.start.max(self.end));
            };
            if (theta - from).rem_euclid(TAU) <= span {
                lo = lo.min(point);
                hi = hi.max(point);
            }
        }
        (lo, hi)
    }

    /// Offset of `point` from the center, as floats.
    fn offset(&self, point: Point) -> Option<(f64, f64)> {
        let dx = point.x.checked_sub(self.center.x)?;
        let dy = point.y.checked_sub(self.center.y)?;
        Some((dx.to_f64()?, dy.to_f64()?))
    }

    fn angle_of(&self, point: Point) -> Option<f64> {
        let (dx, dy) = self.offset(point)?;
        Some(dy.atan2(dx))
    }

    fn radius(&self) -> Option<Decimal> {
        let (dx, dy) = self.offset(self.start)?;
        Decimal::from_f64(dx.hypot(dy))
    }
}

impl PolygonStep {
    pub fn start(&self) -> Point {
        match self {
            PolygonStep::Segment(s) => s.start,
            PolygonStep::Arc(a) => a.start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            PolygonStep::Segment(s) => s.end,
            PolygonStep::Arc(a) => a.end,
        }
    }

    pub fn min(&self) -> Point {
        match self {
            PolygonStep::Segment(s) => s.min(),
            PolygonStep::Arc(a) => a.min(),
        }
    }

    pub fn max(&self) -> Point {
        match self {
            PolygonStep::Segment(s) => s.max(),
            PolygonStep::Arc(a) => a.max(),
        }
    }
}

impl Polygon {
    /// Minimum x and y over all steps, `None` for a polygon without steps.
    pub fn min(&self) -> Option<Point> {
        self.steps.iter().map(PolygonStep::min).reduce(Point::min)
    }

    /// Maximum x and y over all steps, `None` for a polygon without steps.
    pub fn max(&self) -> Option<Point> {
        self.steps.iter().map(PolygonStep::max).reduce(Point::max)
    }
}

fn parse_polygon_type(s: &str) -> Result<PolygonType> {
    match s {
        "I" => Ok(PolygonType::Island),
        "H" => Ok(PolygonType::Hole),
        _ => Err(unknown("polygon type", s)),
    }
}

fn parse_circle_direction(s: &str) -> Result<CircleDirection> {
    match s {
        "Y" => Ok(CircleDirection::Clockwise),
        "N" => Ok(CircleDirection::CounterClockwise),
        _ => Err(unknown("circle direction", s)),
    }
}

fn parse_ob(caps: &Captures<'_>) -> Result<ContourTag> {
    Ok(ContourTag::PolygonBegin {
        start: Point::parse(&caps[1], &caps[2])?,
        polygon_type: parse_polygon_type(&caps[3])?,
    })
}

fn parse_os(caps: &Captures<'_>) -> Result<ContourTag> {
    Ok(ContourTag::Segment {
        end: Point::parse(&caps[1], &caps[2])?,
    })
}

fn parse_oc(caps: &Captures<'_>) -> Result<ContourTag> {
    Ok(ContourTag::Arc {
        end: Point::parse(&caps[1], &caps[2])?,
        center: Point::parse(&caps[3], &caps[4])?,
        direction: parse_circle_direction(&caps[5])?,
    })
}

fn parse_oe(_: &Captures<'_>) -> Result<ContourTag> {
    Ok(ContourTag::PolygonEnd)
}

static POLYGON_OPTIONS: Lazy<Vec<DecodeOption<ContourTag>>> = Lazy::new(|| {
    let num = NUMBER;
    vec![
        DecodeOption::new(&format!(r"^OB\s+{num}\s+{num}\s+([IH])"), parse_ob),
        DecodeOption::new(&format!(r"^OS\s+{num}\s+{num}"), parse_os),
        DecodeOption::new(
            &format!(r"^OC\s+{num}\s+{num}\s+{num}\s+{num}\s+([YN])"),
            parse_oc,
        ),
        DecodeOption::new(r"^OE\s*$", parse_oe),
    ]
    .into_iter()
    .collect::<Result<_>>()
    .expect("valid contour patterns")
});

/// Decoder options for `OB`, `OS`, `OC` and `OE` records.
pub fn polygon_decoder_options() -> &'static [DecodeOption<ContourTag>] {
    &POLYGON_OPTIONS
}

/// Builds a [Polygon] from an `OB ... OE` scope, chaining each step from
/// the end point of the previous one.
fn reduce_polygon(scope: Vec<ContourNode>) -> Result<Contour> {
    let mut nodes = scope.into_iter();
    let Some(Node::Tag(ContourTag::PolygonBegin {
        start,
        polygon_type,
    })) = nodes.next()
    else {
        return Err(Error::Structure(
            "polygon scope does not start with an OB record".to_string(),
        ));
    };

    let mut cursor = start;
    let mut steps = Vec::new();
    for node in nodes {
        match node {
            Node::Tag(ContourTag::Segment { end }) => {
                steps.push(PolygonStep::Segment(Segment { start: cursor, end }));
                cursor = end;
            }
            Node::Tag(ContourTag::Arc {
                end,
                center,
                direction,
            }) => {
                steps.push(PolygonStep::Arc(Arc {
                    start: cursor,
                    end,
                    center,
                    direction,
                }));
                cursor = end;
            }
            _ => (),
        }
    }

    Ok(Contour::Polygon(Polygon {
        polygon_type,
        steps,
    }))
}

/// The `OB`/`OE` nesting rule.
pub fn polygon_treeify_rules() -> Vec<NestingRule<ContourTag, Contour>> {
    vec![NestingRule::new(
        ContourKind::PolygonBegin,
        ContourKind::PolygonEnd,
        reduce_polygon,
    )]
}
