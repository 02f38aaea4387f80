// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/profile.rs - Parser for the ODB++ board profile.
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

use log::debug;

use crate::decoder::decode_tags;
use crate::error::Result;
use crate::linerecord::LineRecords;
use crate::polygon::{Contour, Polygon};
use crate::structures::Point;
use crate::surface::{Surface, contour_decoder_options, contour_treeify_rules};
use crate::treeifier::{Node, treeify};
use crate::units::{Unit, linerecords_unit};

/// The board outline of a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub unit: Unit,
    pub surfaces: Vec<Surface>,
}

impl Profile {
    /// Parses the `Layer features` section of a profile file.
    pub fn from_linerecords(records: &LineRecords) -> Result<Self> {
        let unit = linerecords_unit(records)?;
        let tags = decode_tags(records.section("Layer features"), contour_decoder_options())?;

        let mut surfaces = Vec::new();
        for node in treeify(tags, &contour_treeify_rules())? {
            match node {
                Node::Reduced(Contour::Surface(surface)) => surfaces.push(surface),
                other => debug!("ignoring profile element outside a surface: {other:?}"),
            }
        }

        Ok(Self { unit, surfaces })
    }

    /// Lower-left corner of the outline, if it has any steps.
    pub fn min(&self) -> Option<Point> {
        self.polygons().filter_map(|p| p.min()).reduce(Point::min)
    }

    /// Upper-right corner of the outline, if it has any steps.
    pub fn max(&self) -> Option<Point> {
        self.polygons().filter_map(|p| p.max()).reduce(Point::max)
    }

    fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.surfaces.iter().flat_map(|s| s.polygons.iter())
    }
}
