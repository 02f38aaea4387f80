// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/layers.rs - Parser for the ODB++ layer matrix.
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

use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::error::{Error, Result};
use crate::structured_text::{StructuredArray, StructuredText};
use crate::structures::{Polarity, unknown};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Component,
    SilkScreen,
    SolderPaste,
    SolderMask,
    Signal,
    Drill,
    Route,
    Document,
    /// Mixed plane and signal.
    Mixed,
    Mask,
}

impl FromStr for LayerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "COMPONENT" => Ok(LayerType::Component),
            "SILK_SCREEN" => Ok(LayerType::SilkScreen),
            "SOLDER_PASTE" => Ok(LayerType::SolderPaste),
            "SOLDER_MASK" => Ok(LayerType::SolderMask),
            "SIGNAL" => Ok(LayerType::Signal),
            "DRILL" => Ok(LayerType::Drill),
            "ROUT" => Ok(LayerType::Route),
            "DOCUMENT" => Ok(LayerType::Document),
            "MIXED" => Ok(LayerType::Mixed),
            "MASK" => Ok(LayerType::Mask),
            _ => Err(unknown("layer type", s)),
        }
    }
}

/// A row of the layer matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Lowercased, matching the layer's directory name.
    pub name: String,
    pub layer_type: LayerType,
    pub polarity: Polarity,
    pub row: u32,
    /// First and last layer spanned by a drill or rout layer.
    pub start: Option<String>,
    pub end: Option<String>,
}

fn field(array: &StructuredArray, key: &str) -> Result<String> {
    Ok(array.require(key)?.to_string())
}

fn layer_span(array: &StructuredArray, key: &str) -> Option<String> {
    array
        .get(key)
        .map(|value| value.to_string().to_lowercase())
        .filter(|name| !name.is_empty())
}

impl Layer {
    pub fn from_array(array: &StructuredArray) -> Result<Self> {
        let row = array
            .require("ROW")?
            .as_integer()
            .and_then(|row| u32::try_from(row).ok())
            .ok_or_else(|| Error::Structure("layer ROW is not a row number".to_string()))?;

        Ok(Self {
            name: field(array, "NAME")?.to_lowercase(),
            layer_type: field(array, "TYPE")?.parse()?,
            polarity: field(array, "POLARITY")?.parse()?,
            row,
            start: layer_span(array, "START_NAME"),
            end: layer_span(array, "END_NAME"),
        })
    }
}

/// The layers of a job, in matrix order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSet {
    pub layers: Vec<Layer>,
}

impl LayerSet {
    /// Collects the `LAYER` arrays of a matrix file. Other arrays (`STEP`)
    /// are skipped.
    pub fn from_structured_text(matrix: &StructuredText) -> Result<Self> {
        let layers = matrix
            .arrays_named("LAYER")
            .map(Layer::from_array)
            .collect::<Result<Vec<_>>>()?;
        trace!("matrix has {} layer(s)", layers.len());
        Ok(Self { layers })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn by_type(&self, layer_type: LayerType) -> impl Iterator<Item = &Layer> {
        self.layers
            .iter()
            .filter(move |layer| layer.layer_type == layer_type)
    }

    /// Case-insensitive lookup.
    pub fn by_name(&self, name: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|layer| layer.name.eq_ignore_ascii_case(name))
    }

    pub fn signal_layers(&self) -> impl Iterator<Item = &Layer> {
        self.by_type(LayerType::Signal)
    }

    /// The top and bottom component layers.
    ///
    /// A single component layer is on top if its row precedes the first
    /// signal layer, and on the bottom otherwise. More than two component
    /// layers is an error.
    pub fn component_layers(&self) -> Result<(Option<&Layer>, Option<&Layer>)> {
        let components: Vec<&Layer> = self.by_type(LayerType::Component).collect();
        match components.as_slice() {
            [] => Ok((None, None)),
            &[top, bottom] => Ok((Some(top), Some(bottom))),
            &[layer] => {
                let first_signal = self.signal_layers().next().ok_or_else(|| {
                    Error::Structure("single component layer but no signal layer".to_string())
                })?;
                if layer.row < first_signal.row {
                    Ok((Some(layer), None))
                } else {
                    Ok((None, Some(layer)))
                }
            }
            _ => Err(Error::Structure(format!(
                "expected at most two component layers, found {}",
                components.len()
            ))),
        }
    }

    pub fn top_components(&self) -> Result<Option<&Layer>> {
        Ok(self.component_layers()?.0)
    }

    pub fn bottom_components(&self) -> Result<Option<&Layer>> {
        Ok(self.component_layers()?.1)
    }
}

impl fmt::Display for LayerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for layer in &self.layers {
            writeln!(
                f,
                "{:>3} {:<24} {:?} {:?}",
                layer.row, layer.name, layer.layer_type, layer.polarity
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: &str = "
STEP {
    COL=1
    NAME=PCB
}
LAYER {
    ROW=1
    CONTEXT=BOARD
    TYPE=COMPONENT
    NAME=COMP_+_TOP
    POLARITY=POSITIVE
    START_NAME=
    END_NAME=
}
LAYER {
    ROW=2
    CONTEXT=BOARD
    TYPE=SIGNAL
    NAME=TOP
    POLARITY=POSITIVE
    START_NAME=
    END_NAME=
}
LAYER {
    ROW=3
    CONTEXT=BOARD
    TYPE=SIGNAL
    NAME=BOTTOM
    POLARITY=POSITIVE
    START_NAME=
    END_NAME=
}
LAYER {
    ROW=4
    CONTEXT=BOARD
    TYPE=DRILL
    NAME=THROUGH_DRILL
    POLARITY=POSITIVE
    START_NAME=TOP
    END_NAME=BOTTOM
}
";

    fn layers(text: &str) -> LayerSet {
        LayerSet::from_structured_text(&StructuredText::parse(text)).unwrap()
    }

    #[test]
    fn parse_matrix() {
        let set = layers(MATRIX);
        assert_eq!(set.len(), 4);
        assert_eq!(set.signal_layers().count(), 2);

        let drill = set.by_name("Through_Drill").unwrap();
        assert_eq!(drill.name, "through_drill");
        assert_eq!(drill.layer_type, LayerType::Drill);
        assert_eq!(drill.start.as_deref(), Some("top"));
        assert_eq!(drill.end.as_deref(), Some("bottom"));

        let top = set.by_name("top").unwrap();
        assert_eq!(top.start, None);
        assert!(set.by_name("inner1").is_none());
    }

    #[test]
    fn single_component_layer_side() {
        let set = layers(MATRIX);
        assert_eq!(set.top_components().unwrap().map(|l| l.row), Some(1));
        assert_eq!(set.bottom_components().unwrap(), None);

        let bottom_only = MATRIX.replacen("ROW=1", "ROW=9", 1);
        let set = layers(&bottom_only);
        assert_eq!(set.top_components().unwrap(), None);
        assert_eq!(set.bottom_components().unwrap().map(|l| l.row), Some(9));
    }

    #[test]
    fn no_component_layers() {
        let set = layers("LAYER {\nROW=1\nTYPE=SIGNAL\nNAME=TOP\nPOLARITY=POSITIVE\n}\n");
        assert_eq!(set.component_layers().unwrap(), (None, None));
    }

    #[test]
    fn unknown_layer_type() {
        let text = StructuredText::parse("LAYER {\nROW=1\nTYPE=GLUE\nNAME=X\nPOLARITY=POSITIVE\n}\n");
        assert!(LayerSet::from_structured_text(&text).is_err());
    }
}
