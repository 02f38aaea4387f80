// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/job.rs - Access to an extracted ODB++ job directory.
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
 * # `job` Module
 *
 * An [OdbJob] points at the root of an extracted ODB++ job and one of its
 * steps. Line record files may be stored plain, gzipped (`<name>.gz`) or as
 * a single-entry ZIP archive (`<name>.Z`).
 *
 * ```text
 * <job>/matrix/matrix
 * <job>/steps/<step>/profile
 * <job>/steps/<step>/netlists/cadnet/netlist
 * <job>/steps/<step>/layers/<layer>/{features,components,tools}
 * ```
 *
 * ## Usage Example
 *
 * ```no_run
 * use odbpp::job::OdbJob;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let job = OdbJob::open("path/to/job")?.with_step("pcb");
 *     let layers = job.read_layers()?;
 *     let profile = job.read_profile()?;
 *     println!("{} layers, outline from {:?} to {:?}", layers.len(), profile.min(), profile.max());
 *     Ok(())
 * }
 * ```
 */

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::components::{Component, ComponentId, Components, parse_components};
use crate::drill_tools::DrillToolSet;
use crate::error::Result;
use crate::features::LayerFeatures;
use crate::layers::LayerSet;
use crate::linerecord::LineRecords;
use crate::netlist::Netlist;
use crate::profile::Profile;
use crate::structured_text::StructuredText;

pub const DEFAULT_STEP: &str = "pcb";
pub const TOP_COMPONENT_LAYER: &str = "comp_+_top";
pub const BOTTOM_COMPONENT_LAYER: &str = "comp_+_bot";
pub const DRILL_LAYER: &str = "through_drill";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdbJob {
    root: PathBuf,
    step: String,
}

/// `path` if it exists, otherwise the first of `path.gz` and `path.Z` that
/// exists.
fn find_line_record_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    ["gz", "Z"].iter().find_map(|ext| {
        let mut compressed = path.as_os_str().to_owned();
        compressed.push(".");
        compressed.push(ext);
        let compressed = PathBuf::from(compressed);
        compressed.is_file().then_some(compressed)
    })
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

impl OdbJob {
    /// Opens the job rooted at `root`, using the default step.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(not_found(root).into());
        }
        Ok(Self {
            root: root.to_path_buf(),
            step: DEFAULT_STEP.to_string(),
        })
    }

    /// Selects the step subsequent reads come from.
    pub fn with_step(mut self, step: &str) -> Self {
        self.step = step.to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn step_path(&self) -> PathBuf {
        self.root.join("steps").join(&self.step)
    }

    pub fn layer_path(&self, layer: &str) -> PathBuf {
        self.step_path().join("layers").join(layer)
    }

    fn read_linerecords(&self, path: &Path) -> Result<LineRecords> {
        let file = find_line_record_file(path).ok_or_else(|| not_found(path))?;
        LineRecords::from_filename(file)
    }

    /// The layer matrix.
    pub fn read_layers(&self) -> Result<LayerSet> {
        let matrix = StructuredText::from_filename(self.root.join("matrix").join("matrix"))?;
        LayerSet::from_structured_text(&matrix)
    }

    /// The board outline of the step.
    pub fn read_profile(&self) -> Result<Profile> {
        Profile::from_linerecords(&self.read_linerecords(&self.step_path().join("profile"))?)
    }

    /// The components placed on `layer`. A layer without a components file
    /// has no components.
    pub fn read_layer_components(&self, layer: &str) -> Result<BTreeMap<ComponentId, Component>> {
        match find_line_record_file(&self.layer_path(layer).join("components")) {
            Some(path) => parse_components(&LineRecords::from_filename(path)?),
            None => {
                debug!("layer {layer:?} has no components file");
                Ok(BTreeMap::new())
            }
        }
    }

    /// Components of the `comp_+_top` and `comp_+_bot` layers.
    pub fn read_components(&self) -> Result<Components> {
        Ok(Components {
            top: self.read_layer_components(TOP_COMPONENT_LAYER)?,
            bottom: self.read_layer_components(BOTTOM_COMPONENT_LAYER)?,
        })
    }

    /// The CAD netlist of the step.
    pub fn read_netlist(&self) -> Result<Netlist> {
        let path = self
            .step_path()
            .join("netlists")
            .join("cadnet")
            .join("netlist");
        Netlist::from_linerecords(&self.read_linerecords(&path)?)
    }

    /// The drill tool table of a drill layer, usually [DRILL_LAYER].
    pub fn read_drill_tools(&self, layer: &str) -> Result<DrillToolSet> {
        let text = StructuredText::from_filename(self.layer_path(layer).join("tools"))?;
        DrillToolSet::from_structured_text(&text)
    }

    /// Everything drawn on `layer`.
    pub fn read_layer_features(&self, layer: &str) -> Result<LayerFeatures> {
        LayerFeatures::from_linerecords(&self.read_linerecords(&self.layer_path(layer).join("features"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;

    #[test]
    fn paths() {
        let job = OdbJob {
            root: PathBuf::from("/jobs/board"),
            step: DEFAULT_STEP.to_string(),
        }
        .with_step("panel");
        assert_eq!(job.step(), "panel");
        assert_eq!(
            job.layer_path("top"),
            PathBuf::from("/jobs/board/steps/panel/layers/top")
        );
    }

    #[test]
    fn missing_root() {
        assert!(matches!(
            OdbJob::open("/nonexistent/odb/job"),
            Err(Error::Io(_))
        ));
    }
}
