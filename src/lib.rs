// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Parser library for ODB++ PCB manufacturing data.
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
 * # `odbpp` Crate
 *
 * A library for reading the line record and structured text files of an
 * extracted ODB++ job.
 *
 * Every record grammar in this crate is built from two small engines:
 *
 * 1. [decoder]: Turns each line into a typed tag using an ordered list of
 *    regular expression options. The first matching option wins and lines
 *    nothing matches are skipped.
 * 2. [treeifier]: Folds a flat tag sequence into nested objects using
 *    begin/end nesting rules, so that `OB ... OE` becomes a polygon and
 *    `S ... SE` becomes a surface holding its polygons.
 *
 * The remaining modules define the grammars ([polygon], [surface],
 * [features], [components], [netlist], [symbols]), the file readers
 * ([linerecord], [structured_text]) and the job-level entry point
 * ([job]).
 *
 * ## Usage Example
 *
 * ```no_run
 * use odbpp::job::OdbJob;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     // Open the extracted job
 *     let job = OdbJob::open("path/to/job")?;
 *
 *     // Read the board outline
 *     let profile = job.read_profile()?;
 *     println!("Outline: {:?} to {:?} ({:?})", profile.min(), profile.max(), profile.unit);
 *
 *     // List the components on both sides
 *     for component in job.read_components()?.iter() {
 *         println!("{} {} at ({}, {})",
 *             component.name, component.part_name,
 *             component.location.x, component.location.y);
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

pub mod attributes;
pub mod components;
pub mod decoder;
pub mod drill_tools;
pub mod error;
pub mod features;
pub mod job;
pub mod layers;
pub mod linerecord;
pub mod netlist;
pub mod polygon;
pub mod profile;
pub mod structured_text;
pub mod structures;
pub mod surface;
pub mod symbols;
pub mod treeifier;
pub mod units;

pub use error::{Error, Result};
