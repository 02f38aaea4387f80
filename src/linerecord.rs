// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/linerecord.rs - Reader for ODB++ line record files.
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
 * # `linerecord` Module
 *
 * Line record files (features, profile, components, netlists) are plain
 * text where every line is one record, and where comment lines name the
 * section the following records belong to:
 *
 * ```text
 * #
 * #Layer features
 * #
 * S P 0
 * OB -38.104 -0.6351 I
 * ```
 *
 * [LineRecords] strips every line, drops empty and bare `#` lines, and
 * groups the rest by section. Lines before the first section header form
 * the unnamed [LineRecords::header] section.
 *
 * ## Usage Example
 *
 * ```no_run
 * use odbpp::linerecord::LineRecords;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let records = LineRecords::from_filename("job/steps/pcb/profile")?;
 *     for line in records.section("Layer features") {
 *         println!("{}", line);
 *     }
 *     Ok(())
 * }
 * ```
 */

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::prelude::*;
use std::path::Path;

use flate2::read::GzDecoder;
use log::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// A line record file grouped by section, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineRecords {
    header: Vec<String>,
    sections: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl LineRecords {
    /// Groups already-read text.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.split('\n'))
    }

    /// Groups raw lines. Lines are stripped here, so they may still carry
    /// surrounding whitespace or a carriage return.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut records = Self::default();
        let mut current: Option<usize> = None;

        for line in filter_line_record_lines(lines) {
            if let Some(name) = line.strip_prefix('#') {
                let name = name.trim_matches('#').trim().to_string();
                current = Some(records.section_slot(name));
                continue;
            }
            match current {
                Some(i) => records.sections[i].1.push(line),
                None => records.header.push(line),
            }
        }

        debug!(
            "grouped line records: {} header line(s), {} section(s)",
            records.header.len(),
            records.sections.len()
        );
        records
    }

    /// Reads a whole line record file from `reader`. The contents must be
    /// valid UTF-8.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::parse(&String::from_utf8(buffer)?))
    }

    /// Reads a line record file stored as the only entry of a ZIP archive.
    pub fn from_zip<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        if archive.len() != 1 {
            return Err(Error::Structure(format!(
                "expected exactly one file in archive, found {}",
                archive.len()
            )));
        }
        Self::from_reader(archive.by_index(0)?)
    }

    /// Reads a line record file from disk. Files ending in `.gz` are
    /// decompressed first, and files ending in `.Z` are opened as
    /// single-entry ZIP archives.
    pub fn from_filename<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("reading line records from {}", path.display());

        let reader = BufReader::new(File::open(path)?);
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Self::from_reader(GzDecoder::new(reader)),
            Some("Z") => Self::from_zip(reader),
            _ => Self::from_reader(reader),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn get(&self, name: &str) -> Option<&Vec<String>> {
        self.index.get(name).map(|&i| &self.sections[i].1)
    }

    /// The lines of section `name`, or nothing if the file has no such
    /// section.
    pub fn section(&self, name: &str) -> &[String] {
        self.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Like [LineRecords::section], but a missing section is an error.
    pub fn require(&self, name: &str) -> Result<&[String]> {
        self.get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingSection(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All named sections in the order they first appear.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.sections
            .iter()
            .map(|(name, lines)| (name.as_str(), lines.as_slice()))
    }

    fn section_slot(&mut self, name: String) -> usize {
        if let Some(&i) = self.index.get(&name) {
            return i;
        }
        let i = self.sections.len();
        self.index.insert(name.clone(), i);
        self.sections.push((name, Vec::new()));
        i
    }
}

/// Strips every line and drops empty and bare `#` lines.
pub fn filter_line_record_lines<I>(lines: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| !line.is_empty() && line != "#")
        .collect()
}
