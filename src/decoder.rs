// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/decoder.rs - Line decoder for ODB++ line record files.
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
 * # `decoder` Module
 *
 * Turns pre-stripped lines into tags. A grammar is an ordered list of
 * [DecodeOption]s, each pairing a regular expression with a constructor.
 * The first option whose expression matches a line builds the tag for that
 * line; a line that matches nothing yields `None`.
 *
 * The option order is significant: several expressions may accept the same
 * line, and only the first one in the list is ever consulted.
 *
 * ## Usage Example
 *
 * ```
 * use odbpp::decoder::{decode_stream, DecodeOption};
 * use odbpp::structures::parse_decimal;
 *
 * let options = vec![
 *     DecodeOption::new(r"^OS\s+(\S+)\s+(\S+)", |caps| parse_decimal(&caps[1])).unwrap(),
 * ];
 *
 * let decoded: Vec<_> = decode_stream(["OS 1.5 2", "SE"], &options)
 *     .collect::<Result<_, _>>()
 *     .unwrap();
 * assert_eq!(decoded.len(), 2);
 * assert!(decoded[1].is_none());
 * ```
 */

use std::fmt;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

/// Builds a tag from a successful match. Never called for a failed match.
pub type Constructor<T> = fn(&Captures<'_>) -> Result<T>;

/// One entry of a decoder grammar: a line matcher and the tag constructor
/// applied to its captures.
pub struct DecodeOption<T> {
    regex: Regex,
    build: Constructor<T>,
}

impl<T> DecodeOption<T> {
    /// Compiles `pattern` and pairs it with `build`.
    ///
    /// The expression is searched anywhere in the line, so grammars anchor
    /// their patterns with `^` where a record keyword must come first.
    pub fn new(pattern: &str, build: Constructor<T>) -> Result<Self> {
        Ok(Self::from_regex(Regex::new(pattern)?, build))
    }

    pub fn from_regex(regex: Regex, build: Constructor<T>) -> Self {
        Self { regex, build }
    }

    /// The source text of the matcher.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Runs this option alone: `None` when the line does not match,
    /// otherwise the constructor's result.
    pub fn run(&self, line: &str) -> Option<Result<T>> {
        self.regex
            .captures(line)
            .map(|captures| (self.build)(&captures))
    }
}

impl<T> Clone for DecodeOption<T> {
    fn clone(&self) -> Self {
        Self {
            regex: self.regex.clone(),
            build: self.build,
        }
    }
}

impl<T> fmt::Debug for DecodeOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOption")
            .field("pattern", &self.pattern())
            .finish_non_exhaustive()
    }
}

/// Decodes a single line with the first matching option.
///
/// Returns `Ok(None)` when no option matches. When an option matches but
/// its constructor fails, the failure is returned as
/// [Error::MalformedRecord] carrying the offending line; later options are
/// not tried.
pub fn decode_line<T>(line: &str, options: &[DecodeOption<T>]) -> Result<Option<T>> {
    for option in options {
        if let Some(result) = option.run(line) {
            return result.map(Some).map_err(|e| Error::MalformedRecord {
                line: line.to_string(),
                source: Box::new(e),
            });
        }
    }
    Ok(None)
}

/// Lazy iterator returned by [decode_stream].
pub struct DecodeStream<'a, I, T> {
    lines: I,
    options: &'a [DecodeOption<T>],
}

impl<I, T> Iterator for DecodeStream<'_, I, T>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<Option<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        Some(decode_line(line.as_ref(), self.options))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.lines.size_hint()
    }
}

/// Decodes `lines` one at a time, yielding exactly one slot per input line.
///
/// Nothing is decoded until the iterator is advanced, and each line is
/// visited once.
pub fn decode_stream<I, T>(lines: I, options: &[DecodeOption<T>]) -> DecodeStream<'_, I::IntoIter, T>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    DecodeStream {
        lines: lines.into_iter(),
        options,
    }
}

/// Decodes `lines` and keeps only the produced tags, in line order.
/// Stops at the first malformed record.
pub fn decode_tags<I, T>(lines: I, options: &[DecodeOption<T>]) -> Result<Vec<T>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    decode_stream(lines, options)
        .filter_map(Result::transpose)
        .collect()
}
