// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error type for the ODB++ parser library.
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

use thiserror::Error;

/// Errors produced while reading and interpreting ODB++ data.
///
/// A line that matches no decoder option is not an error. Only a line that
/// matched but could not be converted ([Error::MalformedRecord]) or a closed
/// scope that a reducer rejected ([Error::Reduction]) is reported.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("unknown {what} {value:?}")]
    UnknownCode { what: &'static str, value: String },

    /// A decoder option matched the line but its constructor failed.
    #[error("malformed record {line:?}: {source}")]
    MalformedRecord {
        line: String,
        #[source]
        source: Box<Error>,
    },

    /// A reducer failed on a closed scope.
    #[error("failed to reduce scope opened by {scope}: {source}")]
    Reduction {
        scope: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid structure: {0}")]
    Structure(String),

    #[error("invalid unit: {0}")]
    InvalidUnit(String),

    #[error("missing section {0:?}")]
    MissingSection(String),

    #[error("missing key {0:?}")]
    MissingKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;
