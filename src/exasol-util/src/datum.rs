// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Loosely-typed cells as returned by the Exasol client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ExasolError;

/// How far a reported ordinal may stray from an integer before it is
/// treated as corrupt.
const ORDINAL_TOLERANCE: f64 = 1e-6;

/// A single cell of a catalog row, or a declared field value.
///
/// The client delivers every numeric column as a float, including ordinal
/// positions and counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl Datum {
    fn kind(&self) -> &'static str {
        match self {
            Datum::Text(_) => "text",
            Datum::Number(_) => "number",
            Datum::Bool(_) => "boolean",
            Datum::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Returns the contained text, or an error naming the actual shape.
    pub fn as_str(&self) -> Result<&str, String> {
        match self {
            Datum::Text(s) => Ok(s),
            other => Err(format!("expected text, found {}", other.kind())),
        }
    }

    pub fn as_bool(&self) -> Result<bool, String> {
        match self {
            Datum::Bool(b) => Ok(*b),
            other => Err(format!("expected boolean, found {}", other.kind())),
        }
    }

    /// Rounds a float-encoded integer to the nearest whole number.
    ///
    /// Values that are not within [`ORDINAL_TOLERANCE`] of an integer are
    /// rejected rather than truncated.
    pub fn as_int(&self) -> Result<i64, String> {
        let Datum::Number(n) = self else {
            return Err(format!("expected number, found {}", self.kind()));
        };
        if !n.is_finite() {
            return Err(format!("non-finite number {n}"));
        }
        let rounded = (n + 0.5).floor();
        if (n - rounded).abs() > ORDINAL_TOLERANCE {
            return Err(format!("{n} is not an integer"));
        }
        if rounded.abs() > 2f64.powi(53) {
            return Err(format!("{n} is out of range"));
        }
        // Checked above to be integral and within the exactly representable range.
        #[allow(clippy::as_conversions)]
        Ok(rounded as i64)
    }

    /// Converts a 1-based catalog ordinal into a 0-based index.
    pub fn as_ordinal_index(&self) -> Result<usize, String> {
        let ordinal = self.as_int()?;
        if ordinal < 1 {
            return Err(format!("ordinal {ordinal} is not positive"));
        }
        usize::try_from(ordinal - 1).map_err(|e| e.to_string())
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Datum::Text(s) => f.write_str(s),
            Datum::Number(n) => write!(f, "{n}"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Null => f.write_str("NULL"),
        }
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self {
        Datum::Number(n)
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

/// An ordered sequence of cells, as fetched from a catalog view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogRow(pub Vec<Datum>);

impl CatalogRow {
    pub fn new(cells: impl IntoIterator<Item = Datum>) -> Self {
        CatalogRow(cells.into_iter().collect())
    }

    pub fn get(&self, column: usize) -> Result<&Datum, ExasolError> {
        self.0.get(column).ok_or_else(|| ExasolError::InvalidData {
            column,
            error: format!("row has only {} columns", self.0.len()),
        })
    }

    pub fn text(&self, column: usize) -> Result<&str, ExasolError> {
        self.get(column)?
            .as_str()
            .map_err(|error| ExasolError::InvalidData { column, error })
    }

    /// Like [`CatalogRow::text`], but maps `NULL` to `None`.
    pub fn opt_text(&self, column: usize) -> Result<Option<&str>, ExasolError> {
        match self.get(column)? {
            Datum::Null => Ok(None),
            datum => datum
                .as_str()
                .map(Some)
                .map_err(|error| ExasolError::InvalidData { column, error }),
        }
    }

    pub fn boolean(&self, column: usize) -> Result<bool, ExasolError> {
        self.get(column)?
            .as_bool()
            .map_err(|error| ExasolError::InvalidData { column, error })
    }

    pub fn ordinal_index(&self, column: usize) -> Result<usize, ExasolError> {
        self.get(column)?
            .as_ordinal_index()
            .map_err(|error| ExasolError::InvalidData { column, error })
    }
}

impl<const N: usize> From<[Datum; N]> for CatalogRow {
    fn from(cells: [Datum; N]) -> Self {
        CatalogRow(cells.into())
    }
}
