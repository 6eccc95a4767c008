// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Descriptions of Exasol tables as derived from the catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maps a lower-cased column name to its 0-based position in the table.
pub type IndexMap = BTreeMap<String, usize>;

/// Describes a column in an Exasol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDesc {
    /// The name of the column, as reported by the catalog.
    pub name: String,
    /// The declared type, e.g. `VARCHAR(20) UTF8` or `DECIMAL(24,4)`.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Describes an Exasol table.
///
/// Rebuilt from the catalog on every read; callers replace rather than
/// update it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDesc {
    /// Columns in ordinal order.
    pub columns: Vec<ColumnDesc>,
    pub column_indices: IndexMap,
    /// Columns that take part in the primary key.
    pub primary_keys: IndexMap,
    /// Columns that take part in a foreign key.
    pub foreign_keys: IndexMap,
    /// Distribution key columns in ordinal order.
    pub distribution_keys: Vec<String>,
    /// Column definitions, constraints and the distribution clause, suitable
    /// as the body of a `CREATE TABLE ... (<body>)` statement.
    ///
    /// Every line keeps its trailing comma; see [`create_table_statement`].
    pub composite: String,
}

impl TableDesc {
    /// Looks up a column by name, ignoring case.
    pub fn column(&self, name: &str) -> Option<&ColumnDesc> {
        let idx = *self.column_indices.get(&name.to_lowercase())?;
        self.columns.get(idx)
    }

    /// Flattens the description into the attributes exposed to the host.
    pub fn attributes(&self) -> TableAttributes {
        TableAttributes {
            columns: self.columns.clone(),
            column_indices: self.column_indices.clone(),
            primary_key_indices: self.primary_keys.clone(),
            foreign_key_indices: self.foreign_keys.clone(),
            composite: self.composite.clone(),
        }
    }
}

/// The computed attributes of a table, in the shape exposed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableAttributes {
    pub columns: Vec<ColumnDesc>,
    pub column_indices: IndexMap,
    pub primary_key_indices: IndexMap,
    pub foreign_key_indices: IndexMap,
    pub composite: String,
}

/// Wraps a composite body into a `CREATE TABLE` statement, dropping the
/// trailing separator the body carries.
pub fn create_table_statement(qualified_name: &str, composite: &str) -> String {
    let body = composite.trim_end().trim_end_matches(',');
    format!("CREATE TABLE {qualified_name} ({body})")
}
