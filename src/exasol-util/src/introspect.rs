// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Derives [`TableDesc`]s from the Exasol catalog.
//!
//! The catalog exposes columns, key constraints and distribution flags as
//! independent views with no key linking one row to another. They are
//! correlated by lower-cased column name only.

use std::fmt::Write;

use itertools::Itertools;
use tracing::debug;

use crate::query::query;
use crate::{ColumnDesc, Datum, ExasolError, IndexMap, SYS_SCHEMA, Session, TableDesc};

static COLUMNS_QUERY: &str = "SELECT COLUMN_ORDINAL_POSITION, COLUMN_NAME, COLUMN_TYPE, COLUMN_IS_DISTRIBUTION_KEY
FROM EXA_ALL_COLUMNS
WHERE UPPER(COLUMN_SCHEMA) = UPPER(?) AND UPPER(COLUMN_TABLE) = UPPER(?)
ORDER BY COLUMN_ORDINAL_POSITION";

static COLUMN_DEFINITIONS_QUERY: &str = "SELECT COLUMN_NAME, COLUMN_TYPE, COLUMN_IS_NULLABLE
FROM EXA_ALL_COLUMNS
WHERE UPPER(COLUMN_SCHEMA) = UPPER(?) AND UPPER(COLUMN_TABLE) = UPPER(?)
ORDER BY COLUMN_ORDINAL_POSITION";

/// The kinds of constraint whose columns are surfaced as index maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintType {
    PrimaryKey,
    ForeignKey,
}

impl ConstraintType {
    fn as_sql(&self) -> &'static str {
        match self {
            ConstraintType::PrimaryKey => "PRIMARY KEY",
            ConstraintType::ForeignKey => "FOREIGN KEY",
        }
    }
}

/// Columns of a table in ordinal order, before keys are attached.
#[derive(Debug, Default)]
struct TableColumns {
    columns: Vec<ColumnDesc>,
    indices: IndexMap,
    distributes: Vec<String>,
}

/// Reads the description of `schema.table` from the catalog.
///
/// Both names are matched case-insensitively. A table that does not exist
/// yields an empty description; use [`table_exists`] to tell the two apart.
///
/// # Errors
///
/// - Any catalog query fails.
/// - A catalog row does not have the expected shape.
pub async fn read_table<S: Session + ?Sized>(
    session: &mut S,
    schema: &str,
    table: &str,
) -> Result<TableDesc, ExasolError> {
    let TableColumns {
        columns,
        indices,
        distributes,
    } = read_columns(session, schema, table).await?;
    let primary_keys =
        read_constraint_columns(session, schema, table, ConstraintType::PrimaryKey).await?;
    let foreign_keys =
        read_constraint_columns(session, schema, table, ConstraintType::ForeignKey).await?;
    let composite = read_composite(session, schema, table, &primary_keys, &distributes).await?;

    debug!(
        schema,
        table,
        columns = columns.len(),
        primary_keys = primary_keys.len(),
        foreign_keys = foreign_keys.len(),
        "read exasol table"
    );

    Ok(TableDesc {
        columns,
        column_indices: indices,
        primary_keys,
        foreign_keys,
        distribution_keys: distributes,
        composite,
    })
}

/// Reports whether `schema.table` has any columns in the catalog.
pub async fn table_exists<S: Session + ?Sized>(
    session: &mut S,
    schema: &str,
    table: &str,
) -> Result<bool, ExasolError> {
    let rows = query(
        session,
        "SELECT COLUMN_NAME FROM EXA_ALL_COLUMNS WHERE UPPER(COLUMN_SCHEMA) = UPPER(?) AND UPPER(COLUMN_TABLE) = UPPER(?)",
        &[Datum::from(schema), Datum::from(table)],
        Some(SYS_SCHEMA),
    )
    .await?;
    Ok(!rows.is_empty())
}

async fn read_columns<S: Session + ?Sized>(
    session: &mut S,
    schema: &str,
    table: &str,
) -> Result<TableColumns, ExasolError> {
    let rows = query(
        session,
        COLUMNS_QUERY,
        &[Datum::from(schema), Datum::from(table)],
        Some(SYS_SCHEMA),
    )
    .await?;

    let mut tcs = TableColumns {
        columns: Vec::with_capacity(rows.len()),
        ..Default::default()
    };
    for row in rows {
        let idx = row.ordinal_index(0)?;
        let name = row.text(1)?;
        tcs.columns.push(ColumnDesc {
            name: name.to_string(),
            type_name: row.text(2)?.to_string(),
        });
        if row.boolean(3)? {
            tcs.distributes.push(name.to_string());
        }
        tcs.indices.insert(name.to_lowercase(), idx);
    }
    Ok(tcs)
}

/// Reads every column that takes part in a constraint of type `kind`.
///
/// A constraint may span several columns; each becomes its own entry.
async fn read_constraint_columns<S: Session + ?Sized>(
    session: &mut S,
    schema: &str,
    table: &str,
    kind: ConstraintType,
) -> Result<IndexMap, ExasolError> {
    let stmt = format!(
        "SELECT COLUMN_NAME, ORDINAL_POSITION FROM EXA_ALL_CONSTRAINT_COLUMNS WHERE UPPER(CONSTRAINT_SCHEMA) = UPPER(?) AND UPPER(CONSTRAINT_TABLE) = UPPER(?) AND CONSTRAINT_TYPE = '{}'",
        kind.as_sql()
    );
    query(
        session,
        &stmt,
        &[Datum::from(schema), Datum::from(table)],
        Some(SYS_SCHEMA),
    )
    .await?
    .into_iter()
    .map(|row| Ok::<_, ExasolError>((row.text(0)?.to_lowercase(), row.ordinal_index(1)?)))
    .collect()
}

async fn read_composite<S: Session + ?Sized>(
    session: &mut S,
    schema: &str,
    table: &str,
    primary_keys: &IndexMap,
    distributes: &[String],
) -> Result<String, ExasolError> {
    let rows = query(
        session,
        COLUMN_DEFINITIONS_QUERY,
        &[Datum::from(schema), Datum::from(table)],
        Some(SYS_SCHEMA),
    )
    .await?;

    let mut b = String::new();
    for row in rows {
        let nullability = if row.boolean(2)? { "NULL" } else { "NOT NULL" };
        // Writing to a `String` cannot fail.
        let _ = writeln!(b, "{} {} {},", row.text(0)?, row.text(1)?, nullability);
    }
    if !primary_keys.is_empty() {
        let keys = primary_keys
            .iter()
            .sorted_by(|(an, ai), (bn, bi)| ai.cmp(bi).then_with(|| an.cmp(bn)))
            .map(|(name, _)| name.to_uppercase())
            .join(", ");
        let _ = writeln!(b, "CONSTRAINT PRIMARY KEY ({keys}),");
    }
    if !distributes.is_empty() {
        let _ = writeln!(b, "DISTRIBUTE BY {},", distributes.join(", ").to_uppercase());
    }
    Ok(b)
}
