// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Exasol utility library.
//!
//! Reconciles declared database objects (schemas, tables, roles, users and
//! connections) against the live catalog of an Exasol database. All traffic
//! goes through one shared [`Session`], serialized by a
//! [`ConnectionGatekeeper`].

mod config;
pub use config::{Config, DEFAULT_PORT};

mod datum;
pub use datum::{CatalogRow, Datum};

mod session;
pub use session::{Connector, Session};

mod gatekeeper;
pub use gatekeeper::{ConnectionGatekeeper, SessionGuard};

pub mod query;

mod desc;
pub use desc::{ColumnDesc, IndexMap, TableAttributes, TableDesc, create_table_statement};

pub mod introspect;
pub use introspect::read_table;

pub mod data;
pub use data::{MemResourceData, ResourceData};

pub mod argument;

pub mod reconcile;
pub use reconcile::ObjectKind;

pub mod mem;

/// The catalog schema that holds the system views.
pub const SYS_SCHEMA: &str = "SYS";

/// An error encountered while reconciling or introspecting the catalog.
#[derive(Debug, thiserror::Error)]
pub enum ExasolError {
    /// A required declared field was missing or empty.
    #[error("invalid argument '{field}': {reason}")]
    Validation { field: String, reason: String },
    /// A catalog query, or the commit that follows a statement, failed.
    #[error("catalog query failed: {0}")]
    Query(#[source] anyhow::Error),
    /// An object the operation relied on is absent from the catalog.
    #[error("{} {name} not found", .kind.noun())]
    NotFound { kind: ObjectKind, name: String },
    /// A statement was rejected by the database.
    #[error(transparent)]
    Execution(anyhow::Error),
    /// A catalog cell did not have the shape the caller expected.
    #[error("invalid catalog data in column {column}: {error}")]
    InvalidData { column: usize, error: String },
    #[error("invalid exasol configuration: {0}")]
    InvalidConfig(String),
    #[error("error connecting to exasol: {0}")]
    Connect(#[source] anyhow::Error),
}

impl ExasolError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        ExasolError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Canonicalizes an object name the way the catalog stores it.
///
/// The catalog compares names case-insensitively but reports them upper-cased,
/// so every tracked identity goes through this function.
pub fn canonical_name(name: &str) -> String {
    name.to_uppercase()
}

/// Renders `value` as a single-quoted SQL string literal.
pub fn quote_literal(value: &str) -> String {
    let mut escaped = value.replace('\'', "''");
    escaped.insert(0, '\'');
    escaped.push('\'');
    escaped
}

/// Renders `value` as a double-quoted password literal, as accepted by
/// `IDENTIFIED BY`.
pub fn quote_password(value: &str) -> String {
    let mut escaped = value.replace('"', "\"\"");
    escaped.insert(0, '"');
    escaped.push('"');
    escaped
}
