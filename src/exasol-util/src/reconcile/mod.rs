// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Converges declared objects with the live catalog.
//!
//! Every operation validates its arguments, acquires the shared session,
//! issues the statements it needs and commits. The tracked identity of an
//! object is its upper-cased name, and it is only updated once the commit
//! succeeded. Failures are never retried.

use std::fmt;

use tracing::info;

use crate::query::{self, execute};
use crate::{Datum, ExasolError, ResourceData, Session};

mod named;

pub mod connection;
pub mod role;
pub mod schema;
pub mod table;
pub mod user;

/// The kinds of catalog object this crate manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Schema,
    Table,
    Role,
    User,
    Connection,
}

impl ObjectKind {
    /// The capitalized noun used in messages.
    pub fn noun(&self) -> &'static str {
        match self {
            ObjectKind::Schema => "Schema",
            ObjectKind::Table => "Table",
            ObjectKind::Role => "Role",
            ObjectKind::User => "User",
            ObjectKind::Connection => "Connection",
        }
    }

    /// The query that finds an object of this kind by name, if objects of
    /// this kind are looked up by a single name.
    ///
    /// The first column of every returned row is the catalog's name.
    pub(crate) fn lookup_query(&self) -> Option<&'static str> {
        match self {
            ObjectKind::Schema => Some(
                "SELECT SCHEMA_NAME FROM EXA_SCHEMAS WHERE UPPER(SCHEMA_NAME) = UPPER(?) AND SCHEMA_IS_VIRTUAL = FALSE",
            ),
            ObjectKind::Role => {
                Some("SELECT ROLE_NAME FROM EXA_ALL_ROLES WHERE UPPER(ROLE_NAME) = UPPER(?)")
            }
            ObjectKind::User => {
                Some("SELECT USER_NAME FROM EXA_ALL_USERS WHERE UPPER(USER_NAME) = UPPER(?)")
            }
            ObjectKind::Connection => Some(
                "SELECT CONNECTION_NAME, CONNECTION_STRING, USER_NAME FROM EXA_DBA_CONNECTIONS WHERE UPPER(CONNECTION_NAME) = UPPER(?)",
            ),
            ObjectKind::Table => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Schema => "SCHEMA",
            ObjectKind::Table => "TABLE",
            ObjectKind::Role => "ROLE",
            ObjectKind::User => "USER",
            ObjectKind::Connection => "CONNECTION",
        })
    }
}

/// The statements an update needs, computed before the session is acquired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePlan {
    /// `(old, new)` names for a `RENAME` statement.
    pub rename: Option<(String, String)>,
    /// Statements to run before the rename, addressing the object by its
    /// current name.
    pub statements: Vec<String>,
    /// Field values to record once the update committed.
    pub acknowledged: Vec<(String, Datum)>,
    /// The identity to track once the update committed.
    pub identity: Option<String>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.rename.is_none() && self.statements.is_empty()
    }
}

/// Runs `plan` against the shared session.
///
/// An empty plan returns without touching the session. The rename runs
/// last, so a failing `ALTER` leaves nothing pending. There is no rollback:
/// if the rename itself fails, earlier statements of the plan remain
/// uncommitted on the session and are committed by the next operation.
pub(crate) async fn apply_update<S: Session>(
    gate: &crate::ConnectionGatekeeper<S>,
    kind: ObjectKind,
    d: &mut dyn ResourceData,
    plan: UpdatePlan,
) -> Result<(), ExasolError> {
    if plan.is_empty() {
        return Ok(());
    }

    let mut guard = gate.acquire("update").await;
    let session = guard.session();
    for stmt in &plan.statements {
        execute(session, stmt, None).await?;
    }
    if let Some((old, new)) = &plan.rename {
        query::rename(session, kind, old, new, "").await?;
    }
    query::commit(session).await?;
    guard.release();

    if let Some((old, new)) = &plan.rename {
        info!(%kind, %old, %new, "renamed exasol object");
    }
    for (field, value) in plan.acknowledged {
        d.set(&field, value);
    }
    if let Some(identity) = plan.identity {
        d.set_id(identity);
    }
    Ok(())
}
