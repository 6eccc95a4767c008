// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Thin wrappers around [`Session`] that attach the crate's error taxonomy
//! and log every statement issued.

use tracing::debug;

use crate::{CatalogRow, Datum, ExasolError, ObjectKind, Session};

/// Runs a catalog query.
///
/// `namespace` selects the schema the statement is evaluated in;
/// metadata queries pass [`crate::SYS_SCHEMA`].
pub async fn query<S: Session + ?Sized>(
    session: &mut S,
    stmt: &str,
    params: &[Datum],
    namespace: Option<&str>,
) -> Result<Vec<CatalogRow>, ExasolError> {
    debug!(stmt, ?namespace, "exasol query");
    session
        .fetch_rows(stmt, params, namespace)
        .await
        .map_err(ExasolError::Query)
}

/// Executes a DDL statement.
pub async fn execute<S: Session + ?Sized>(
    session: &mut S,
    stmt: &str,
    namespace: Option<&str>,
) -> Result<u64, ExasolError> {
    debug!(stmt = %redact(stmt), ?namespace, "exasol execute");
    session
        .execute(stmt, &[], namespace)
        .await
        .map_err(ExasolError::Execution)
}

pub async fn commit<S: Session + ?Sized>(session: &mut S) -> Result<(), ExasolError> {
    session.commit().await.map_err(ExasolError::Query)
}

/// Renames an object.
///
/// `extra` is appended to the statement verbatim when non-empty.
pub async fn rename<S: Session + ?Sized>(
    session: &mut S,
    kind: ObjectKind,
    old: &str,
    new: &str,
    extra: &str,
) -> Result<(), ExasolError> {
    let mut stmt = format!("RENAME {kind} {old} TO {new}");
    if !extra.is_empty() {
        stmt.push(' ');
        stmt.push_str(extra);
    }
    execute(session, &stmt, None).await?;
    Ok(())
}

/// Strips secrets from a statement before it is logged.
pub(crate) fn redact(stmt: &str) -> String {
    match stmt.find("IDENTIFIED BY") {
        Some(pos) => format!("{}IDENTIFIED BY <redacted>", &stmt[..pos]),
        None => stmt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemSession;

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("CREATE USER u IDENTIFIED BY \"secret\""),
            "CREATE USER u IDENTIFIED BY <redacted>"
        );
        assert_eq!(redact("DROP USER u"), "DROP USER u");
    }

    #[tokio::test]
    async fn test_rename_statement() {
        let mut session = MemSession::new();
        rename(&mut session, ObjectKind::Schema, "A", "B", "")
            .await
            .unwrap();
        rename(&mut session, ObjectKind::Table, "S.A", "B", "CASCADE")
            .await
            .unwrap();
        assert_eq!(
            session.executed(),
            vec!["RENAME SCHEMA A TO B", "RENAME TABLE S.A TO B CASCADE"]
        );
    }

    #[tokio::test]
    async fn test_errors_are_classified() {
        let mut session = MemSession::new();
        session.fail_on("DROP", "object X not found");
        session.fail_on("SELECT", "insufficient privileges");

        let err = execute(&mut session, "DROP SCHEMA X", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExasolError::Execution(_)));
        assert_eq!(err.to_string(), "object X not found");

        let err = query(&mut session, "SELECT 1", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExasolError::Query(_)));
    }
}
