// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Tables.
//!
//! The table body is declared by the user as a composite definition; this
//! module only wraps it in `CREATE TABLE`. Reads expose the computed
//! attributes of [`crate::TableDesc`].

use tracing::info;

use crate::argument::{self, changed_str};
use crate::introspect::{read_table, table_exists};
use crate::query::{commit, execute};
use crate::reconcile::{ObjectKind, UpdatePlan, apply_update};
use crate::{
    ConnectionGatekeeper, Datum, ExasolError, ResourceData, Session, TableAttributes,
    canonical_name, create_table_statement,
};

/// The tracked identity of a table: `SCHEMA.TABLE`, upper-cased.
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", canonical_name(schema), canonical_name(table))
}

/// Splits an identity of the form `schema.table`.
fn split_identity(id: &str) -> Result<(&str, &str), ExasolError> {
    match id.split_once('.') {
        Some((schema, table)) if !schema.is_empty() && !table.is_empty() => Ok((schema, table)),
        _ => Err(ExasolError::validation(
            "id",
            format!("expected <schema>.<table>, found {id:?}"),
        )),
    }
}

pub async fn create<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let schema = argument::required_str(d, "schema")?;
    let name = argument::name(d)?;
    let composite = argument::required_str(d, "composite")?;
    let id = qualified_name(&schema, &name);

    let mut guard = gate.acquire("create").await;
    execute(guard.session(), &create_table_statement(&id, &composite), None).await?;
    commit(guard.session()).await?;
    guard.release();

    info!(%id, "created exasol table");
    d.set_id(id);
    Ok(())
}

/// Reads the computed attributes of the declared table.
///
/// A table without columns does not exist.
pub async fn read<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<TableAttributes, ExasolError> {
    let schema = argument::required_str(d, "schema")?;
    let name = argument::name(d)?;
    let id = qualified_name(&schema, &name);

    let mut guard = gate.acquire("read").await;
    let desc = read_table(guard.session(), &schema, &name).await?;
    guard.release();

    if desc.columns.is_empty() {
        return Err(ExasolError::NotFound {
            kind: ObjectKind::Table,
            name: id,
        });
    }
    d.set_id(id);
    Ok(desc.attributes())
}

/// Renames the table when its declared name changed. Moving a table to
/// another schema is not supported.
pub fn plan_update(d: &dyn ResourceData) -> Result<UpdatePlan, ExasolError> {
    let mut plan = UpdatePlan::default();
    if changed_str(d, "schema")?.is_some() {
        return Err(ExasolError::validation(
            "schema",
            "tables cannot be moved between schemas",
        ));
    }
    if let Some((old, new)) = changed_str(d, "name")? {
        if new.trim().is_empty() {
            return Err(ExasolError::validation("name", "must be set"));
        }
        let schema = argument::required_str(d, "schema")?;
        plan.identity = Some(qualified_name(&schema, &new));
        plan.acknowledged.push(("name".into(), Datum::from(new.as_str())));
        plan.rename = Some((qualified_name(&schema, &old), new));
    }
    Ok(plan)
}

pub async fn update<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let plan = plan_update(d)?;
    apply_update(gate, ObjectKind::Table, d, plan).await
}

pub async fn delete<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let id = if d.id().is_empty() {
        qualified_name(&argument::required_str(d, "schema")?, &argument::name(d)?)
    } else {
        d.id().to_string()
    };

    let mut guard = gate.acquire("delete").await;
    execute(guard.session(), &format!("DROP TABLE {id}"), None).await?;
    commit(guard.session()).await?;
    guard.release();

    info!(%id, "dropped exasol table");
    d.set_id(String::new());
    Ok(())
}

/// Adopts an existing table identified as `schema.table`.
pub async fn import<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let supplied = d.id().to_string();
    let (schema, table) = split_identity(&supplied)?;
    let id = qualified_name(schema, table);

    let mut guard = gate.acquire("import").await;
    if !table_exists(guard.session(), schema, table).await? {
        return Err(ExasolError::NotFound {
            kind: ObjectKind::Table,
            name: id,
        });
    }
    commit(guard.session()).await?;
    guard.release();

    info!(%id, "imported exasol table");
    d.set("schema", Datum::from(canonical_name(schema)));
    d.set("name", Datum::from(canonical_name(table)));
    d.set_id(id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemSession;
    use crate::{CatalogRow, MemResourceData};

    #[test]
    fn test_split_identity() {
        assert_eq!(split_identity("s.t").unwrap(), ("s", "t"));
        assert!(split_identity("t").is_err());
        assert!(split_identity(".t").is_err());
        assert!(split_identity("s.").is_err());
    }

    #[tokio::test]
    async fn test_create() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new()
            .with_field("schema", "s")
            .with_field("name", "t")
            .with_field("composite", "A VARCHAR(20) NULL,\n");

        create(&gate, &mut d).await.unwrap();
        assert_eq!(
            session.executed(),
            vec!["CREATE TABLE S.T (A VARCHAR(20) NULL)"]
        );
        assert_eq!(d.id(), "S.T");
    }

    #[tokio::test]
    async fn test_read_missing_table() {
        let gate = ConnectionGatekeeper::new(MemSession::new());
        let mut d = MemResourceData::new()
            .with_field("schema", "s")
            .with_field("name", "t");
        let err = read(&gate, &mut d).await.unwrap_err();
        assert_eq!(err.to_string(), "Table S.T not found");
    }

    #[tokio::test]
    async fn test_rename() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new()
            .with_field("schema", "s")
            .with_field("name", "t")
            .with_id("S.T");
        d.plan("name", "u");

        update(&gate, &mut d).await.unwrap();
        assert_eq!(session.executed(), vec!["RENAME TABLE S.T TO u"]);
        assert_eq!(d.id(), "S.U");
    }

    #[tokio::test]
    async fn test_schema_change_rejected() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new()
            .with_field("schema", "s")
            .with_field("name", "t");
        d.plan("schema", "other");

        assert!(update(&gate, &mut d).await.is_err());
        assert!(session.executed().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());

        let mut d = MemResourceData::new()
            .with_field("schema", "s")
            .with_field("name", "t")
            .with_id("S.T");
        delete(&gate, &mut d).await.unwrap();
        assert_eq!(d.id(), "");

        let mut d = MemResourceData::new()
            .with_field("schema", "reporting")
            .with_field("name", "events");
        delete(&gate, &mut d).await.unwrap();
        assert_eq!(d.id(), "");

        assert_eq!(
            session.executed(),
            vec!["DROP TABLE S.T", "DROP TABLE REPORTING.EVENTS"]
        );
        assert_eq!(session.commits(), 2);
    }

    #[tokio::test]
    async fn test_import() {
        let session = MemSession::new();
        session.respond_with_params(
            "SELECT COLUMN_NAME FROM EXA_ALL_COLUMNS",
            vec![Datum::from("S"), Datum::from("T")],
            vec![CatalogRow::from([Datum::from("A")])],
        );
        let gate = ConnectionGatekeeper::new(session.clone());

        let mut d = MemResourceData::new().with_id("s.t");
        import(&gate, &mut d).await.unwrap();
        assert_eq!(d.id(), "S.T");
        assert_eq!(d.get("schema"), Some(Datum::from("S")));

        let mut d = MemResourceData::new().with_id("s.missing");
        let err = import(&gate, &mut d).await.unwrap_err();
        assert_eq!(err.to_string(), "Table S.MISSING not found");
    }
}
