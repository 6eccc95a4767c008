// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The lifecycle shared by objects identified by a single name: schemas,
//! roles, users and connections.

use tracing::{info, warn};

use crate::argument::{self, changed_str};
use crate::query::{commit, execute, query};
use crate::reconcile::{ObjectKind, UpdatePlan};
use crate::{
    CatalogRow, ConnectionGatekeeper, Datum, ExasolError, ResourceData, SYS_SCHEMA, Session,
    canonical_name,
};

/// Finds the catalog row for `name`, matching case-insensitively.
pub(crate) async fn lookup<S: Session + ?Sized>(
    session: &mut S,
    kind: ObjectKind,
    name: &str,
) -> Result<Option<CatalogRow>, ExasolError> {
    let Some(stmt) = kind.lookup_query() else {
        return Err(ExasolError::validation(
            "kind",
            format!("{} objects are not looked up by name", kind.noun()),
        ));
    };
    let mut rows = query(session, stmt, &[Datum::from(name)], Some(SYS_SCHEMA)).await?;
    if rows.len() > 1 {
        warn!(%kind, %name, rows = rows.len(), "catalog returned multiple rows for one name");
    }
    Ok(if rows.is_empty() {
        None
    } else {
        Some(rows.swap_remove(0))
    })
}

/// The name a read should look for: the declared name if there is one,
/// otherwise the tracked identity.
fn lookup_name(d: &dyn ResourceData) -> Result<String, ExasolError> {
    if let Some(name) = argument::optional_str(d, "name")? {
        return Ok(name);
    }
    if !d.id().is_empty() {
        return Ok(d.id().to_string());
    }
    Err(ExasolError::validation("name", "must be set"))
}

/// Issues `CREATE <kind> <name><clause>` and tracks the object.
///
/// There is no existence check; creating an existing object fails in the
/// database.
pub(crate) async fn create<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    kind: ObjectKind,
    d: &mut dyn ResourceData,
    name: &str,
    clause: &str,
) -> Result<(), ExasolError> {
    let mut stmt = format!("CREATE {kind} {name}");
    if !clause.is_empty() {
        stmt.push(' ');
        stmt.push_str(clause);
    }

    let mut guard = gate.acquire("create").await;
    execute(guard.session(), &stmt, None).await?;
    commit(guard.session()).await?;
    guard.release();

    let id = canonical_name(name);
    info!(%kind, %id, "created exasol object");
    d.set_id(id);
    Ok(())
}

/// Confirms the object still exists and returns its catalog row.
///
/// Returns [`ExasolError::NotFound`] when it does not, in which case the
/// caller should stop tracking it.
pub(crate) async fn read<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    kind: ObjectKind,
    d: &mut dyn ResourceData,
) -> Result<CatalogRow, ExasolError> {
    let name = lookup_name(d)?;

    let mut guard = gate.acquire("read").await;
    let row = lookup(guard.session(), kind, &name).await?;
    guard.release();

    let Some(row) = row else {
        warn!(%kind, %name, "exasol object disappeared from the catalog");
        return Err(ExasolError::NotFound {
            kind,
            name: canonical_name(&name),
        });
    };
    if d.get("name").is_none() {
        d.set("name", Datum::from(row.text(0)?));
    }
    d.set_id(canonical_name(&name));
    Ok(row)
}

/// Plans a rename when the declared name changed.
pub(crate) fn plan_rename(d: &dyn ResourceData) -> Result<UpdatePlan, ExasolError> {
    let mut plan = UpdatePlan::default();
    if let Some((old, new)) = changed_str(d, "name")? {
        if new.trim().is_empty() {
            return Err(ExasolError::validation("name", "must be set"));
        }
        plan.identity = Some(canonical_name(&new));
        plan.acknowledged.push(("name".into(), Datum::from(new.as_str())));
        plan.rename = Some((old, new));
    }
    Ok(plan)
}

/// Drops the tracked object and stops tracking it.
///
/// Dropping an object that no longer exists surfaces the database's error.
pub(crate) async fn delete<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    kind: ObjectKind,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let id = if d.id().is_empty() {
        canonical_name(&argument::name(d)?)
    } else {
        d.id().to_string()
    };

    let mut guard = gate.acquire("delete").await;
    execute(guard.session(), &format!("DROP {kind} {id}"), None).await?;
    commit(guard.session()).await?;
    guard.release();

    info!(%kind, %id, "dropped exasol object");
    d.set_id(String::new());
    Ok(())
}

/// Adopts an existing object whose name is the supplied identity.
pub(crate) async fn import<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    kind: ObjectKind,
    d: &mut dyn ResourceData,
) -> Result<CatalogRow, ExasolError> {
    let id = canonical_name(d.id());
    if id.trim().is_empty() {
        return Err(ExasolError::validation("id", "must be set"));
    }

    let mut guard = gate.acquire("import").await;
    let Some(row) = lookup(guard.session(), kind, &id).await? else {
        return Err(ExasolError::NotFound { kind, name: id });
    };
    commit(guard.session()).await?;
    guard.release();

    info!(%kind, %id, "imported exasol object");
    d.set("name", Datum::from(row.text(0)?));
    d.set_id(id);
    Ok(row)
}
