// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Connection objects, i.e. stored credentials for external systems.

use crate::argument::{self, changed_str};
use crate::reconcile::{ObjectKind, UpdatePlan, apply_update, named};
use crate::{
    ConnectionGatekeeper, Datum, ExasolError, ResourceData, Session, quote_literal,
};

const FIELDS: [&str; 3] = ["to", "username", "password"];

/// Renders the `TO ... [USER ...] [IDENTIFIED BY ...]` clause shared by
/// `CREATE CONNECTION` and `ALTER CONNECTION`.
fn definition(d: &dyn ResourceData) -> Result<String, ExasolError> {
    let mut clause = format!("TO {}", quote_literal(&argument::required_str(d, "to")?));
    if let Some(username) = argument::optional_str(d, "username")? {
        clause.push_str(&format!(" USER {}", quote_literal(&username)));
    }
    if let Some(password) = argument::optional_str(d, "password")? {
        clause.push_str(&format!(" IDENTIFIED BY {}", quote_literal(&password)));
    }
    Ok(clause)
}

pub async fn create<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let name = argument::name(d)?;
    let clause = definition(d)?;
    named::create(gate, ObjectKind::Connection, d, &name, &clause).await
}

/// Confirms the connection exists and refreshes its target and user.
///
/// The password cannot be read back from the catalog.
pub async fn read<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let row = named::read(gate, ObjectKind::Connection, d).await?;
    d.set("to", Datum::from(row.text(1)?));
    d.set("username", row.opt_text(2)?.map_or(Datum::Null, Datum::from));
    Ok(())
}

/// Renames the connection and redefines it when its target or credentials
/// changed.
pub fn plan_update(d: &dyn ResourceData) -> Result<UpdatePlan, ExasolError> {
    let mut plan = named::plan_rename(d)?;
    let mut redefine = false;
    for field in FIELDS {
        if let Some((_, new)) = changed_str(d, field)? {
            redefine = true;
            let value = if new.is_empty() {
                Datum::Null
            } else {
                Datum::from(new)
            };
            plan.acknowledged.push((field.into(), value));
        }
    }
    if redefine {
        let name = match &plan.rename {
            Some((old, _)) => old.clone(),
            None => argument::name(d)?,
        };
        plan.statements
            .push(format!("ALTER CONNECTION {name} {}", definition(d)?));
    }
    Ok(plan)
}

pub async fn update<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let plan = plan_update(d)?;
    apply_update(gate, ObjectKind::Connection, d, plan).await
}

pub async fn delete<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::delete(gate, ObjectKind::Connection, d).await
}

pub async fn import<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let row = named::import(gate, ObjectKind::Connection, d).await?;
    d.set("to", Datum::from(row.text(1)?));
    d.set("username", row.opt_text(2)?.map_or(Datum::Null, Datum::from));
    Ok(())
}
