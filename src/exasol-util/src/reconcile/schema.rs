// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Physical (non-virtual) schemas.

use crate::argument;
use crate::reconcile::{ObjectKind, apply_update, named};
use crate::{ConnectionGatekeeper, ExasolError, ResourceData, Session};

pub async fn create<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let name = argument::name(d)?;
    named::create(gate, ObjectKind::Schema, d, &name, "").await
}

/// Also serves the schema data source, which only checks existence.
pub async fn read<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::read(gate, ObjectKind::Schema, d).await?;
    Ok(())
}

pub async fn update<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let plan = named::plan_rename(d)?;
    apply_update(gate, ObjectKind::Schema, d, plan).await
}

pub async fn delete<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::delete(gate, ObjectKind::Schema, d).await
}

pub async fn import<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::import(gate, ObjectKind::Schema, d).await?;
    Ok(())
}
