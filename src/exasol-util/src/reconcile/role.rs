// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Roles.

use crate::argument;
use crate::reconcile::{ObjectKind, apply_update, named};
use crate::{ConnectionGatekeeper, ExasolError, ResourceData, Session};

pub async fn create<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let name = argument::name(d)?;
    named::create(gate, ObjectKind::Role, d, &name, "").await
}

pub async fn read<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::read(gate, ObjectKind::Role, d).await?;
    Ok(())
}

pub async fn update<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let plan = named::plan_rename(d)?;
    apply_update(gate, ObjectKind::Role, d, plan).await
}

pub async fn delete<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::delete(gate, ObjectKind::Role, d).await
}

pub async fn import<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::import(gate, ObjectKind::Role, d).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemSession;
    use crate::{CatalogRow, Datum, MemResourceData};

    #[tokio::test]
    async fn test_import_normalizes_case() {
        let session = MemSession::new();
        session.respond_with_params(
            "EXA_ALL_ROLES",
            vec![Datum::from("ADMIN")],
            vec![CatalogRow::from([Datum::from("ADMIN")])],
        );
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new().with_id("admin");

        import(&gate, &mut d).await.unwrap();
        assert_eq!(d.id(), "ADMIN");
        assert_eq!(d.get("name"), Some(Datum::from("ADMIN")));
        assert_eq!(session.commits(), 1);
        assert_eq!(session.queried()[0].params, vec![Datum::from("ADMIN")]);
    }

    #[tokio::test]
    async fn test_import_missing() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new().with_id("admin");

        match import(&gate, &mut d).await {
            Err(ExasolError::NotFound { kind, name }) => {
                assert_eq!(kind, ObjectKind::Role);
                assert_eq!(name, "ADMIN");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(d.id(), "admin");
        assert_eq!(session.commits(), 0);
    }

    #[tokio::test]
    async fn test_update_without_change_is_noop() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new().with_field("name", "old").with_id("OLD");
        d.plan("name", "old");

        update(&gate, &mut d).await.unwrap();
        assert!(session.executed().is_empty());
        assert!(session.queried().is_empty());
        assert_eq!(session.commits(), 0);
    }
}
