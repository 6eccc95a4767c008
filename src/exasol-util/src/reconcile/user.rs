// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Users authenticated by password.

use crate::argument::{self, changed_str};
use crate::reconcile::{ObjectKind, UpdatePlan, apply_update, named};
use crate::{ConnectionGatekeeper, Datum, ExasolError, ResourceData, Session, quote_password};

fn identified_by(password: &str) -> String {
    format!("IDENTIFIED BY {}", quote_password(password))
}

pub async fn create<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let name = argument::name(d)?;
    // The database refuses users without an authentication clause.
    let password = argument::required_str(d, "password")?;
    named::create(gate, ObjectKind::User, d, &name, &identified_by(&password)).await
}

pub async fn read<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::read(gate, ObjectKind::User, d).await?;
    Ok(())
}

/// Renames the user and changes its password, as declared.
pub fn plan_update(d: &dyn ResourceData) -> Result<UpdatePlan, ExasolError> {
    let mut plan = named::plan_rename(d)?;
    if let Some((_, password)) = changed_str(d, "password")? {
        if password.is_empty() {
            return Err(ExasolError::validation("password", "must be set"));
        }
        let name = match &plan.rename {
            Some((old, _)) => old.clone(),
            None => argument::name(d)?,
        };
        plan.statements
            .push(format!("ALTER USER {name} {}", identified_by(&password)));
        plan.acknowledged
            .push(("password".into(), Datum::from(password)));
    }
    Ok(plan)
}

pub async fn update<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    let plan = plan_update(d)?;
    apply_update(gate, ObjectKind::User, d, plan).await
}

pub async fn delete<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::delete(gate, ObjectKind::User, d).await
}

pub async fn import<S: Session>(
    gate: &ConnectionGatekeeper<S>,
    d: &mut dyn ResourceData,
) -> Result<(), ExasolError> {
    named::import(gate, ObjectKind::User, d).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemResourceData;
    use crate::mem::MemSession;

    #[tokio::test]
    async fn test_create_with_password() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new()
            .with_field("name", "alice")
            .with_field("password", "fo\"o");

        create(&gate, &mut d).await.unwrap();
        assert_eq!(
            session.executed(),
            vec![r#"CREATE USER alice IDENTIFIED BY "fo""o""#]
        );
        assert_eq!(d.id(), "ALICE");
    }

    #[tokio::test]
    async fn test_create_requires_password() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new().with_field("name", "alice");

        match create(&gate, &mut d).await {
            Err(ExasolError::Validation { field, .. }) => assert_eq!(field, "password"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(session.executed().is_empty());
    }

    #[test]
    fn test_plan_rename_and_password() {
        let mut d = MemResourceData::new()
            .with_field("name", "alice")
            .with_field("password", "foo")
            .with_id("ALICE");
        d.plan("name", "alice_renamed");
        d.plan("password", "bar");

        let plan = plan_update(&d).unwrap();
        assert_eq!(
            plan.rename,
            Some(("alice".to_string(), "alice_renamed".to_string()))
        );
        assert_eq!(
            plan.statements,
            vec![r#"ALTER USER alice IDENTIFIED BY "bar""#]
        );
        assert_eq!(plan.identity.as_deref(), Some("ALICE_RENAMED"));
    }

    #[tokio::test]
    async fn test_password_only_update() {
        let session = MemSession::new();
        let gate = ConnectionGatekeeper::new(session.clone());
        let mut d = MemResourceData::new()
            .with_field("name", "alice")
            .with_field("password", "foo")
            .with_id("ALICE");
        d.plan("password", "bar");

        update(&gate, &mut d).await.unwrap();
        assert_eq!(
            session.executed(),
            vec![r#"ALTER USER alice IDENTIFIED BY "bar""#]
        );
        assert_eq!(session.commits(), 1);
        assert_eq!(d.id(), "ALICE");
        assert_eq!(d.changed("password"), None);
    }
}
