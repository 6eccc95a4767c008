// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{CatalogRow, Config, Datum};

/// A stateful session with an Exasol database.
///
/// This is the boundary to the wire client. A session carries state (the
/// current schema, an open transaction), so it must never be driven by two
/// operations at once; see [`crate::ConnectionGatekeeper`].
#[async_trait]
pub trait Session: Debug + Send {
    /// Executes a statement and returns the number of affected rows.
    ///
    /// `schema`, if given, is the schema the statement is evaluated in.
    async fn execute(
        &mut self,
        stmt: &str,
        params: &[Datum],
        schema: Option<&str>,
    ) -> Result<u64, anyhow::Error>;

    /// Executes a query and returns all of its rows.
    async fn fetch_rows(
        &mut self,
        stmt: &str,
        params: &[Datum],
        schema: Option<&str>,
    ) -> Result<Vec<CatalogRow>, anyhow::Error>;

    /// Commits the session's open transaction.
    async fn commit(&mut self) -> Result<(), anyhow::Error>;
}

/// Opens [`Session`]s from a [`Config`].
#[async_trait]
pub trait Connector: Debug + Send + Sync {
    type Session: Session;

    async fn connect(&self, config: &Config) -> Result<Self::Session, anyhow::Error>;
}
