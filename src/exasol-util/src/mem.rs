// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! In-memory implementations for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::{CatalogRow, Config, Connector, Datum, Session};

#[derive(Debug)]
struct Rule {
    fragment: String,
    params: Option<Vec<Datum>>,
    rows: Vec<CatalogRow>,
}

impl Rule {
    fn matches(&self, stmt: &str, params: &[Datum]) -> bool {
        if !stmt.contains(&self.fragment) {
            return false;
        }
        match &self.params {
            None => true,
            Some(expected) => {
                expected.len() == params.len()
                    && expected.iter().zip(params).all(|(e, a)| match (e, a) {
                        // The catalog compares names case-insensitively.
                        (Datum::Text(e), Datum::Text(a)) => e.eq_ignore_ascii_case(a),
                        (e, a) => e == a,
                    })
            }
        }
    }
}

/// A statement observed by a [`MemSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub stmt: String,
    pub params: Vec<Datum>,
    pub schema: Option<String>,
}

#[derive(Debug, Default)]
struct MemSessionCore {
    rules: Vec<Rule>,
    failures: Vec<(String, String)>,
    executed: Vec<Recorded>,
    queried: Vec<Recorded>,
    commits: usize,
    delay: Option<Duration>,
}

/// An in-memory [`Session`] with scripted catalog responses.
///
/// Clones share state, so a test can hand one clone to a
/// [`crate::ConnectionGatekeeper`] and inspect the other. Every call records
/// how many calls were in flight at once.
#[derive(Debug, Clone, Default)]
pub struct MemSession {
    core: Arc<Mutex<MemSessionCore>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl MemSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn core(&self) -> MutexGuard<'_, MemSessionCore> {
        // A panicking test already failed; keep the state readable.
        self.core.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Answers any query containing `fragment` with `rows`.
    pub fn respond(&self, fragment: &str, rows: Vec<CatalogRow>) -> &Self {
        self.core().rules.push(Rule {
            fragment: fragment.to_string(),
            params: None,
            rows,
        });
        self
    }

    /// Answers queries containing `fragment` and bound to `params` with
    /// `rows`. Text parameters match case-insensitively.
    pub fn respond_with_params(
        &self,
        fragment: &str,
        params: Vec<Datum>,
        rows: Vec<CatalogRow>,
    ) -> &Self {
        self.core().rules.push(Rule {
            fragment: fragment.to_string(),
            params: Some(params),
            rows,
        });
        self
    }

    /// Fails any statement or query containing `fragment` with `message`.
    pub fn fail_on(&self, fragment: &str, message: &str) -> &Self {
        self.core()
            .failures
            .push((fragment.to_string(), message.to_string()));
        self
    }

    /// Makes every call take at least `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.core().delay = Some(delay);
    }

    /// Statements passed to [`Session::execute`], in order.
    pub fn executed(&self) -> Vec<String> {
        self.core().executed.iter().map(|r| r.stmt.clone()).collect()
    }

    /// Queries passed to [`Session::fetch_rows`], in order.
    pub fn queried(&self) -> Vec<Recorded> {
        self.core().queried.clone()
    }

    pub fn commits(&self) -> usize {
        self.core().commits
    }

    /// The largest number of calls ever observed in flight at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn enter(&self, stmt: &str) -> Result<(), anyhow::Error> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        let delay = self.core().delay;
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        let failure = self
            .core()
            .failures
            .iter()
            .find(|(fragment, _)| stmt.contains(fragment.as_str()))
            .map(|(_, message)| message.clone());
        match failure {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }

    fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn record(stmt: &str, params: &[Datum], schema: Option<&str>) -> Recorded {
        Recorded {
            stmt: stmt.to_string(),
            params: params.to_vec(),
            schema: schema.map(str::to_string),
        }
    }
}

#[async_trait]
impl Session for MemSession {
    async fn execute(
        &mut self,
        stmt: &str,
        params: &[Datum],
        schema: Option<&str>,
    ) -> Result<u64, anyhow::Error> {
        let res = self.enter(stmt).await;
        if res.is_ok() {
            self.core()
                .executed
                .push(Self::record(stmt, params, schema));
        }
        self.exit();
        res.map(|()| 0)
    }

    async fn fetch_rows(
        &mut self,
        stmt: &str,
        params: &[Datum],
        schema: Option<&str>,
    ) -> Result<Vec<CatalogRow>, anyhow::Error> {
        let res = self.enter(stmt).await;
        let rows = res.map(|()| {
            let mut core = self.core();
            core.queried.push(Self::record(stmt, params, schema));
            core.rules
                .iter()
                .find(|rule| rule.matches(stmt, params))
                .map(|rule| rule.rows.clone())
                .unwrap_or_default()
        });
        self.exit();
        rows
    }

    async fn commit(&mut self) -> Result<(), anyhow::Error> {
        let res = self.enter("COMMIT").await;
        if res.is_ok() {
            self.core().commits += 1;
        }
        self.exit();
        res
    }
}

/// A [`Connector`] that hands out clones of one [`MemSession`].
#[derive(Debug, Clone, Default)]
pub struct MemConnector {
    pub session: MemSession,
}

#[async_trait]
impl Connector for MemConnector {
    type Session = MemSession;

    async fn connect(&self, _config: &Config) -> Result<MemSession, anyhow::Error> {
        Ok(self.session.clone())
    }
}
