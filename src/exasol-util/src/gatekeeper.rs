// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Exclusive access to the one shared Exasol session.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::{Config, Connector, ExasolError, Session};

/// Owns the session that every reconciler operation shares.
///
/// Only one operation may use the session at a time, reads included: the
/// session tracks a current schema and an open transaction that concurrent
/// use would corrupt. Access is handed out as a [`SessionGuard`], which
/// releases the session when dropped, so early returns and panics cannot
/// leave it locked.
pub struct ConnectionGatekeeper<S> {
    session: Arc<Mutex<S>>,
}

impl<S: Session> ConnectionGatekeeper<S> {
    pub fn new(session: S) -> Self {
        ConnectionGatekeeper {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Opens the shared session using `connector`.
    pub async fn connect<C>(connector: &C, config: &Config) -> Result<Self, ExasolError>
    where
        C: Connector<Session = S>,
    {
        config.validate()?;
        debug!(address = %config.address(), username = config.username(), "connecting to exasol");
        let session = connector
            .connect(config)
            .await
            .map_err(ExasolError::Connect)?;
        Ok(Self::new(session))
    }

    /// Waits until no other operation holds the session, then returns
    /// exclusive access to it.
    ///
    /// There is no timeout; cancellation is left to the caller.
    pub async fn acquire(&self, operation: &'static str) -> SessionGuard<S> {
        let guard = Arc::clone(&self.session).lock_owned().await;
        debug!(operation, "acquired exasol session");
        SessionGuard { guard, operation }
    }
}

impl<S> Clone for ConnectionGatekeeper<S> {
    fn clone(&self) -> Self {
        ConnectionGatekeeper {
            session: Arc::clone(&self.session),
        }
    }
}

impl<S> fmt::Debug for ConnectionGatekeeper<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionGatekeeper")
            .field("locked", &self.session.try_lock().is_err())
            .finish()
    }
}

/// Exclusive access to the shared session, released on drop.
pub struct SessionGuard<S> {
    guard: OwnedMutexGuard<S>,
    operation: &'static str,
}

impl<S> SessionGuard<S> {
    pub fn session(&mut self) -> &mut S {
        &mut self.guard
    }

    /// Releases the session. Equivalent to dropping the guard.
    pub fn release(self) {}
}

impl<S> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.guard
    }
}

impl<S> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.guard
    }
}

impl<S> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        debug!(operation = self.operation, "released exasol session");
    }
}

impl<S> fmt::Debug for SessionGuard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGuard")
            .field("operation", &self.operation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::mem::MemSession;

    #[tokio::test]
    async fn test_release_on_drop() {
        let gate = ConnectionGatekeeper::new(MemSession::new());
        {
            let _guard = gate.acquire("first").await;
            assert!(format!("{gate:?}").contains("locked: true"));
        }
        let guard = gate.acquire("second").await;
        guard.release();
        assert!(format!("{gate:?}").contains("locked: false"));
    }

    #[tokio::test]
    async fn test_release_on_panic() {
        let gate = ConnectionGatekeeper::new(MemSession::new());
        let task_gate = gate.clone();
        let res = tokio::spawn(async move {
            let _guard = task_gate.acquire("panicking").await;
            panic!("operation failed mid-flight");
        })
        .await;
        assert!(res.is_err());

        let acquired = tokio::time::timeout(Duration::from_secs(5), gate.acquire("after")).await;
        assert!(acquired.is_ok(), "session was not released after a panic");
    }

    #[tokio::test]
    async fn test_acquire_blocks_while_held() {
        let gate = ConnectionGatekeeper::new(MemSession::new());
        let guard = gate.acquire("holder").await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), gate.acquire("waiter")).await;
        assert!(blocked.is_err());
        drop(guard);
        let _guard = gate.acquire("waiter").await;
    }
}
