// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ExasolError;

/// The port Exasol listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8563;

const DEFAULT_USERNAME: &str = "sys";
const DEFAULT_PASSWORD: &str = "exasol";

/// Configuration for Exasol connections.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    username: String,
    #[serde(skip_serializing, default)]
    password: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ExasolError> {
        let config = Config {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from `EXAHOST`, `EXAPORT`, `EXAUID` and
    /// `EXAPWD`.
    ///
    /// Only `EXAHOST` is required; the remaining variables fall back to the
    /// database defaults.
    pub fn from_env() -> Result<Self, ExasolError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ExasolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let host = non_empty("EXAHOST")
            .ok_or_else(|| ExasolError::InvalidConfig("EXAHOST must be set".into()))?;
        let port = match non_empty("EXAPORT") {
            Some(port) => port.parse().map_err(|e| {
                ExasolError::InvalidConfig(format!("invalid EXAPORT {port:?}: {e}"))
            })?,
            None => DEFAULT_PORT,
        };
        let username = non_empty("EXAUID").unwrap_or_else(|| DEFAULT_USERNAME.into());
        let password = non_empty("EXAPWD").unwrap_or_else(|| DEFAULT_PASSWORD.into());

        Self::new(host, port, username, password)
    }

    /// Validates a configuration that did not pass through [`Config::new`],
    /// e.g. one that was deserialized.
    pub fn validate(&self) -> Result<(), ExasolError> {
        if self.host.trim().is_empty() {
            return Err(ExasolError::InvalidConfig("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ExasolError::InvalidConfig("port must not be 0".into()));
        }
        Ok(())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the `host:port` pair to connect to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = Config::from_lookup(lookup(&[("EXAHOST", "10.0.0.1")])).unwrap();
        assert_eq!(config.address(), "10.0.0.1:8563");
        assert_eq!(config.username(), "sys");
        assert_eq!(config.password(), "exasol");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("EXAHOST", "exa.local"),
            ("EXAPORT", "9000"),
            ("EXAUID", "admin"),
            ("EXAPWD", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.address(), "exa.local:9000");
        assert_eq!(config.username(), "admin");
        assert_eq!(config.password(), "secret");
    }

    #[test]
    fn test_from_lookup_errors() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ExasolError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("EXAHOST", "h"), ("EXAPORT", "nope")])),
            Err(ExasolError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::new("h", 0, "u", "p"),
            Err(ExasolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_password_never_leaks() {
        let config = Config::new("h", DEFAULT_PORT, "u", "hunter2").unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));

        let parsed: Config = serde_json::from_str(r#"{"host":"h","username":"u"}"#).unwrap();
        assert_eq!(parsed.port(), DEFAULT_PORT);
        assert_eq!(parsed.password(), "");
        parsed.validate().unwrap();
    }
}
