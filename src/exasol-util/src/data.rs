// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Access to the declared state of a managed object.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::Datum;

/// The declared state of one managed object, as seen by a reconciler.
///
/// Implemented by the host binding for real objects and by
/// [`MemResourceData`] for tests.
pub trait ResourceData: Debug + Send {
    /// Returns the declared value of `field`, if set.
    fn get(&self, field: &str) -> Option<Datum>;

    /// Returns the `(old, new)` values of `field` if the declaration changed
    /// it since the last apply.
    fn changed(&self, field: &str) -> Option<(Datum, Datum)>;

    /// Records `value` as the current value of `field`.
    fn set(&mut self, field: &str, value: Datum);

    /// The tracked identity; empty when the object is not tracked.
    fn id(&self) -> &str;

    /// Replaces the tracked identity. An empty string drops the object.
    fn set_id(&mut self, id: String);
}

/// An in-memory [`ResourceData`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemResourceData {
    id: String,
    fields: BTreeMap<String, Datum>,
    /// Values of fields before the pending change, keyed like `fields`.
    prior: BTreeMap<String, Datum>,
}

impl MemResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: &str, value: impl Into<Datum>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Declares a new value for `field`, remembering the old one so that
    /// [`ResourceData::changed`] reports it.
    pub fn plan(&mut self, field: &str, value: impl Into<Datum>) {
        let old = self.fields.get(field).cloned().unwrap_or(Datum::Null);
        self.prior.entry(field.to_string()).or_insert(old);
        self.fields.insert(field.to_string(), value.into());
    }
}

impl ResourceData for MemResourceData {
    fn get(&self, field: &str) -> Option<Datum> {
        self.fields.get(field).cloned()
    }

    fn changed(&self, field: &str) -> Option<(Datum, Datum)> {
        let old = self.prior.get(field)?;
        let new = self.fields.get(field).cloned().unwrap_or(Datum::Null);
        (*old != new).then(|| (old.clone(), new))
    }

    fn set(&mut self, field: &str, value: Datum) {
        self.prior.remove(field);
        self.fields.insert(field.to_string(), value);
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_and_changed() {
        let mut d = MemResourceData::new().with_field("name", "old");
        assert_eq!(d.changed("name"), None);

        d.plan("name", "mid");
        d.plan("name", "new");
        assert_eq!(
            d.changed("name"),
            Some((Datum::from("old"), Datum::from("new")))
        );

        d.set("name", Datum::from("new"));
        assert_eq!(d.changed("name"), None);
        assert_eq!(d.get("name"), Some(Datum::from("new")));
    }

    #[test]
    fn test_plan_same_value_is_unchanged() {
        let mut d = MemResourceData::new().with_field("name", "same");
        d.plan("name", "same");
        assert_eq!(d.changed("name"), None);
    }

    #[test]
    fn test_plan_new_field() {
        let mut d = MemResourceData::new();
        d.plan("password", "secret");
        assert_eq!(
            d.changed("password"),
            Some((Datum::Null, Datum::from("secret")))
        );
    }
}
