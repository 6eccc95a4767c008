// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Extraction and validation of declared fields.
//!
//! Everything here runs before a session is acquired.

use crate::{Datum, ExasolError, ResourceData};

/// Returns the required, non-empty text field `field`.
pub fn required_str(d: &dyn ResourceData, field: &str) -> Result<String, ExasolError> {
    match optional_str(d, field)? {
        Some(value) => Ok(value),
        None => Err(ExasolError::validation(field, "must be set")),
    }
}

/// Returns the text field `field`, treating empty strings as unset.
pub fn optional_str(d: &dyn ResourceData, field: &str) -> Result<Option<String>, ExasolError> {
    match d.get(field) {
        None | Some(Datum::Null) => Ok(None),
        Some(Datum::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Datum::Text(s)) => Ok(Some(s)),
        Some(other) => Err(ExasolError::validation(
            field,
            format!("expected a string, found {other}"),
        )),
    }
}

/// Returns the object's declared name.
pub fn name(d: &dyn ResourceData) -> Result<String, ExasolError> {
    required_str(d, "name")
}

/// Returns the text of a changed field, the way [`ResourceData::changed`]
/// reports it.
pub(crate) fn changed_str(
    d: &dyn ResourceData,
    field: &str,
) -> Result<Option<(String, String)>, ExasolError> {
    let Some((old, new)) = d.changed(field) else {
        return Ok(None);
    };
    let text = |datum: Datum| match datum {
        Datum::Text(s) => Ok(s),
        Datum::Null => Ok(String::new()),
        other => Err(ExasolError::validation(
            field,
            format!("expected a string, found {other}"),
        )),
    };
    Ok(Some((text(old)?, text(new)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemResourceData;

    #[test]
    fn test_name() {
        let d = MemResourceData::new().with_field("name", "myschema");
        assert_eq!(name(&d).unwrap(), "myschema");
    }

    #[test]
    fn test_name_missing_or_empty() {
        for d in [
            MemResourceData::new(),
            MemResourceData::new().with_field("name", ""),
            MemResourceData::new().with_field("name", "   "),
            MemResourceData::new().with_field("name", Datum::Null),
        ] {
            match name(&d) {
                Err(ExasolError::Validation { field, .. }) => assert_eq!(field, "name"),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_name_wrong_type() {
        let d = MemResourceData::new().with_field("name", 42.0);
        let err = name(&d).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument 'name': expected a string, found 42"
        );
    }

    #[test]
    fn test_changed_str() {
        let mut d = MemResourceData::new().with_field("name", "a");
        assert_eq!(changed_str(&d, "name").unwrap(), None);
        d.plan("name", "b");
        assert_eq!(
            changed_str(&d, "name").unwrap(),
            Some(("a".to_string(), "b".to_string()))
        );
    }
}
