//! Field presence checks shared by the record types.
//!
//! A field counts as set when it differs from its zero value, so records
//! decoded from JSON with a field omitted fail `required`.

use chrono::{DateTime, Utc};

use crate::error_handling::ValidationError;

/// Values that have a meaningful "not set" state.
pub(crate) trait IsSet {
    fn is_set(&self) -> bool;
}

impl IsSet for String {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl IsSet for i32 {
    fn is_set(&self) -> bool {
        *self != 0
    }
}

impl IsSet for i64 {
    fn is_set(&self) -> bool {
        *self != 0
    }
}

impl IsSet for f64 {
    fn is_set(&self) -> bool {
        *self != 0.0
    }
}

impl IsSet for Option<DateTime<Utc>> {
    fn is_set(&self) -> bool {
        self.is_some()
    }
}

pub(crate) fn required<V: IsSet>(field: &'static str, value: &V) -> Result<(), ValidationError> {
    if value.is_set() {
        Ok(())
    } else {
        Err(ValidationError::MissingField(field))
    }
}

/// Server-managed fields (ids, timestamps) must be left empty by clients.
pub(crate) fn must_be_empty<V: IsSet>(
    field: &'static str,
    value: &V,
) -> Result<(), ValidationError> {
    if value.is_set() {
        Err(ValidationError::UnexpectedField(field))
    } else {
        Ok(())
    }
}
