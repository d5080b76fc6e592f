//! Required-field validation driven by entity metadata.

use crate::error::{SqlError, SqlResult};
use crate::metadata::{Entity, metadata_for};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};

/// Messages for every required property that is blank.
///
/// A value is blank when it is null, whitespace-only text, the nil UUID, or the
/// minimum date/datetime (the "never set" default).
pub fn errors<E: Entity>(entity: &E) -> Vec<String> {
    let meta = metadata_for::<E>();
    meta.required_properties()
        .filter(|c| entity.value(&c.property_name).is_none_or(|v| is_blank(&v)))
        .map(|c| {
            format!(
                "'{}' is a required field and must not be blank.",
                c.display_name
            )
        })
        .collect()
}

/// Fails with every message joined by newlines.
pub fn validate<E: Entity>(entity: &E) -> SqlResult<()> {
    let messages = errors(entity);
    if messages.is_empty() {
        Ok(())
    } else {
        Err(SqlError::validation(messages.join("\n")))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.trim().is_empty(),
        Value::Uuid(u) => u.is_nil(),
        Value::Date(d) => *d == NaiveDate::MIN,
        Value::DateTime(dt) => *dt == NaiveDateTime::MIN,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestEntity;

    #[test]
    fn valid_entity_passes() {
        assert!(validate(&TestEntity::new(1, "LAX", 1.0)).is_ok());
    }

    #[test]
    fn blank_required_text_fails_with_display_name() {
        let row = TestEntity::new(1, "   ", 1.0);
        assert_eq!(
            errors(&row),
            vec!["'Airport Code' is a required field and must not be blank.".to_string()]
        );
        let err = validate(&row).unwrap_err();
        assert!(matches!(err, SqlError::Validation(_)));
    }

    #[test]
    fn blank_values() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&Value::Uuid(uuid::Uuid::nil())));
        assert!(is_blank(&Value::DateTime(NaiveDateTime::MIN)));
        assert!(!is_blank(&Value::Int(0)));
        assert!(!is_blank(&Value::from("x")));
    }
}
