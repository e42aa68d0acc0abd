//! Two-state resource fields
//!
//! Every field of a resource proxy is either [`Attribute::NotSet`] (never
//! delivered by the server) or [`Attribute::Set`] with a decoded value. A
//! JSON `null` is a delivered value and decodes to `Set(None)`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute<T> {
    NotSet,
    Set(Option<T>),
}

impl<T> Default for Attribute<T> {
    fn default() -> Self {
        Attribute::NotSet
    }
}

impl<T> Attribute<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Attribute::Set(_))
    }

    /// Decoded value; `None` for both `NotSet` and a delivered `null`
    pub fn value(&self) -> Option<&T> {
        match self {
            Attribute::Set(Some(value)) => Some(value),
            _ => None,
        }
    }

    /// Replace the current state only when `patch` carries a decoded value
    pub fn merge(&mut self, patch: Option<Attribute<T>>) {
        if let Some(patch) = patch {
            *self = patch;
        }
    }
}

impl<T: Clone> Attribute<T> {
    pub fn cloned(&self) -> Option<T> {
        self.value().cloned()
    }
}

/// Decode an integer field. `None` means the value was malformed.
pub fn int_attribute(value: &Value) -> Option<Attribute<i64>> {
    match value {
        Value::Null => Some(Attribute::Set(None)),
        Value::Number(n) => n.as_i64().map(|v| Attribute::Set(Some(v))),
        _ => None,
    }
}

/// Decode a string field. `None` means the value was malformed.
pub fn string_attribute(value: &Value) -> Option<Attribute<String>> {
    match value {
        Value::Null => Some(Attribute::Set(None)),
        Value::String(s) => Some(Attribute::Set(Some(s.clone()))),
        _ => None,
    }
}

/// Decode a boolean field. `None` means the value was malformed.
pub fn bool_attribute(value: &Value) -> Option<Attribute<bool>> {
    match value {
        Value::Null => Some(Attribute::Set(None)),
        Value::Bool(b) => Some(Attribute::Set(Some(*b))),
        _ => None,
    }
}

/// Decode an ISO 8601 / RFC 3339 timestamp such as `2020-06-10T16:39:23Z`.
pub fn datetime_attribute(value: &Value) -> Option<Attribute<DateTime<Utc>>> {
    match value {
        Value::Null => Some(Attribute::Set(None)),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Attribute::Set(Some(dt.with_timezone(&Utc)))),
        _ => None,
    }
}

/// Merge `attributes[key]` into `field` if the key is present and decodes
pub(crate) fn use_attribute<T>(
    field: &mut Attribute<T>,
    attributes: &Map<String, Value>,
    key: &str,
    decode: fn(&Value) -> Option<Attribute<T>>,
) {
    let Some(raw) = attributes.get(key) else {
        return;
    };
    let decoded = decode(raw);
    if decoded.is_none() {
        tracing::debug!("Ignoring malformed value for {}: {}", key, raw);
    }
    field.merge(decoded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_falsy_values_are_set() {
        assert_eq!(int_attribute(&json!(0)), Some(Attribute::Set(Some(0))));
        assert_eq!(bool_attribute(&json!(false)), Some(Attribute::Set(Some(false))));
        assert_eq!(
            string_attribute(&json!("")),
            Some(Attribute::Set(Some(String::new())))
        );
        assert!(Attribute::Set(Some(0)).is_set());
    }

    #[test]
    fn test_null_is_a_delivered_value() {
        let attr = int_attribute(&Value::Null).unwrap();
        assert!(attr.is_set());
        assert_eq!(attr.value(), None);
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        assert_eq!(int_attribute(&json!("12")), None);
        assert_eq!(int_attribute(&json!(1.5)), None);
        assert_eq!(bool_attribute(&json!(1)), None);
        assert_eq!(string_attribute(&json!(7)), None);
        assert_eq!(datetime_attribute(&json!("yesterday")), None);
    }

    #[test]
    fn test_datetime_parses_github_format() {
        let attr = datetime_attribute(&json!("2020-06-10T16:39:23Z")).unwrap();
        assert_eq!(
            attr.cloned(),
            Some(Utc.with_ymd_and_hms(2020, 6, 10, 16, 39, 23).unwrap())
        );

        let offset = datetime_attribute(&json!("2020-06-10T18:39:23+02:00")).unwrap();
        assert_eq!(offset, attr);
    }

    #[test]
    fn test_merge_keeps_state_without_patch() {
        let mut attr = Attribute::Set(Some(5));
        attr.merge(None);
        assert_eq!(attr.cloned(), Some(5));

        attr.merge(Some(Attribute::Set(Some(6))));
        assert_eq!(attr.cloned(), Some(6));
    }

    #[test]
    fn test_use_attribute_ignores_absent_and_malformed() {
        let mut field = Attribute::Set(Some(5));

        let absent = json!({ "name": "x" });
        use_attribute(&mut field, absent.as_object().unwrap(), "id", int_attribute);
        assert_eq!(field.cloned(), Some(5));

        let malformed = json!({ "id": "abc" });
        use_attribute(&mut field, malformed.as_object().unwrap(), "id", int_attribute);
        assert_eq!(field.cloned(), Some(5));
    }
}
