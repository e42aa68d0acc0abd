//! Property-based tests using proptest
//!
//! These tests verify the merge semantics of attribute ingestion: every
//! field holds the last well-formed value delivered for it, and keys that
//! are absent or malformed never disturb earlier state.

use ghartifact::resource::{Attribute, ArtifactAttributes, ResourceAttributes};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// One partial server payload: each key present or absent
#[derive(Debug, Clone)]
struct Patch {
    id: Option<i64>,
    name: Option<String>,
    size_in_bytes: Option<i64>,
    expired: Option<bool>,
}

impl Patch {
    fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(id) = self.id {
            map.insert("id".to_string(), Value::from(id));
        }
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::from(name.clone()));
        }
        if let Some(size) = self.size_in_bytes {
            map.insert("size_in_bytes".to_string(), Value::from(size));
        }
        if let Some(expired) = self.expired {
            map.insert("expired".to_string(), Value::from(expired));
        }
        map
    }
}

fn arb_patch() -> impl Strategy<Value = Patch> {
    (
        proptest::option::of(any::<i64>()),
        proptest::option::of("[a-zA-Z0-9 _-]{0,16}"),
        proptest::option::of(0i64..10_000_000),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(id, name, size_in_bytes, expired)| Patch {
            id,
            name,
            size_in_bytes,
            expired,
        })
}

/// Expected state of one field after applying patches in order
fn last_delivered<T: Clone>(values: impl Iterator<Item = Option<T>>) -> Attribute<T> {
    values
        .flatten()
        .last()
        .map(|v| Attribute::Set(Some(v)))
        .unwrap_or(Attribute::NotSet)
}

proptest! {
    /// Each field ends up with the last value delivered for it
    #[test]
    fn fields_hold_last_delivered_value(patches in prop::collection::vec(arb_patch(), 0..20)) {
        let mut attrs = ArtifactAttributes::default();
        for patch in &patches {
            attrs.use_attributes(&patch.to_map());
        }

        prop_assert_eq!(attrs.id.clone(), last_delivered(patches.iter().map(|p| p.id)));
        prop_assert_eq!(attrs.name.clone(), last_delivered(patches.iter().map(|p| p.name.clone())));
        prop_assert_eq!(
            attrs.size_in_bytes.clone(),
            last_delivered(patches.iter().map(|p| p.size_in_bytes))
        );
        prop_assert_eq!(attrs.expired.clone(), last_delivered(patches.iter().map(|p| p.expired)));
        prop_assert!(!attrs.url.is_set());
    }

    /// An empty payload changes nothing
    #[test]
    fn empty_payload_is_identity(patch in arb_patch()) {
        let mut attrs = ArtifactAttributes::default();
        attrs.use_attributes(&patch.to_map());
        let before = attrs.clone();

        attrs.use_attributes(&Map::new());
        prop_assert_eq!(attrs, before);
    }

    /// Wrongly-typed values are ignored rather than clobbering good ones
    #[test]
    fn malformed_values_keep_previous_state(
        patch in arb_patch(),
        junk in "[a-z]{1,8}"
    ) {
        let mut attrs = ArtifactAttributes::default();
        attrs.use_attributes(&patch.to_map());
        let before = attrs.clone();

        let mut malformed = Map::new();
        malformed.insert("id".to_string(), Value::from(junk.clone()));
        malformed.insert("size_in_bytes".to_string(), Value::from(junk.clone()));
        malformed.insert("expired".to_string(), Value::from(junk));
        malformed.insert("name".to_string(), Value::from(42));
        malformed.insert("created_at".to_string(), Value::from("not a date"));
        attrs.use_attributes(&malformed);

        prop_assert_eq!(attrs, before);
    }

    /// Unknown keys are ignored
    #[test]
    fn unknown_keys_are_ignored(key in "[a-z]{3,12}", value in any::<i64>()) {
        prop_assume!(!matches!(
            key.as_str(),
            "id" | "node_id" | "name" | "size_in_bytes" | "url" | "archive_download_url"
                | "expired" | "created_at" | "updated_at" | "expires_at"
        ));

        let mut attrs = ArtifactAttributes::default();
        let mut map = Map::new();
        map.insert(key, Value::from(value));
        attrs.use_attributes(&map);

        prop_assert_eq!(attrs, ArtifactAttributes::default());
    }
}
