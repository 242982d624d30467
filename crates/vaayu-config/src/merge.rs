//! Recursive merge helpers for config namespaces.

use serde_yaml::{Mapping, Value};

/// Merge overlay values into the base, recursively overriding mappings.
///
/// Non-mapping values (sequences included) are replaced wholesale so that
/// list-merge semantics stay unambiguous.
pub(crate) fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            merge_mappings(base_map, overlay_map);
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// Merge overlay entries into a base mapping, recursing into shared keys.
pub(crate) fn merge_mappings(base: &mut Mapping, overlay: &Mapping) {
    for (key, value) in overlay {
        match base.get_mut(key) {
            Some(existing) => merge_values(existing, value),
            None => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
