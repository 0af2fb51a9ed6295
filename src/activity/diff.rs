use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity::{Entity, EntityType};
use super::ActivityError;

/// `field -> {before, after}` for every field an update actually changed.
pub type ChangedFields = BTreeMap<String, FieldChange>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub before: Value,
    pub after: Value,
}

/// Diff a persisted entity, given as JSON, against a proposed update.
///
/// Only fields in the variant's fillable set that are present in `proposed`
/// and differ (loosely) from `current` are reported. Missing fields in
/// `current` compare as `null`.
pub fn compute_diff(
    entity_type: &str,
    current: &Value,
    proposed: &Map<String, Value>,
) -> Result<ChangedFields, ActivityError> {
    let entity_type: EntityType = entity_type.parse()?;
    Ok(diff_fields(entity_type.fillable(), proposed, |name| {
        current.get(name).cloned().unwrap_or(Value::Null)
    }))
}

/// [`compute_diff`] for a typed entity.
pub fn diff_entity<E: Entity>(current: &E, proposed: &Map<String, Value>) -> ChangedFields {
    diff_fields(E::TYPE.fillable(), proposed, |name| {
        current.field(name).unwrap_or(Value::Null)
    })
}

fn diff_fields(
    fillable: &[&str],
    proposed: &Map<String, Value>,
    current: impl Fn(&str) -> Value,
) -> ChangedFields {
    fillable
        .iter()
        .filter_map(|&name| {
            let after = proposed.get(name)?;
            let before = current(name);
            if loosely_equal(&before, after) {
                None
            } else {
                Some((
                    name.to_string(),
                    FieldChange {
                        before,
                        after: after.clone(),
                    },
                ))
            }
        })
        .collect()
}

/// Value equality where numbers compare numerically and a numeric string
/// equals the number it spells.
pub(crate) fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => s
            .trim()
            .parse::<f64>()
            .is_ok_and(|parsed| n.as_f64() == Some(parsed)),
        _ => a == b,
    }
}
