//! Partial-update payloads.
//!
//! Supported operators: `$set`, `$setOnInsert`, `$unset`, `$inc`. Top-level
//! keys without a `$` prefix are treated as `$set`. Paths are top-level field
//! names; dotted paths are stored as literal keys.
//!
//! Parsing happens after the version guard has run, so `version` can only
//! appear as the guard's own `$inc` entry.

use eagle_core::keys;
use eagle_schema::version_guard::{INC, SET, SET_ON_INSERT, UNSET};
use serde_json::{Map, Number, Value};

use crate::error::DatabaseError;

/// Result of a partial update. `modified` includes version-only writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Create a document when nothing matches.
    pub upsert: bool,
}

impl UpdateOptions {
    #[must_use]
    pub const fn upsert() -> Self {
        Self { upsert: true }
    }
}

/// A parsed update payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOps {
    set: Map<String, Value>,
    set_on_insert: Map<String, Value>,
    unset: Vec<String>,
    inc: Map<String, Value>,
}

impl UpdateOps {
    /// Parse a guarded payload.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidUpdate` for unknown operators, operator
    /// groups that are not objects, non-numeric increments, or writes to `_id`.
    pub fn parse(payload: Map<String, Value>) -> Result<Self, DatabaseError> {
        let mut ops = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                SET => ops.set.extend(group(&key, value)?),
                SET_ON_INSERT => ops.set_on_insert.extend(group(&key, value)?),
                UNSET => ops.unset.extend(group(&key, value)?.into_iter().map(|(k, _)| k)),
                INC => {
                    for (field, amount) in group(&key, value)? {
                        if !amount.is_number() {
                            return Err(DatabaseError::InvalidUpdate(format!(
                                "$inc.{field} must be a number, got {amount}"
                            )));
                        }
                        ops.inc.insert(field, amount);
                    }
                }
                op if op.starts_with('$') => {
                    return Err(DatabaseError::InvalidUpdate(format!(
                        "unsupported operator '{op}'"
                    )));
                }
                _ => {
                    ops.set.insert(key, value);
                }
            }
        }

        let touches_id = ops.set.contains_key(keys::ID)
            || ops.set_on_insert.contains_key(keys::ID)
            || ops.inc.contains_key(keys::ID)
            || ops.unset.iter().any(|k| k == keys::ID);
        if touches_id {
            return Err(DatabaseError::InvalidUpdate("_id is immutable".into()));
        }
        Ok(ops)
    }

    /// Remove and return the `version` increment; the store applies it in SQL.
    pub fn take_version_increment(&mut self) -> i64 {
        self.inc
            .remove(keys::VERSION)
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    /// Apply to a body. `$setOnInsert` only applies when `inserting`.
    pub fn apply(&self, body: &mut Map<String, Value>, inserting: bool) {
        for (key, value) in &self.set {
            body.insert(key.clone(), value.clone());
        }
        if inserting {
            for (key, value) in &self.set_on_insert {
                body.insert(key.clone(), value.clone());
            }
        }
        for key in &self.unset {
            body.remove(key);
        }
        for (key, amount) in &self.inc {
            let current = body.get(key).cloned().unwrap_or_else(|| Value::from(0));
            body.insert(key.clone(), add(&current, amount));
        }
    }
}

fn group(op: &str, value: Value) -> Result<Map<String, Value>, DatabaseError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::InvalidUpdate(format!(
            "{op} must be an object, got {other}"
        ))),
    }
}

/// Integer addition when both sides are integers, float otherwise. A
/// non-numeric current value is replaced by the increment.
fn add(current: &Value, amount: &Value) -> Value {
    if let (Some(a), Some(b)) = (current.as_i64(), amount.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Value::from(sum);
        }
    }
    match (current.as_f64(), amount.as_f64()) {
        (Some(a), Some(b)) => Number::from_f64(a + b).map_or(Value::Null, Value::Number),
        _ => amount.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(value: Value) -> Result<UpdateOps, DatabaseError> {
        let Value::Object(map) = value else {
            panic!("test payloads are objects");
        };
        UpdateOps::parse(map)
    }

    fn body(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("test bodies are objects");
        };
        map
    }

    #[test]
    fn bare_fields_are_set() {
        let ops = parse(json!({"title": "x", "$set": {"status": "open"}})).unwrap();
        let mut doc = body(json!({"title": "old"}));
        ops.apply(&mut doc, false);
        assert_eq!(Value::Object(doc), json!({"title": "x", "status": "open"}));
    }

    #[test]
    fn set_on_insert_only_when_inserting() {
        let ops = parse(json!({"$setOnInsert": {"dateAdded": "2024-01-01T00:00:00Z"}})).unwrap();
        let mut existing = Map::new();
        ops.apply(&mut existing, false);
        assert!(existing.is_empty());

        let mut inserted = Map::new();
        ops.apply(&mut inserted, true);
        assert_eq!(inserted["dateAdded"], json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn unset_and_inc() {
        let ops = parse(json!({"$unset": {"notes": ""}, "$inc": {"count": 2, "score": 0.5}})).unwrap();
        let mut doc = body(json!({"notes": "n", "count": 1, "score": 1}));
        ops.apply(&mut doc, false);
        assert_eq!(Value::Object(doc), json!({"count": 3, "score": 1.5}));
    }

    #[test]
    fn inc_of_missing_field_starts_at_zero() {
        let ops = parse(json!({"$inc": {"commentIdCount": 1}})).unwrap();
        let mut doc = Map::new();
        ops.apply(&mut doc, false);
        assert_eq!(doc["commentIdCount"], json!(1));
    }

    #[test]
    fn version_increment_is_taken_out() {
        let mut ops = parse(json!({"$inc": {"version": 1, "count": 1}})).unwrap();
        assert_eq!(ops.take_version_increment(), 1);
        assert_eq!(ops.take_version_increment(), 0);

        let mut doc = body(json!({"version": 4}));
        ops.apply(&mut doc, false);
        assert_eq!(doc["version"], json!(4));
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(parse(json!({"$push": {"a": 1}})).is_err());
        assert!(parse(json!({"$set": 1})).is_err());
        assert!(parse(json!({"$inc": {"a": "1"}})).is_err());
        assert!(parse(json!({"$inc": 5})).is_err());
        assert!(parse(json!({"$set": {"_id": "other"}})).is_err());
    }
}
