//! Pre-update interceptor for the `version` field.
//!
//! Clients may never set `version`. Before every partial update the guard
//! strips any client-supplied value and adds an increment of exactly one, so
//! the stored counter only moves forward, one step per accepted update.
//!
//! This is a counter, not a compare-and-swap: two concurrent updates both
//! succeed and both increment.

use eagle_core::keys::VERSION;
use serde_json::{Map, Value};

pub const SET: &str = "$set";
pub const SET_ON_INSERT: &str = "$setOnInsert";
pub const UNSET: &str = "$unset";
pub const INC: &str = "$inc";

/// Operator groups the guard strips `version` from.
const GUARDED_GROUPS: [&str; 3] = [SET, SET_ON_INSERT, UNSET];

/// Strip client-supplied `version` values and force `$inc: { version: 1 }`.
///
/// Groups emptied by the strip are removed. Existing `$inc` entries for
/// other fields are kept. A non-object `$inc` is left for the update parser
/// to reject.
pub fn guard_version(update: &mut Map<String, Value>) {
    update.remove(VERSION);

    for group in GUARDED_GROUPS {
        let emptied = match update.get_mut(group) {
            Some(Value::Object(fields)) => {
                fields.remove(VERSION);
                fields.is_empty()
            }
            _ => false,
        };
        if emptied {
            update.remove(group);
        }
    }

    match update
        .entry(INC)
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(inc) => {
            inc.insert(VERSION.to_string(), Value::from(1));
        }
        other => {
            tracing::debug!(inc = %other, "leaving malformed $inc for the update parser");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn guarded(update: Value) -> Value {
        let Value::Object(mut map) = update else {
            panic!("test payloads are objects");
        };
        guard_version(&mut map);
        Value::Object(map)
    }

    #[test]
    fn strips_version_from_set_and_adds_increment() {
        assert_eq!(
            guarded(json!({"$set": {"title": "x", "version": 99}})),
            json!({"$set": {"title": "x"}, "$inc": {"version": 1}})
        );
    }

    #[rstest]
    #[case::top_level(json!({"title": "x", "version": 7}), json!({"title": "x", "$inc": {"version": 1}}))]
    #[case::emptied_set(json!({"$set": {"version": 7}}), json!({"$inc": {"version": 1}}))]
    #[case::set_on_insert(
        json!({"$setOnInsert": {"version": 3, "name": "n"}}),
        json!({"$setOnInsert": {"name": "n"}, "$inc": {"version": 1}})
    )]
    #[case::emptied_set_on_insert(json!({"$setOnInsert": {"version": 3}}), json!({"$inc": {"version": 1}}))]
    #[case::unset(json!({"$unset": {"version": ""}}), json!({"$inc": {"version": 1}}))]
    #[case::everywhere(
        json!({"version": 1, "$set": {"version": 2}, "$setOnInsert": {"version": 3}}),
        json!({"$inc": {"version": 1}})
    )]
    #[case::empty(json!({}), json!({"$inc": {"version": 1}}))]
    fn guard_cases(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(guarded(input), expected);
    }

    #[test]
    fn merges_with_existing_increments() {
        assert_eq!(
            guarded(json!({"$inc": {"commentIdCount": 1}})),
            json!({"$inc": {"commentIdCount": 1, "version": 1}})
        );
    }

    #[test]
    fn client_increment_of_version_is_overridden() {
        assert_eq!(
            guarded(json!({"$inc": {"version": 50}})),
            json!({"$inc": {"version": 1}})
        );
    }

    #[test]
    fn malformed_inc_is_left_alone() {
        assert_eq!(
            guarded(json!({"$inc": 5, "$set": {"version": 9}})),
            json!({"$inc": 5})
        );
    }

    #[test]
    fn idempotent() {
        let once = guarded(json!({"$set": {"a": 1, "version": 4}}));
        assert_eq!(guarded(once.clone()), once);
    }
}
