use chrono::{DateTime, Utc};
use eagle_core::document::Document;
use eagle_core::field::FieldDescriptor;
use serde_json::Value;

use super::with_permissions;
use crate::definition::EntityDefinition;

#[must_use]
pub fn definition() -> EntityDefinition {
    with_permissions(
        EntityDefinition::new()
            .field("project", FieldDescriptor::reference("Project").indexed())
            .field("dateStarted", FieldDescriptor::date())
            .field("dateCompleted", FieldDescriptor::date())
            .field("instructions", FieldDescriptor::string())
            .field("informationLabel", FieldDescriptor::string())
            .field("milestone", FieldDescriptor::reference("List"))
            .field("openHouses", FieldDescriptor::array().with_default(serde_json::json!([])))
            .field("commentIdCount", FieldDescriptor::number().with_default(0))
            .field("isPublished", FieldDescriptor::boolean().with_default(false)),
    )
    .method("isOpen", |doc: &Document| Value::Bool(is_open_at(doc, Utc::now())))
    .pre_save(check_dates)
}

/// Open between `dateStarted` and `dateCompleted`, inclusive.
pub(crate) fn is_open_at(doc: &Document, now: DateTime<Utc>) -> bool {
    match (date(doc, "dateStarted"), date(doc, "dateCompleted")) {
        (Some(start), Some(end)) => start <= now && now <= end,
        (Some(start), None) => start <= now,
        _ => false,
    }
}

fn check_dates(doc: &mut Document) -> Result<(), String> {
    if let (Some(start), Some(end)) = (date(doc, "dateStarted"), date(doc, "dateCompleted")) {
        if end < start {
            return Err("comment period ends before it starts".to_string());
        }
    }
    Ok(())
}

fn date(doc: &Document, key: &str) -> Option<DateTime<Utc>> {
    doc.get_str(key)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn period(start: &str, end: &str) -> Document {
        Document::new(Map::new())
            .with("dateStarted", start)
            .with("dateCompleted", end)
    }

    #[test]
    fn open_within_window() {
        let doc = period("2024-01-01T00:00:00Z", "2024-02-01T00:00:00Z");
        let inside = DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z").unwrap().with_timezone(&Utc);
        let after = DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z").unwrap().with_timezone(&Utc);
        assert!(is_open_at(&doc, inside));
        assert!(!is_open_at(&doc, after));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let mut doc = period("2024-02-01T00:00:00Z", "2024-01-01T00:00:00Z");
        assert!(check_dates(&mut doc).is_err());
    }
}
