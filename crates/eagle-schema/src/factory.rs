//! Schema factory: definition table in, registered entity out.

use std::collections::BTreeMap;
use std::sync::Arc;

use eagle_core::field::FieldDescriptor;
use eagle_core::keys;
use serde_json::{Map, Value, json};

use crate::definition::EntityDefinition;
use crate::error::SchemaError;
use crate::hooks::{AuditSink, PostSaveBehavior};
use crate::schema::{EntitySchema, SchemaStructure};

/// Where audit records go, and which entity is exempt from them.
pub(crate) struct AuditBinding<'a> {
    pub entity_name: &'a str,
    pub sink: &'a Arc<dyn AuditSink>,
}

/// Build a schema from a definition.
///
/// Order matters only for logging; the result is fully determined by the
/// inputs. Failures are configuration errors and are logged here so the
/// caller only has to abort.
pub(crate) fn build(
    name: &str,
    definition: EntityDefinition,
    storage_location: &str,
    audit: &AuditBinding<'_>,
) -> Result<EntitySchema, SchemaError> {
    if name.trim().is_empty() {
        tracing::error!("entity registration without a name");
        return Err(SchemaError::MissingName);
    }
    if definition.is_empty() {
        tracing::error!(entity = name, "entity registration without a definition");
        return Err(SchemaError::MissingDefinition(name.to_string()));
    }
    if storage_location.trim().is_empty() {
        tracing::error!(entity = name, "entity registration without a storage location");
        return Err(SchemaError::MissingLocation(name.to_string()));
    }

    let EntityDefinition {
        mut fields,
        methods,
        virtuals,
        index_hints,
        pre_save,
        post_save,
    } = definition;

    if !index_hints.is_empty() {
        tracing::debug!(
            entity = name,
            hints = index_hints.len(),
            "index hints recorded but not applied"
        );
    }

    fields.insert(
        keys::SCHEMA_NAME.to_string(),
        FieldDescriptor::string().with_default(name).indexed(),
    );

    let is_audit = name == audit.entity_name;
    if !is_audit {
        for key in keys::ACTOR_FIELDS {
            fields.insert(
                key.to_string(),
                FieldDescriptor::string().with_default(keys::DEFAULT_ACTOR),
            );
        }
    }

    let serialize_virtuals = !virtuals.is_empty();

    let post_save = match post_save {
        Some(hook) => PostSaveBehavior::Custom(hook),
        None if is_audit => PostSaveBehavior::None,
        None => PostSaveBehavior::Audit(Arc::clone(audit.sink)),
    };

    let json_schema = body_schema(name, &fields);
    let validator = jsonschema::validator_for(&json_schema)
        .map_err(|e| SchemaError::Generation(format!("{name}: {e}")))?;

    tracing::debug!(
        entity = name,
        location = storage_location,
        fields = fields.len(),
        methods = methods.len(),
        virtuals = virtuals.len(),
        post_save = post_save.as_str(),
        "entity schema built"
    );

    Ok(EntitySchema {
        structure: SchemaStructure {
            name: name.to_string(),
            storage_location: storage_location.to_string(),
            fields,
        },
        methods,
        virtuals,
        serialize_virtuals,
        index_hints,
        pre_save,
        post_save,
        is_audit,
        json_schema,
        validator,
    })
}

/// JSON Schema for stored bodies. Undeclared keys are stripped before
/// validation, so the schema does not need to forbid them.
fn body_schema(name: &str, fields: &BTreeMap<String, FieldDescriptor>) -> Value {
    let mut properties: Map<String, Value> = fields
        .iter()
        .map(|(key, field)| (key.clone(), field.field_type.json_schema()))
        .collect();
    properties.insert(
        keys::VERSION.to_string(),
        json!({ "type": "integer", "minimum": 0 }),
    );

    json!({
        "title": name,
        "type": "object",
        "properties": properties,
        "required": [keys::SCHEMA_NAME],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eagle_core::audit::AuditRecord;
    use eagle_core::document::Document;
    use pretty_assertions::assert_eq;

    struct Discard;

    impl AuditSink for Discard {
        fn record(&self, _record: AuditRecord) {}
    }

    fn binding(sink: &Arc<dyn AuditSink>) -> AuditBinding<'_> {
        AuditBinding {
            entity_name: keys::AUDIT_ENTITY,
            sink,
        }
    }

    fn widget() -> EntityDefinition {
        EntityDefinition::new().field("title", FieldDescriptor::string())
    }

    #[test]
    fn injects_bookkeeping_fields() {
        let sink: Arc<dyn AuditSink> = Arc::new(Discard);
        let schema = build("Widget", widget(), "widgets", &binding(&sink)).unwrap();

        let names: Vec<&str> = schema.fields().keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["_createdBy", "_deletedBy", "_updatedBy", "schemaName", "title"]
        );
        for key in keys::ACTOR_FIELDS {
            assert_eq!(schema.field(key).unwrap().default, Some(json!("system")));
        }
        let schema_name = schema.field("schemaName").unwrap();
        assert_eq!(schema_name.default, Some(json!("Widget")));
        assert!(schema_name.indexed);
        assert_eq!(schema.storage_location(), "widgets");
        assert!(schema.post_save().is_audit());
    }

    #[test]
    fn audit_entity_gets_no_actor_fields_or_hook() {
        let sink: Arc<dyn AuditSink> = Arc::new(Discard);
        let definition = EntityDefinition::new().field("objectId", FieldDescriptor::string());
        let schema = build("Audit", definition, "audit", &binding(&sink)).unwrap();

        assert!(schema.is_audit_entity());
        assert!(schema.field("_createdBy").is_none());
        assert!(schema.field("schemaName").is_some());
        assert!(matches!(schema.post_save(), PostSaveBehavior::None));
    }

    #[test]
    fn custom_post_save_replaces_audit() {
        let sink: Arc<dyn AuditSink> = Arc::new(Discard);
        let definition = widget().post_save(|_: &Document| {});
        let schema = build("Widget", definition, "widgets", &binding(&sink)).unwrap();
        assert!(schema.post_save().is_custom());
    }

    #[test]
    fn missing_inputs_are_rejected() {
        let sink: Arc<dyn AuditSink> = Arc::new(Discard);
        assert!(matches!(
            build("", widget(), "widgets", &binding(&sink)),
            Err(SchemaError::MissingName)
        ));
        assert!(matches!(
            build("Widget", EntityDefinition::new(), "widgets", &binding(&sink)),
            Err(SchemaError::MissingDefinition(name)) if name == "Widget"
        ));
        assert!(matches!(
            build("Widget", widget(), " ", &binding(&sink)),
            Err(SchemaError::MissingLocation(_))
        ));
    }

    #[test]
    fn virtuals_enable_serialization() {
        let sink: Arc<dyn AuditSink> = Arc::new(Discard);
        let plain = build("Widget", widget(), "widgets", &binding(&sink)).unwrap();
        assert!(!plain.serializes_virtuals());

        let with_virtual = widget().virtual_field(
            crate::definition::VirtualField::new("shout")
                .getter(|doc| json!(doc.get_str("title").unwrap_or_default().to_uppercase())),
        );
        let schema = build("Widget", with_virtual, "widgets", &binding(&sink)).unwrap();
        assert!(schema.serializes_virtuals());
    }
}
