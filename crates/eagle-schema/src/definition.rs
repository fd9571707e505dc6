//! Entity definition tables.
//!
//! An `EntityDefinition` is consumed once at registration. Behavior hooks are
//! typed fields of their own and never appear among the persisted fields.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use eagle_core::document::Document;
use eagle_core::field::FieldDescriptor;
use serde_json::Value;

use crate::hooks::{PostSaveHook, PreSaveHook};

/// A custom instance method: computes a value from a document.
pub type Method = Arc<dyn Fn(&Document) -> Value + Send + Sync>;

pub type VirtualGetter = Arc<dyn Fn(&Document) -> Value + Send + Sync>;
pub type VirtualSetter = Arc<dyn Fn(&mut Document, Value) + Send + Sync>;

/// A computed field that is never persisted.
#[derive(Clone)]
pub struct VirtualField {
    pub name: String,
    pub get: Option<VirtualGetter>,
    pub set: Option<VirtualSetter>,
}

impl VirtualField {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            get: None,
            set: None,
        }
    }

    #[must_use]
    pub fn getter(mut self, get: impl Fn(&Document) -> Value + Send + Sync + 'static) -> Self {
        self.get = Some(Arc::new(get));
        self
    }

    #[must_use]
    pub fn setter(mut self, set: impl Fn(&mut Document, Value) + Send + Sync + 'static) -> Self {
        self.set = Some(Arc::new(set));
        self
    }
}

impl fmt::Debug for VirtualField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualField")
            .field("name", &self.name)
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .finish()
    }
}

/// Index hint accepted at registration. Reserved: recorded, never applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHint {
    pub fields: Vec<String>,
    pub unique: bool,
}

/// Field table plus optional behavior for one entity.
#[derive(Clone, Default)]
pub struct EntityDefinition {
    pub fields: BTreeMap<String, FieldDescriptor>,
    pub methods: BTreeMap<String, Method>,
    pub virtuals: Vec<VirtualField>,
    pub index_hints: Vec<IndexHint>,
    pub pre_save: Option<Arc<dyn PreSaveHook>>,
    pub post_save: Option<Arc<dyn PostSaveHook>>,
}

impl EntityDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: &str, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.to_string(), descriptor);
        self
    }

    #[must_use]
    pub fn method(
        mut self,
        name: &str,
        method: impl Fn(&Document) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.to_string(), Arc::new(method));
        self
    }

    #[must_use]
    pub fn virtual_field(mut self, field: VirtualField) -> Self {
        self.virtuals.push(field);
        self
    }

    #[must_use]
    pub fn index_hint(mut self, hint: IndexHint) -> Self {
        self.index_hints.push(hint);
        self
    }

    #[must_use]
    pub fn pre_save(mut self, hook: impl PreSaveHook + 'static) -> Self {
        self.pre_save = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn post_save(mut self, hook: impl PostSaveHook + 'static) -> Self {
        self.post_save = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for EntityDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDefinition")
            .field("fields", &self.fields)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("virtuals", &self.virtuals)
            .field("index_hints", &self.index_hints)
            .field("pre_save", &self.pre_save.is_some())
            .field("post_save", &self.post_save.is_some())
            .finish()
    }
}
