//! # eagle-schema
//!
//! The schema factory and everything it wires together:
//! - [`EntityDefinition`]: typed definition table plus optional behavior hooks
//! - [`EntityRegistry`]: explicit name → schema registry owned by bootstrap
//! - [`EntitySchema`]: the registered entity, with bookkeeping fields injected
//!   and its post-save behavior resolved
//! - [`version_guard`]: the pre-update interceptor applied to every partial update
//! - [`definitions`]: the built-in entity definition tables
//!
//! Storage lives in `eagle-db`; this crate never touches the database. Audit
//! records leave through the [`AuditSink`] handed to the registry.

pub mod definition;
pub mod definitions;
pub mod error;
mod factory;
pub mod hooks;
pub mod registry;
pub mod schema;
pub mod version_guard;

pub use definition::{EntityDefinition, IndexHint, VirtualField};
pub use error::SchemaError;
pub use hooks::{AuditSink, PostSaveBehavior, PostSaveHook, PreSaveHook};
pub use registry::EntityRegistry;
pub use schema::{EntitySchema, SchemaStructure};
