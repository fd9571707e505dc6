//! # eagle-core
//!
//! Core types shared across all Eagle crates:
//! - [`document::Document`]: one stored instance of a registered entity
//! - [`audit::AuditRecord`]: the append-only audit entry written after every save
//! - [`field`]: field descriptors used by entity definition tables
//! - [`keys`]: bookkeeping field names and defaults injected into every schema
//! - Cross-cutting error types

pub mod audit;
pub mod document;
pub mod errors;
pub mod field;
pub mod keys;
