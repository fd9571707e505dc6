//! Save-time behavior attached to a registered entity.
//!
//! Pre-save hooks run before a create or save is written and may reject it.
//! Post-save behavior runs after the write has committed and can never fail
//! the save.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use eagle_core::audit::AuditRecord;
use eagle_core::document::Document;

/// Runs before a document is written. Return `Err(message)` to reject the write.
pub trait PreSaveHook: Send + Sync {
    fn before_save(&self, doc: &mut Document) -> Result<(), String>;
}

impl<F> PreSaveHook for F
where
    F: Fn(&mut Document) -> Result<(), String> + Send + Sync,
{
    fn before_save(&self, doc: &mut Document) -> Result<(), String> {
        self(doc)
    }
}

/// Runs after a document write has committed.
pub trait PostSaveHook: Send + Sync {
    fn after_save(&self, doc: &Document);
}

impl<F> PostSaveHook for F
where
    F: Fn(&Document) + Send + Sync,
{
    fn after_save(&self, doc: &Document) {
        self(doc);
    }
}

/// Destination for audit records.
///
/// `record` must not block on the write: implementations hand the record off
/// and report failures through logging only.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// What happens after a successful save. Resolved once at registration.
#[derive(Clone)]
pub enum PostSaveBehavior {
    /// Append one audit record describing the save.
    Audit(Arc<dyn AuditSink>),
    /// Caller-supplied hook, replacing the audit record.
    Custom(Arc<dyn PostSaveHook>),
    /// Nothing. Used by the audit entity itself.
    None,
}

impl PostSaveBehavior {
    /// Run the behavior for a document that has just been saved.
    pub fn run(&self, doc: &Document) {
        match self {
            Self::Audit(sink) => match AuditRecord::for_document(doc, Utc::now()) {
                Ok(record) => sink.record(record),
                Err(error) => tracing::warn!(%error, "skipping audit record"),
            },
            Self::Custom(hook) => hook.after_save(doc),
            Self::None => {}
        }
    }

    #[must_use]
    pub const fn is_audit(&self) -> bool {
        matches!(self, Self::Audit(_))
    }

    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audit(_) => "audit",
            Self::Custom(_) => "custom",
            Self::None => "none",
        }
    }
}

impl fmt::Debug for PostSaveBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
