//! Audit logging for household-settle
//!
//! Every service mutation appends one line to an append-only JSONL log:
//! creates, updates, deletes, and settlement finalization. Updates carry a
//! field-level summary of what changed.
//!
//! ```rust,ignore
//! use household::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::create(
//!     EntityType::Member,
//!     member.id.to_string(),
//!     Some(member.name.clone()),
//!     &member,
//! ))?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
