//! Persistence adapter over the key-value store.
//!
//! # Responsibility
//! - Serialize the whole task list into one versioned key-value entry.
//! - Reject malformed or unknown-version payloads on the read path.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Payloads carry an explicit schema version.

pub mod task_repo;
