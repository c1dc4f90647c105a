//! Core use-case services.
//!
//! # Responsibility
//! - Drive the task list through user-level operations.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod confirm;
pub mod persister;
pub mod task_list;
