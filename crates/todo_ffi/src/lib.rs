//! Flutter bridge for the to-do core.

pub mod api;
