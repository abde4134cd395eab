//! Query shaping for Mem0 memory calls.
//!
//! Mem0 owns storage, search and graph linking. This module only makes
//! sure every outbound query is scoped to a user.

pub mod filters;

pub use filters::{COMBINATORS, mentions_user_id, with_default_filters};
