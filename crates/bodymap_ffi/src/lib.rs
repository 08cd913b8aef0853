//! Flutter-facing bindings for the body map core.

pub mod api;
