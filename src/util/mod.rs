//! Shared utilities

pub mod resource;
pub mod time;
