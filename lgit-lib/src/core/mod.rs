//! Core data structures and side effects.

pub mod config;
pub mod effects;
pub mod formatting;
pub mod item;
