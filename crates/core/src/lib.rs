//! Use cases for arena.
//!
//! One service per entity. Every mutating use case validates its input,
//! writes through the generic repository, then re-fetches the row with its
//! default relations and maps it to a response DTO.

pub mod services;
pub mod validation;

pub use services::*;
