//! Common utilities and shared types for arena.
//!
//! This crate provides foundational components used across all arena crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Messages**: Localised message catalogue via [`i18n`]
//! - **Storage**: File storage backends for uploaded images
//!
//! # Example
//!
//! ```no_run
//! use arena_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Listening on port {}", config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod i18n;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use i18n::{Locale, translate};
pub use storage::{LocalStorage, StorageBackend, UploadedFile, generate_storage_key};
