//! Common utilities and shared types for gymhub.
//!
//! This crate provides foundational components used across all gymhub crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`],
//!   including SQLSTATE classification of database failures
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **CSV**: The quoting codec behind admin exports
//!
//! # Example
//!
//! ```no_run
//! use gymhub_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id = IdGenerator::new().generate();
//!     println!("{} -> {}", config.server.url, id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod csv;
pub mod error;
pub mod id;

pub use config::{AdminConfig, Config};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
