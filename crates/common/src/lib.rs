//! Common utilities and shared types for forum-rs.
//!
//! This crate provides foundational components used across all forum-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Tokens**: Bearer token issuing and verification via [`TokenIssuer`]
//!
//! # Example
//!
//! ```no_run
//! use forum_common::{AppResult, Config, IdGenerator, TokenIssuer};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let tokens = TokenIssuer::from_config(&config.auth);
//!     let id = IdGenerator::new().generate();
//!     let token = tokens.issue(&id)?;
//!     println!("Issued token for {id}: {token}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod token;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use token::{Claims, TokenIssuer};
