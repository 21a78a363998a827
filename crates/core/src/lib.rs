//! Core business logic for forum-rs.
//!
//! Services here sit between the HTTP layer and the repositories. The
//! trending computation lives in [`services::trending`]: a pure score
//! function plus the ranking pass applied to every trending page.

pub mod services;

pub use services::*;
