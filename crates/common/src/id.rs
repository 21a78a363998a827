//! Entity ID generation.
//!
//! Every row gets a lowercase ULID: 26 characters, sortable by creation
//! time. Replies are listed by `created_at` and then by ID, so ties on the
//! timestamp still come out in insertion order across milliseconds.

use ulid::Ulid;

/// Generates primary keys for new rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    /// Create a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Next ID.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}
