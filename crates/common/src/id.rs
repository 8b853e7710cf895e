//! ID generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// ID generator for rows, session tokens and confirmation tokens.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new lowercase ULID row ID.
    ///
    /// Row IDs sort by creation time, which the admin lists rely on when
    /// two rows share a `created_at` value.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an opaque random token (no time component).
    #[must_use]
    pub fn generate_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
