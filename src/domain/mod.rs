//! Domain layer - Core business entities and their input shapes
//!
//! Domain types carry no persistence concerns. Each entity may expose
//! optional relation fields that are only populated when a repository
//! query asks for them through an include set.

use std::borrow::Cow;

use validator::ValidationError;

pub mod course;
pub mod department;
pub mod event;
pub mod organization;
pub mod permission;
pub mod role;
pub mod segment;
pub mod user;

pub use course::{Course, CourseInput};
pub use department::{Department, DepartmentInput};
pub use event::{Event, EventInput};
pub use organization::{Organization, OrganizationInput};
pub use permission::{Permission, PermissionInput};
pub use role::{Role, RoleInput};
pub use segment::{Segment, SegmentInput};
pub use user::{User, UserInput};

/// Canonical form of a human-entered code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Length check on the normalized code, so blank input cannot slip through
/// as an empty string.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    let len = normalize_code(code).chars().count();
    if (1..=32).contains(&len) {
        Ok(())
    } else {
        let mut err = ValidationError::new("code_length");
        err.message = Some(Cow::Borrowed("code must be 1-32 characters"));
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_code_is_rejected() {
        assert!(validate_code("   ").is_err());
        assert!(validate_code("").is_err());
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        assert!(validate_code("  moa  ").is_ok());
        assert!(validate_code(&format!(" {} ", "A".repeat(32))).is_ok());
        assert!(validate_code(&"A".repeat(33)).is_err());
    }
}
