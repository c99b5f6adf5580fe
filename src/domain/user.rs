//! User domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Role, Segment};

/// A portal user. Identified by UUID, unlike the integer-keyed
/// organizational entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub organization_id: Option<i32>,
    pub role_id: Option<i32>,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
}

impl User {
    /// Create a new user with a fresh id
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id: None,
            role_id: None,
            email: email.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            role: None,
            segments: None,
        }
    }

    /// Check if user is active (not deleted)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// User create/update input
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserInput {
    pub id: Option<Uuid>,
    pub organization_id: Option<i32>,
    pub role_id: Option<i32>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
}
