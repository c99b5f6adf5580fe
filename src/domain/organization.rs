//! Organization domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Department, Segment};

/// A ministry or parish owning segments, departments and courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departments: Option<Vec<Department>>,
}

impl Organization {
    /// Build a not-yet-persisted organization.
    pub fn new(name: impl Into<String>, code: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            code: super::normalize_code(code),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            segments: None,
            departments: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Organization create/update input
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct OrganizationInput {
    /// Target row for updates; ignored on create
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(custom(function = "super::validate_code"))]
    pub code: String,
}
