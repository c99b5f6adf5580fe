//! Course domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Department, Organization};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i32,
    pub organization_id: i32,
    pub department_id: Option<i32>,
    pub title: String,
    pub code: String,
    /// Seat limit; `None` means unlimited
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CourseInput {
    pub id: Option<i32>,
    pub organization_id: i32,
    pub department_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(custom(function = "super::validate_code"))]
    pub code: String,
    #[validate(range(min = 1, message = "capacity must be positive"))]
    pub capacity: Option<i32>,
}
