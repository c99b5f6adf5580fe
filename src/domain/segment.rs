//! Segment domain entity.
//!
//! A segment is a named slice of an organization (a cell group, a choir,
//! a youth cohort) with many-to-many user membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Organization, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: i32,
    pub organization_id: i32,
    /// Upper-cased; compared case-insensitively
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
}

impl Segment {
    pub fn new(organization_id: i32, code: &str, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            organization_id,
            code: super::normalize_code(code),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            organization: None,
            users: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SegmentInput {
    pub id: Option<i32>,
    pub organization_id: i32,
    #[validate(custom(function = "super::validate_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
}
