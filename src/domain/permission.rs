//! Permission domain entity.
//!
//! Permissions are hard-deleted; they carry no `deleted_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i32,
    pub role_id: i32,
    pub code: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PermissionInput {
    pub id: Option<i32>,
    pub role_id: i32,
    #[validate(length(min = 1, max = 100, message = "code must be 1-100 characters"))]
    pub code: String,
    pub description: Option<String>,
}
