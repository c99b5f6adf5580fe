//! Event domain entity (attendance / check-in sessions).

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::Course;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i32,
    pub organization_id: i32,
    pub course_id: Option<i32>,
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_schedule"))]
pub struct EventInput {
    pub id: Option<i32>,
    pub organization_id: i32,
    pub course_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

fn validate_schedule(input: &EventInput) -> Result<(), ValidationError> {
    match input.ends_at {
        Some(ends_at) if ends_at < input.starts_at => {
            let mut err = ValidationError::new("schedule");
            err.message = Some(Cow::Borrowed("event cannot end before it starts"));
            Err(err)
        }
        _ => Ok(()),
    }
}
