//! Response envelope shared with the presentation layer.
//!
//! Field names and nesting are part of the external contract:
//! `status`, `message`, `result`, `total`, and `pagination` with
//! `currentPage` / `pageSize` / `total`.

use serde::{Deserialize, Serialize};

use super::pagination::{Paginated, PaginationMeta};
use crate::errors::AppError;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: Option<String>,
    pub result: Option<T>,
    pub total: Option<u64>,
    pub pagination: Option<PaginationMeta>,
}

impl<T> ApiResponse<T> {
    pub fn success(result: T) -> Self {
        Self {
            status: 200,
            message: None,
            result: Some(result),
            total: None,
            pagination: None,
        }
    }

    pub fn with_message(result: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(result)
        }
    }

    /// Envelope for an error, using the error's status and user-facing message.
    pub fn failure(error: &AppError) -> Self {
        Self {
            status: error.status(),
            message: Some(error.user_message()),
            result: None,
            total: None,
            pagination: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Envelope for one page; `total` is the pre-pagination row count.
    pub fn paged(page: Paginated<T>) -> Self {
        Self {
            status: 200,
            message: None,
            total: Some(page.meta.total),
            pagination: Some(page.meta),
            result: Some(page.items),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            result: None,
            total: None,
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaginationParams;
    use serde_json::json;

    #[test]
    fn paged_envelope_keeps_field_names() {
        let page = Paginated::new(vec!["a", "b"], &PaginationParams::new(2, 2), 7);
        let value = serde_json::to_value(ApiResponse::paged(page)).unwrap();

        assert_eq!(
            value,
            json!({
                "status": 200,
                "message": null,
                "result": ["a", "b"],
                "total": 7,
                "pagination": { "currentPage": 2, "pageSize": 2, "total": 7 }
            })
        );
    }

    #[test]
    fn failure_carries_error_status() {
        let response: ApiResponse<()> = ApiResponse::failure(&AppError::not_found("Segment"));
        assert_eq!(response.status, 404);
        assert_eq!(response.message.as_deref(), Some("Segment not found"));
        assert!(response.result.is_none());
    }
}
