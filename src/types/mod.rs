//! Shared types for DRY compliance.

mod pagination;
mod response;

pub use pagination::{PageWindow, Paginated, PaginationMeta, PaginationParams};
pub use response::ApiResponse;
