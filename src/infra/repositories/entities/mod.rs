//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models. Each
//! file also binds its domain type to the table through `DataEntity`.

pub mod course;
pub mod department;
pub mod event;
pub mod organization;
pub mod permission;
pub mod role;
pub mod segment;
pub mod user;
pub mod user_segment;
