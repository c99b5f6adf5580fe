//! Ministry Data - Data-access layer for a ministry/church portal
//!
//! A generic, predicate-driven repository contract shared by every entity,
//! a segment repository with user membership on top, and a unit of work
//! that runs them all inside one database transaction.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and their input shapes
//! - **infra**: Database, migrations, repositories and the unit of work
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # Usage
//!
//! ```ignore
//! let persistence = Persistence::new(Database::connect(&config).await?.get_connection());
//! let uow = persistence.begin();
//! let org = uow
//!     .repository::<OrganizationRepository>()
//!     .add(Organization::new("Ministry A", "MOA"))
//!     .await?;
//! uow.segments().add(Segment::new(org.id, "SEG1", "Youth")).await?;
//! uow.complete().await?;
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use infra::{Database, Persistence, UnitOfWork};
pub use types::{ApiResponse, PageWindow, Paginated, PaginationParams};
