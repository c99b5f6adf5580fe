//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - Entity tables and repositories
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod session;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    CourseRepository, CrudRepository, DeleteRepository, DepartmentRepository, EventRepository,
    OrganizationRepository, PermissionRepository, ReadRepository, RoleRepository,
    SegmentRepository, SegmentStore, UserRepository, WriteRepository,
};
pub use session::Session;
pub use unit_of_work::{Persistence, UnitFuture, UnitOfWork};
