//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! Every entity gets the generic [`Store`]; segments get [`SegmentStore`]
//! with membership operations on top.

mod base;
pub mod entities;
pub mod query;
mod relations;
mod segment_repository;

pub use base::{
    ColumnOf, CrudRepository, DataEntity, DeleteRepository, NoViewModel, ReadRepository,
    SessionBound, Store, WriteModel, WriteRepository,
};
pub use entities::{
    course, department, event, organization, permission, role, segment, user, user_segment,
};
pub use query::{Direction, EntityKey, Includes, OrderBy, Predicate};
pub use segment_repository::{SegmentRepository, SegmentStore};

use crate::domain::{
    Course, CourseInput, Department, DepartmentInput, Event, EventInput, Organization,
    OrganizationInput, Permission, PermissionInput, Role, RoleInput, User, UserInput,
};

pub type OrganizationRepository = Store<Organization, OrganizationInput>;
pub type RoleRepository = Store<Role, RoleInput>;
pub type PermissionRepository = Store<Permission, PermissionInput>;
pub type UserRepository = Store<User, UserInput>;
pub type DepartmentRepository = Store<Department, DepartmentInput>;
pub type CourseRepository = Store<Course, CourseInput>;
pub type EventRepository = Store<Event, EventInput>;
