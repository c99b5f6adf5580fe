//! Shared fixtures for integration tests.
//!
//! Every test gets its own in-memory SQLite database with all migrations
//! applied. The pool has a single connection, so a test must complete or
//! dispose one unit of work before it starts using the next.

#![allow(dead_code)]

use ministry_data::domain::{Course, Organization, Segment, User};
use ministry_data::infra::{
    CourseRepository, Database, OrganizationRepository, Persistence, UnitOfWork,
    UserRepository, WriteRepository,
};
use ministry_data::Config;

pub async fn persistence() -> Persistence {
    let config = Config::with_database_url("sqlite::memory:");
    let db = Database::connect(&config)
        .await
        .expect("in-memory database should migrate");
    Persistence::new(db.get_connection())
}

pub async fn add_organization(uow: &UnitOfWork, name: &str, code: &str) -> Organization {
    uow.repository::<OrganizationRepository>()
        .add(Organization::new(name, code))
        .await
        .expect("organization insert")
}

pub async fn add_segment(uow: &UnitOfWork, organization_id: i32, code: &str) -> Segment {
    uow.segments()
        .add(Segment::new(organization_id, code, format!("Segment {}", code)))
        .await
        .expect("segment insert")
}

pub async fn add_users(uow: &UnitOfWork, count: usize) -> Vec<User> {
    let users = uow.repository::<UserRepository>();
    let mut added = Vec::with_capacity(count);
    for _ in 0..count {
        let user = User::new(
            format!("{}@example.com", uuid::Uuid::new_v4().simple()),
            "Member",
        );
        added.push(users.add(user).await.expect("user insert"));
    }
    added
}

/// Course fixture; `capacity` doubles as a grouping key in tests.
pub fn new_course(organization_id: i32, title: &str, capacity: i32) -> Course {
    let now = chrono::Utc::now();
    Course {
        id: 0,
        organization_id,
        department_id: None,
        title: title.to_string(),
        code: title.to_uppercase(),
        capacity: Some(capacity),
        created_at: now,
        updated_at: now,
        deleted_at: None,
        organization: None,
        department: None,
    }
}

pub async fn add_courses(uow: &UnitOfWork, courses: Vec<Course>) -> Vec<Course> {
    let repo = uow.repository::<CourseRepository>();
    let mut added = Vec::with_capacity(courses.len());
    for course in courses {
        added.push(repo.add(course).await.expect("course insert"));
    }
    added
}
