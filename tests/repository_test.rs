//! Generic repository integration tests.

mod common;

use sea_orm::ColumnTrait;

use ministry_data::domain::{Organization, OrganizationInput, PermissionInput, Role};
use ministry_data::errors::AppError;
use ministry_data::infra::repositories::{
    course, organization, segment, Direction, EntityKey, Includes, OrderBy, Predicate,
};
use ministry_data::infra::{
    CourseRepository, DeleteRepository, OrganizationRepository, PermissionRepository,
    ReadRepository, RoleRepository, UserRepository, WriteRepository,
};
use ministry_data::{PageWindow, PaginationParams};

use common::{add_courses, add_organization, add_segment, add_users, new_course, persistence};

#[tokio::test]
async fn test_added_entity_round_trips() {
    let persistence = persistence().await;

    let uow = persistence.begin();
    let added = add_organization(&uow, "Ministry A", "moa").await;
    assert!(added.id > 0);
    assert_eq!(added.code, "MOA");
    uow.complete().await.unwrap();

    let uow = persistence.begin();
    let found = uow
        .repository::<OrganizationRepository>()
        .find_one(
            organization::Column::Id.eq(added.id).into(),
            &Includes::none(),
        )
        .await
        .unwrap();
    assert_eq!(found, added);
    assert!(found.deleted_at.is_none());
}

#[tokio::test]
async fn test_added_user_round_trips_by_guid() {
    let persistence = persistence().await;

    let uow = persistence.begin();
    let added = add_users(&uow, 1).await.remove(0);
    uow.complete().await.unwrap();

    let uow = persistence.begin();
    let found = uow
        .repository::<UserRepository>()
        .find_by_key(EntityKey::from(added.id), &Includes::none())
        .await
        .unwrap();
    assert_eq!(found, added);
}

#[tokio::test]
async fn test_count_matches_list_where_length() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    add_courses(
        &uow,
        (1..=6).map(|n| new_course(org.id, &format!("c{}", n), n * 10)).collect(),
    )
    .await;

    let courses = uow.repository::<CourseRepository>();
    let predicates = [
        Predicate::all(),
        course::Column::Capacity.gte(30).into(),
        course::Column::Capacity.gt(1000).into(),
        Predicate::from(course::Column::Capacity.lt(20)).or(course::Column::Capacity.eq(60)),
    ];
    for predicate in predicates {
        let listed = courses
            .list_where(predicate.clone(), &Includes::none())
            .await
            .unwrap();
        let counted = courses.count(predicate.clone()).await.unwrap();
        assert_eq!(counted, listed.len() as u64);
        assert_eq!(courses.exists(predicate).await.unwrap(), counted > 0);
    }
}

#[tokio::test]
async fn test_list_page_respects_take_and_skip() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    for n in 0..7 {
        add_organization(&uow, &format!("Org {}", n), &format!("O{}", n)).await;
    }
    let orgs = uow.repository::<OrganizationRepository>();
    let everything = orgs.list_all(&Includes::none()).await.unwrap();
    assert_eq!(everything.len(), 7);

    for (take, skip) in [(3, 0), (3, 5), (10, 2), (2, 7), (0, 1)] {
        let page = orgs
            .list_page(PageWindow::take(take).skip(skip), &Includes::none())
            .await
            .unwrap();
        let expected: Vec<i32> = everything
            .iter()
            .skip(skip as usize)
            .take(take as usize)
            .map(|o| o.id)
            .collect();
        assert!(page.len() as u64 <= take);
        assert_eq!(page.iter().map(|o| o.id).collect::<Vec<_>>(), expected);
    }

    let skipped_only = orgs
        .list_page(PageWindow::all().skip(4), &Includes::none())
        .await
        .unwrap();
    assert_eq!(skipped_only.len(), 3);
}

#[tokio::test]
async fn test_filtered_ordered_returns_min_of_matches_and_take() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    add_courses(
        &uow,
        vec![
            new_course(org.id, "alpha", 50),
            new_course(org.id, "bravo", 10),
            new_course(org.id, "charlie", 40),
            new_course(org.id, "delta", 30),
            new_course(org.id, "echo", 5),
        ],
    )
    .await;
    let courses = uow.repository::<CourseRepository>();
    let big = || Predicate::from(course::Column::Capacity.gte(30));

    for take in [1u64, 2, 3, 10] {
        let rows = courses
            .list_filtered_ordered(
                PageWindow::take(take),
                big(),
                Some(OrderBy::desc(course::Column::Capacity)),
                &Includes::none(),
            )
            .await
            .unwrap();
        assert_eq!(rows.len() as u64, take.min(3));
        assert!(rows.iter().all(|c| c.capacity.unwrap_or(0) >= 30));
    }

    let ordered = courses
        .list_filtered_ordered(
            PageWindow::all(),
            big(),
            Some(OrderBy::new(course::Column::Title, Direction::Descending)),
            &Includes::none(),
        )
        .await
        .unwrap();
    let titles: Vec<&str> = ordered.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["delta", "charlie", "alpha"]);

    let second = courses
        .list_ordered(
            PageWindow::take(2).skip(1),
            Some(OrderBy::asc(course::Column::Capacity)),
            &Includes::none(),
        )
        .await
        .unwrap();
    let capacities: Vec<Option<i32>> = second.iter().map(|c| c.capacity).collect();
    assert_eq!(capacities, vec![Some(10), Some(30)]);
}

#[tokio::test]
async fn test_page_reports_pre_pagination_total() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    add_courses(
        &uow,
        (1..=12).map(|n| new_course(org.id, &format!("c{:02}", n), n)).collect(),
    )
    .await;

    let page = uow
        .repository::<CourseRepository>()
        .page(
            &PaginationParams::new(3, 5),
            Predicate::all(),
            Some(OrderBy::asc(course::Column::Title)),
            &Includes::none(),
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.meta.total, 12);
    assert_eq!(page.meta.current_page, 3);
    assert_eq!(page.meta.total_pages(), 3);
    assert_eq!(page.items[0].title, "c11");

    let beyond = uow
        .repository::<CourseRepository>()
        .page(
            &PaginationParams::new(u64::MAX, 20),
            Predicate::all(),
            None,
            &Includes::none(),
        )
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.meta.total, 12);
}

#[tokio::test]
async fn test_group_by_reduces_each_key_once() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let capacities = [10, 20, 30, 10, 20, 30, 10, 20, 30, 10];
    add_courses(
        &uow,
        capacities
            .iter()
            .enumerate()
            .map(|(i, cap)| new_course(org.id, &format!("c{}", i), *cap))
            .collect(),
    )
    .await;

    let groups = uow
        .repository::<CourseRepository>()
        .group_by(
            |c| c.capacity,
            |c| c.title,
            |key, titles| (key, titles),
            None,
        )
        .await
        .unwrap();

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].0, Some(10));
    assert_eq!(groups[0].1, vec!["c0", "c3", "c6", "c9"]);
    assert_eq!(groups[1].0, Some(20));
    assert_eq!(groups[1].1.len(), 3);
    assert_eq!(groups[2].0, Some(30));
    assert_eq!(groups[2].1.len(), 3);

    let filtered = uow
        .repository::<CourseRepository>()
        .group_by(
            |c| c.capacity,
            |_| (),
            |key, members| (key, members.len()),
            Some(course::Column::Capacity.ne(20).into()),
        )
        .await
        .unwrap();
    assert_eq!(filtered, vec![(Some(10), 4), (Some(30), 3)]);
}

#[tokio::test]
async fn test_find_one_reports_missing_and_ambiguous() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    add_segment(&uow, org.id, "SEG1").await;
    add_segment(&uow, org.id, "SEG2").await;
    let segments = uow.segments();

    let missing = segments
        .find_by_key(EntityKey::Int(999), &Includes::none())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let ambiguous = segments
        .find_one(
            segment::Column::OrganizationId.eq(org.id).into(),
            &Includes::none(),
        )
        .await;
    assert!(matches!(ambiguous, Err(AppError::MultipleResults(_))));
}

#[tokio::test]
async fn test_unknown_include_is_rejected() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    add_organization(&uow, "Ministry A", "MOA").await;

    let result = uow
        .repository::<OrganizationRepository>()
        .list_all(&Includes::from(["segments", "owners"]))
        .await;
    match result {
        Err(AppError::InvalidInclude { entity, relation }) => {
            assert_eq!(entity, "Organization");
            assert_eq!(relation, "owners");
        }
        other => panic!("expected InvalidInclude, got {:?}", other),
    }
}

#[tokio::test]
async fn test_includes_load_related_rows_in_batch() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let a = add_organization(&uow, "Ministry A", "MOA").await;
    let b = add_organization(&uow, "Ministry B", "MOB").await;
    add_segment(&uow, a.id, "SEG1").await;
    add_segment(&uow, a.id, "SEG2").await;
    add_courses(&uow, vec![new_course(b.id, "intro", 12)]).await;

    let orgs = uow
        .repository::<OrganizationRepository>()
        .list_all(&Includes::from(["segments"]))
        .await
        .unwrap();
    assert_eq!(orgs[0].segments.as_ref().map(Vec::len), Some(2));
    assert_eq!(orgs[1].segments.as_ref().map(Vec::len), Some(0));
    assert!(orgs[0].departments.is_none());

    let with_org = uow
        .repository::<CourseRepository>()
        .list_all(&Includes::from(["organization", "department"]))
        .await
        .unwrap();
    assert_eq!(
        with_org[0].organization.as_ref().map(|o| o.code.as_str()),
        Some("MOB")
    );
    assert!(with_org[0].department.is_none());
}

#[tokio::test]
async fn test_view_model_writes_are_validated() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let orgs = uow.repository::<OrganizationRepository>();

    let invalid = orgs
        .add_from(OrganizationInput {
            id: None,
            name: String::new(),
            code: "MOA".to_string(),
        })
        .await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));

    let blank_code = orgs
        .add_from(OrganizationInput {
            id: None,
            name: "Ministry A".to_string(),
            code: "   ".to_string(),
        })
        .await;
    assert!(matches!(blank_code, Err(AppError::Validation(_))));

    let created = orgs
        .add_from(OrganizationInput {
            id: None,
            name: "Ministry A".to_string(),
            code: " moa ".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.code, "MOA");

    let no_target = orgs
        .update_from(OrganizationInput {
            id: None,
            name: "Renamed".to_string(),
            code: "MOA".to_string(),
        })
        .await;
    assert!(matches!(no_target, Err(AppError::Validation(_))));

    let renamed = orgs
        .update_from(OrganizationInput {
            id: Some(created.id),
            name: "Ministry A (North)".to_string(),
            code: "moa".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(renamed.id, created.id);
    assert_eq!(renamed.name, "Ministry A (North)");
}

#[tokio::test]
async fn test_update_of_missing_row_is_not_found() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let mut ghost = Organization::new("Ghost", "GHO");
    ghost.id = 4242;

    let result = uow.repository::<OrganizationRepository>().update(ghost).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_duplicate_code_is_a_constraint_violation() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    add_organization(&uow, "Ministry A", "MOA").await;

    let duplicate = uow
        .repository::<OrganizationRepository>()
        .add(Organization::new("Ministry A again", "moa"))
        .await;
    assert!(matches!(duplicate, Err(AppError::ConstraintViolation(_))));
}

#[tokio::test]
async fn test_deleting_missing_row_returns_false() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let orgs = uow.repository::<OrganizationRepository>();

    assert!(!orgs.delete_by_id(12345).await.unwrap());
    assert!(!orgs.hard_delete(EntityKey::Int(12345)).await.unwrap());

    let users = uow.repository::<UserRepository>();
    assert!(!users.delete_by_guid(uuid::Uuid::new_v4()).await.unwrap());
    let user = add_users(&uow, 1).await.remove(0);
    assert!(users.delete_by_guid(user.id).await.unwrap());
}

#[tokio::test]
async fn test_soft_deleted_rows_are_hidden_until_restored() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let orgs = uow.repository::<OrganizationRepository>();

    assert!(orgs.delete_entity(&org).await.unwrap());
    assert!(!orgs.delete_entity(&org).await.unwrap());
    assert_eq!(orgs.count(Predicate::all()).await.unwrap(), 0);
    assert!(orgs.list_all(&Includes::none()).await.unwrap().is_empty());
    assert!(matches!(
        orgs.find_by_key(org.id.into(), &Includes::none()).await,
        Err(AppError::NotFound(_))
    ));

    let restored = orgs.restore(org.id.into()).await.unwrap();
    assert_eq!(restored.id, org.id);
    assert!(restored.deleted_at.is_none());
    assert_eq!(orgs.count(Predicate::all()).await.unwrap(), 1);

    assert!(orgs.hard_delete(org.id.into()).await.unwrap());
    assert!(matches!(
        orgs.restore(org.id.into()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_code_of_soft_deleted_row_can_be_reused() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let old = add_organization(&uow, "Ministry A", "MOA").await;
    let orgs = uow.repository::<OrganizationRepository>();
    assert!(orgs.delete_entity(&old).await.unwrap());

    let by_code: Predicate = organization::Column::Code.eq("MOA").into();
    assert!(!orgs.exists(by_code.clone()).await.unwrap());

    let reborn = add_organization(&uow, "Ministry A (new)", "moa").await;
    assert_ne!(reborn.id, old.id);
    assert!(orgs.exists(by_code).await.unwrap());

    assert!(matches!(
        orgs.restore(old.id.into()).await,
        Err(AppError::ConstraintViolation(_))
    ));
}

#[tokio::test]
async fn test_delete_where_counts_removed_rows() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    add_courses(
        &uow,
        (1..=5).map(|n| new_course(org.id, &format!("c{}", n), n)).collect(),
    )
    .await;
    let courses = uow.repository::<CourseRepository>();

    let removed = courses
        .delete_where(course::Column::Capacity.lte(3).into())
        .await
        .unwrap();
    assert_eq!(removed, 3);
    assert_eq!(courses.count(Predicate::all()).await.unwrap(), 2);

    let again = courses
        .delete_where(course::Column::Capacity.lte(3).into())
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_permissions_are_deleted_physically() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let now = chrono::Utc::now();
    let role = uow
        .repository::<RoleRepository>()
        .add(Role {
            id: 0,
            name: "Pastor".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            permissions: None,
        })
        .await
        .unwrap();

    let permissions = uow.repository::<PermissionRepository>();
    let granted = permissions
        .add_from(PermissionInput {
            id: None,
            role_id: role.id,
            code: "events.manage".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let loaded = uow
        .repository::<RoleRepository>()
        .find_by_key(role.id.into(), &Includes::from(["permissions"]))
        .await
        .unwrap();
    assert_eq!(loaded.permissions.map(|p| p.len()), Some(1));

    assert!(permissions.delete_entity(&granted).await.unwrap());
    assert_eq!(permissions.count(Predicate::all()).await.unwrap(), 0);
    assert!(matches!(
        permissions.restore(granted.id.into()).await,
        Err(AppError::Validation(_))
    ));
}
