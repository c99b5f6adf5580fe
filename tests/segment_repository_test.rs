//! Segment repository integration tests.

mod common;

use ministry_data::domain::{SegmentInput, User};
use ministry_data::errors::AppError;
use ministry_data::infra::repositories::Includes;
use ministry_data::infra::{
    DeleteRepository, ReadRepository, SegmentRepository, UserRepository, WriteRepository,
};

use common::{add_organization, add_segment, add_users, persistence};

fn ids(users: &[User]) -> Vec<uuid::Uuid> {
    users.iter().map(|u| u.id).collect()
}

fn sorted(mut ids: Vec<uuid::Uuid>) -> Vec<uuid::Uuid> {
    ids.sort();
    ids
}

#[tokio::test]
async fn test_create_organization_then_list_its_segment() {
    let persistence = persistence().await;

    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    uow.segments()
        .add_from(SegmentInput {
            id: None,
            organization_id: org.id,
            code: "SEG1".to_string(),
            name: "Segment one".to_string(),
            description: None,
        })
        .await
        .unwrap();
    uow.complete().await.unwrap();

    let uow = persistence.begin();
    let segments = uow.segments().list_by_organization(org.id).await.unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].code, "SEG1");
    assert_eq!(segments[0].organization_id, org.id);
}

#[tokio::test]
async fn test_list_by_organization_ignores_other_organizations() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let a = add_organization(&uow, "Ministry A", "MOA").await;
    let b = add_organization(&uow, "Ministry B", "MOB").await;
    add_segment(&uow, a.id, "YOUTH").await;
    add_segment(&uow, b.id, "CHOIR").await;
    add_segment(&uow, b.id, "USHERS").await;

    let segments = uow.segments();
    assert_eq!(segments.list_by_organization(a.id).await.unwrap().len(), 1);
    assert_eq!(segments.list_by_organization(b.id).await.unwrap().len(), 2);
    assert!(segments.list_by_organization(999).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_code_exists_honours_exclusion() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let segment = add_segment(&uow, org.id, "SEG1").await;
    let segments = uow.segments();

    assert!(segments.code_exists("SEG1", None).await.unwrap());
    assert!(segments.code_exists("  seg1 ", None).await.unwrap());
    assert!(!segments.code_exists("SEG1", Some(segment.id)).await.unwrap());
    assert!(!segments.code_exists("SEG2", None).await.unwrap());

    let twin = add_segment(&uow, org.id, "seg1").await;
    assert!(segments.code_exists("SEG1", Some(segment.id)).await.unwrap());

    segments.delete_entity(&twin).await.unwrap();
    assert!(!segments.code_exists("SEG1", Some(segment.id)).await.unwrap());
}

#[tokio::test]
async fn test_assign_users_is_idempotent() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let segment = add_segment(&uow, org.id, "SEG1").await;
    let users = add_users(&uow, 4).await;
    let segments = uow.segments();

    assert!(segments.assign_users(segment.id, &ids(&users[..3])).await.unwrap());
    assert!(segments.assign_users(segment.id, &ids(&users[1..])).await.unwrap());
    assert!(segments.assign_users(segment.id, &ids(&users[1..])).await.unwrap());

    let members = segments.member_ids(segment.id).await.unwrap();
    assert_eq!(sorted(members), sorted(ids(&users)));

    let loaded = segments.get_with_users(segment.id).await.unwrap();
    assert_eq!(loaded.users.map(|u| u.len()), Some(4));
}

#[tokio::test]
async fn test_assign_users_skips_unknown_and_deleted_users() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let segment = add_segment(&uow, org.id, "SEG1").await;
    let users = add_users(&uow, 2).await;
    uow.repository::<UserRepository>()
        .delete_entity(&users[1])
        .await
        .unwrap();

    let requested = vec![users[0].id, users[1].id, uuid::Uuid::new_v4()];
    assert!(uow.segments().assign_users(segment.id, &requested).await.unwrap());
    assert_eq!(
        uow.segments().member_ids(segment.id).await.unwrap(),
        vec![users[0].id]
    );
}

#[tokio::test]
async fn test_membership_changes_on_missing_segment_return_false() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let segment = add_segment(&uow, org.id, "SEG1").await;
    let users = add_users(&uow, 1).await;
    let segments = uow.segments();

    assert!(!segments.assign_users(9999, &ids(&users)).await.unwrap());
    assert!(!segments.remove_users(9999, &ids(&users)).await.unwrap());

    segments.delete_entity(&segment).await.unwrap();
    assert!(!segments.assign_users(segment.id, &ids(&users)).await.unwrap());
}

#[tokio::test]
async fn test_remove_users_ignores_non_members() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let segment = add_segment(&uow, org.id, "SEG1").await;
    let users = add_users(&uow, 3).await;
    let segments = uow.segments();
    segments
        .assign_users(segment.id, &ids(&users[..2]))
        .await
        .unwrap();

    assert!(segments
        .remove_users(segment.id, &[users[0].id, users[2].id])
        .await
        .unwrap());
    assert!(segments.remove_users(segment.id, &[users[0].id]).await.unwrap());
    assert_eq!(
        segments.member_ids(segment.id).await.unwrap(),
        vec![users[1].id]
    );
}

#[tokio::test]
async fn test_get_with_users_on_missing_segment_is_not_found() {
    let persistence = persistence().await;
    let uow = persistence.begin();

    let result = uow.segments().get_with_users(77).await;
    assert!(matches!(result, Err(AppError::NotFound(ref entity)) if entity == "Segment"));
}

#[tokio::test]
async fn test_user_segments_include_follows_membership() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let youth = add_segment(&uow, org.id, "YOUTH").await;
    let choir = add_segment(&uow, org.id, "CHOIR").await;
    let users = add_users(&uow, 2).await;
    let segments = uow.segments();
    segments.assign_users(youth.id, &ids(&users)).await.unwrap();
    segments.assign_users(choir.id, &[users[0].id]).await.unwrap();

    let loaded = uow
        .repository::<UserRepository>()
        .list_all(&Includes::from(["segments"]))
        .await
        .unwrap();
    let codes = |user: &User| {
        let mut codes: Vec<String> = user
            .segments
            .as_ref()
            .map(|s| s.iter().map(|seg| seg.code.clone()).collect())
            .unwrap_or_default();
        codes.sort();
        codes
    };
    let first = loaded.iter().find(|u| u.id == users[0].id).unwrap();
    let second = loaded.iter().find(|u| u.id == users[1].id).unwrap();
    assert_eq!(codes(first), vec!["CHOIR", "YOUTH"]);
    assert_eq!(codes(second), vec!["YOUTH"]);
}
