//! Unit of work integration tests.

mod common;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use ministry_data::domain::Organization;
use ministry_data::errors::AppError;
use ministry_data::infra::repositories::{Includes, Predicate};
use ministry_data::infra::{
    OrganizationRepository, ReadRepository, SegmentRepository, WriteRepository,
};
use ministry_data::with_transaction;

use common::{add_organization, add_segment, add_users, persistence};

async fn organization_count(persistence: &ministry_data::Persistence) -> u64 {
    let uow = persistence.begin();
    let count = uow
        .repository::<OrganizationRepository>()
        .count(Predicate::all())
        .await
        .unwrap();
    uow.dispose().await.unwrap();
    count
}

#[tokio::test]
async fn test_repository_is_cached_per_type() {
    let persistence = persistence().await;
    let uow = persistence.begin();

    let first = uow.repository::<OrganizationRepository>();
    let second = uow.repository::<OrganizationRepository>();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&uow.segments(), &uow.segments()));
}

#[tokio::test]
async fn test_complete_returns_affected_rows() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    let org = add_organization(&uow, "Ministry A", "MOA").await;
    let users = add_users(&uow, 2).await;
    let segment = add_segment(&uow, org.id, "SEG1").await;
    let member_ids: Vec<_> = users.iter().map(|u| u.id).collect();
    uow.segments()
        .assign_users(segment.id, &member_ids)
        .await
        .unwrap();
    assert_eq!(uow.pending(), 6);

    assert_eq!(uow.complete().await.unwrap(), 6);
    assert_eq!(uow.pending(), 0);
    assert_eq!(uow.complete().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unit_of_work_stays_usable_after_complete() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    add_organization(&uow, "Ministry A", "MOA").await;
    uow.complete().await.unwrap();

    add_organization(&uow, "Ministry B", "MOB").await;
    uow.complete().await.unwrap();
    drop(uow);

    assert_eq!(organization_count(&persistence).await, 2);
}

#[tokio::test]
async fn test_dispose_discards_pending_writes() {
    let persistence = persistence().await;
    let uow = persistence.begin();
    add_organization(&uow, "Ministry A", "MOA").await;
    uow.dispose().await.unwrap();

    assert_eq!(organization_count(&persistence).await, 0);
}

#[tokio::test]
async fn test_dropping_without_complete_rolls_back() {
    let persistence = persistence().await;
    {
        let uow = persistence.begin();
        add_organization(&uow, "Ministry A", "MOA").await;
    }

    assert_eq!(organization_count(&persistence).await, 0);
}

#[tokio::test]
async fn test_transaction_commits_on_ok() {
    let persistence = persistence().await;

    let org = with_transaction!(persistence, |uow| {
        uow.repository::<OrganizationRepository>()
            .add(Organization::new("Ministry A", "MOA"))
            .await
    })
    .unwrap();

    let uow = persistence.begin();
    let found = uow
        .repository::<OrganizationRepository>()
        .find_by_key(org.id.into(), &Includes::none())
        .await
        .unwrap();
    assert_eq!(found.code, "MOA");
}

#[tokio::test]
async fn test_transaction_rolls_back_on_error() {
    let persistence = persistence().await;

    let result: Result<(), AppError> = persistence
        .transaction(|uow| {
            Box::pin(async move {
                let orgs = uow.repository::<OrganizationRepository>();
                orgs.add(Organization::new("Ministry A", "MOA")).await?;
                // Second insert violates the unique code
                orgs.add(Organization::new("Ministry A", "MOA")).await?;
                Ok(())
            })
        })
        .await;

    assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
    assert_eq!(organization_count(&persistence).await, 0);
}

#[tokio::test]
async fn test_cancelled_unit_of_work_persists_nothing() {
    let persistence = persistence().await;
    let token = CancellationToken::new();
    let uow = persistence.begin_with(token.clone());
    add_organization(&uow, "Ministry A", "MOA").await;

    token.cancel();
    assert!(uow.cancellation_token().is_cancelled());

    let orgs = uow.repository::<OrganizationRepository>();
    let after = orgs.add(Organization::new("Ministry B", "MOB")).await;
    assert!(matches!(after, Err(AppError::Cancelled)));
    assert!(matches!(uow.complete().await, Err(AppError::Cancelled)));
    drop(orgs);
    drop(uow);

    assert_eq!(organization_count(&persistence).await, 0);
}
