//! Seed command - Demo organization, segment and members.

use sea_orm::ColumnTrait;

use crate::cli::args::SeedArgs;
use crate::config::Config;
use crate::domain::{normalize_code, Organization, Segment, User};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{organization, OrganizationRepository, UserRepository};
use crate::infra::{Database, Persistence, ReadRepository, SegmentRepository, WriteRepository};

/// Execute the seed command
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let persistence = Persistence::new(db.get_connection());

    let code = normalize_code(&args.code);
    let uow = persistence.begin();
    let organizations = uow.repository::<OrganizationRepository>();
    if organizations
        .exists(organization::Column::Code.eq(code.clone()).into())
        .await?
    {
        tracing::warn!(code = %code, "Organization already seeded, nothing to do");
        return uow.dispose().await;
    }

    let org = organizations
        .add(Organization::new(args.organization, &code))
        .await?;

    let segments = uow.segments();
    let segment = segments
        .add(Segment::new(org.id, "SEG1", "Segment 1"))
        .await?;

    let users = uow.repository::<UserRepository>();
    let mut ids = Vec::with_capacity(args.users);
    for n in 1..=args.users {
        let mut user = User::new(
            format!("member{}@{}.example", n, code.to_lowercase()),
            format!("Member {}", n),
        );
        user.organization_id = Some(org.id);
        ids.push(users.add(user).await?.id);
    }

    if !segments.assign_users(segment.id, &ids).await? {
        return Err(AppError::internal("seeded segment vanished"));
    }

    let affected = uow.complete().await?;
    tracing::info!(
        organization = org.id,
        segment = segment.id,
        users = ids.len(),
        affected,
        "Seed data committed"
    );
    Ok(())
}
