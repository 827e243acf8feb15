use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinSet;
use uuid::Uuid;

use wqp_application::{
    AssignmentRepository, NewRoleRecord, NewUserRecord, PermissionRepository, RoleRecordUpdate,
    RoleRepository, UserRepository,
};
use wqp_core::{AppError, ReferenceKind};
use wqp_domain::{PermissionCatalog, PermissionId, Role, RoleName, UserId, Username};

use super::PostgresRbacRepository;
use crate::PostgresUserRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres rbac tests: {error}");
    }

    let repository = PostgresRbacRepository::new(pool.clone());
    let catalog = PermissionCatalog::builtin().unwrap_or_else(|error| panic!("catalog: {error}"));
    if let Err(error) = repository.sync_catalog(&catalog, false).await {
        panic!("failed to sync permission catalog in test: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..12])
}

fn permission_ids(values: &[&str]) -> Vec<PermissionId> {
    values
        .iter()
        .map(|value| PermissionId::new(*value).unwrap_or_else(|_| unreachable!()))
        .collect()
}

async fn create_role(repository: &PostgresRbacRepository, name: &str) -> Role {
    repository
        .create_role(NewRoleRecord {
            name: RoleName::new(name).unwrap_or_else(|_| unreachable!()),
            description: String::new(),
        })
        .await
        .unwrap_or_else(|error| panic!("failed to create role in test: {error}"))
}

async fn create_user(pool: &PgPool, prefix: &str) -> UserId {
    PostgresUserRepository::new(pool.clone())
        .create_user(NewUserRecord {
            username: Username::new(unique(prefix)).unwrap_or_else(|_| unreachable!()),
            email: None,
            credential_hash: "hash".to_owned(),
            role_label: "user".to_owned(),
        })
        .await
        .map(|user| user.id)
        .unwrap_or_else(|error| panic!("failed to create user in test: {error}"))
}

async fn stored_grants(repository: &PostgresRbacRepository, role_name: &str) -> Vec<String> {
    repository
        .list_role_permissions(role_name)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|permission| permission.id.to_string())
        .collect()
}

#[tokio::test]
async fn replace_role_permissions_overwrites_previous_set() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let role = create_role(&repository, &unique("analyst")).await;

    assert!(
        repository
            .replace_role_permissions(&role.name, &permission_ids(&["data_view", "report_view"]))
            .await
            .is_ok()
    );
    assert!(
        repository
            .replace_role_permissions(
                &role.name,
                &permission_ids(&["report_create", "report_view"])
            )
            .await
            .is_ok()
    );

    assert_eq!(
        stored_grants(&repository, role.name.as_str()).await,
        vec!["report_create".to_owned(), "report_view".to_owned()]
    );

    assert!(repository.replace_role_permissions(&role.name, &[]).await.is_ok());
    assert!(stored_grants(&repository, role.name.as_str()).await.is_empty());
}

#[tokio::test]
async fn unknown_permission_rolls_back_whole_replacement() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let role = create_role(&repository, &unique("viewer")).await;
    assert!(
        repository
            .replace_role_permissions(&role.name, &permission_ids(&["data_view"]))
            .await
            .is_ok()
    );

    let result = repository
        .replace_role_permissions(
            &role.name,
            &permission_ids(&["device_view", "sample_purge"]),
        )
        .await;

    match result {
        Err(AppError::InvalidReference { kind, ids }) => {
            assert_eq!(kind, ReferenceKind::Permission);
            assert_eq!(ids, vec!["sample_purge".to_owned()]);
        }
        other => panic!("expected invalid reference, got {other:?}"),
    }
    assert_eq!(
        stored_grants(&repository, role.name.as_str()).await,
        vec!["data_view".to_owned()]
    );
}

#[tokio::test]
async fn unknown_member_rolls_back_whole_replacement() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool.clone());
    let role = create_role(&repository, &unique("operator")).await;
    let alice = create_user(&pool, "alice").await;
    assert!(repository.replace_role_members(role.id, &[alice]).await.is_ok());

    let ghost = UserId::new();
    let result = repository
        .replace_role_members(role.id, &[alice, ghost])
        .await;

    assert!(matches!(
        result,
        Err(AppError::InvalidReference {
            kind: ReferenceKind::User,
            ..
        })
    ));
    let members = repository.list_role_members(role.id).await.unwrap_or_default();
    assert_eq!(members.len(), 1);
    assert_eq!(members.first().map(|member| member.id), Some(alice));
}

#[tokio::test]
async fn replacing_members_of_missing_role_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let result = repository
        .replace_role_members(wqp_domain::RoleId::new(), &[])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let missing_name = RoleName::new(unique("ghost")).unwrap_or_else(|_| unreachable!());
    let result = repository
        .replace_role_permissions(&missing_name, &permission_ids(&["data_view"]))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn concurrent_identical_replacements_converge() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let role = create_role(&repository, &unique("manager")).await;
    let target = permission_ids(&["data_download", "data_upload", "data_view"]);

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let repository = repository.clone();
        let role_name = role.name.clone();
        let target = target.clone();
        tasks.spawn(async move {
            repository
                .replace_role_permissions(&role_name, &target)
                .await
        });
    }

    while let Some(outcome) = tasks.join_next().await {
        assert!(matches!(outcome, Ok(Ok(()))));
    }

    assert_eq!(
        stored_grants(&repository, role.name.as_str()).await,
        vec![
            "data_download".to_owned(),
            "data_upload".to_owned(),
            "data_view".to_owned()
        ]
    );
}

#[tokio::test]
async fn role_names_differing_in_case_are_distinct() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let suffix = &Uuid::new_v4().simple().to_string()[..12];
    let upper = create_role(&repository, &format!("Manager-{suffix}")).await;
    let lower = create_role(&repository, &format!("manager-{suffix}")).await;

    assert!(
        repository
            .replace_role_permissions(&upper.name, &permission_ids(&["data_delete"]))
            .await
            .is_ok()
    );

    assert_eq!(
        stored_grants(&repository, upper.name.as_str()).await,
        vec!["data_delete".to_owned()]
    );
    assert!(stored_grants(&repository, lower.name.as_str()).await.is_empty());

    let duplicate = repository
        .create_role(NewRoleRecord {
            name: upper.name.clone(),
            description: String::new(),
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::DuplicateKey(_))));
}

#[tokio::test]
async fn rename_leaves_grants_under_previous_name() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool);
    let role = create_role(&repository, &unique("field")).await;
    assert!(
        repository
            .replace_role_permissions(&role.name, &permission_ids(&["device_view"]))
            .await
            .is_ok()
    );

    let renamed = RoleName::new(unique("site")).unwrap_or_else(|_| unreachable!());
    let updated = repository
        .update_role(
            role.id,
            RoleRecordUpdate {
                name: renamed.clone(),
                description: "renamed".to_owned(),
            },
        )
        .await;
    assert_eq!(
        updated
            .ok()
            .flatten()
            .map(|role| role.name.as_str().to_owned()),
        Some(renamed.as_str().to_owned())
    );

    assert!(stored_grants(&repository, renamed.as_str()).await.is_empty());
    assert_eq!(
        stored_grants(&repository, role.name.as_str()).await,
        vec!["device_view".to_owned()]
    );
}

#[tokio::test]
async fn delete_role_clears_both_junction_tables() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool.clone());
    let role = create_role(&repository, &unique("retired")).await;
    let alice = create_user(&pool, "alice").await;
    assert!(repository.replace_role_members(role.id, &[alice]).await.is_ok());
    assert!(
        repository
            .replace_role_permissions(&role.name, &permission_ids(&["system_monitor"]))
            .await
            .is_ok()
    );

    assert_eq!(repository.delete_role(role.id).await.ok(), Some(true));

    assert!(stored_grants(&repository, role.name.as_str()).await.is_empty());
    assert!(
        repository
            .list_roles_for_user(alice)
            .await
            .unwrap_or_default()
            .is_empty()
    );
    assert_eq!(repository.delete_role(role.id).await.ok(), Some(false));
}

#[tokio::test]
async fn deleting_user_removes_memberships() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRbacRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let role = create_role(&repository, &unique("crew")).await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    assert!(repository.replace_role_members(role.id, &[alice, bob]).await.is_ok());

    assert_eq!(users.delete_user(bob).await.ok(), Some(true));

    let members = repository.list_role_members(role.id).await.unwrap_or_default();
    assert_eq!(
        members.into_iter().map(|member| member.id).collect::<Vec<_>>(),
        vec![alice]
    );
    assert_eq!(
        users.find_missing_user_ids(&[alice, bob]).await.ok(),
        Some(vec![bob])
    );
}
