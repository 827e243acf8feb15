use std::sync::Arc;

use tokio::task::JoinSet;

use wqp_application::{
    AssignmentRepository, CreateRoleInput, NewRoleRecord, NewUserRecord, PermissionRepository,
    RbacService, RoleRepository, UserRepository,
};
use wqp_core::AppError;
use wqp_domain::{PermissionCatalog, PermissionId, RoleName, UserId, Username};

use super::InMemoryRbacStore;

async fn seeded_store() -> (Arc<InMemoryRbacStore>, Arc<PermissionCatalog>) {
    let catalog =
        Arc::new(PermissionCatalog::builtin().unwrap_or_else(|error| panic!("catalog: {error}")));
    let store = Arc::new(InMemoryRbacStore::new());
    assert!(store.sync_catalog(&catalog, false).await.is_ok());
    (store, catalog)
}

async fn create_user(store: &InMemoryRbacStore, username: &str) -> UserId {
    store
        .create_user(NewUserRecord {
            username: Username::new(username).unwrap_or_else(|_| unreachable!()),
            email: None,
            credential_hash: "hash".to_owned(),
            role_label: "user".to_owned(),
        })
        .await
        .map(|user| user.id)
        .unwrap_or_else(|error| panic!("create user: {error}"))
}

fn ids(values: &[&str]) -> Vec<PermissionId> {
    values
        .iter()
        .map(|value| PermissionId::new(*value).unwrap_or_else(|_| unreachable!()))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_replacements_leave_exact_set() {
    let (store, catalog) = seeded_store().await;
    let service = RbacService::new(store.clone(), store.clone(), store.clone(), catalog);
    assert!(
        service
            .create_role(CreateRoleInput {
                name: "viewer".to_owned(),
                description: None,
            })
            .await
            .is_ok()
    );
    let target = ids(&["data_view", "device_view", "report_view"]);

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let service = service.clone();
        let target = target.clone();
        tasks.spawn(async move { service.replace_role_permissions("viewer", target).await });
    }

    while let Some(outcome) = tasks.join_next().await {
        assert!(matches!(outcome, Ok(Ok(()))));
    }

    let stored = store
        .list_role_permissions("viewer")
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|permission| permission.id)
        .collect::<Vec<_>>();
    assert_eq!(stored, target);
}

#[tokio::test]
async fn replace_with_unknown_permission_keeps_previous_rows() {
    let (store, _catalog) = seeded_store().await;
    let name = RoleName::new("analyst").unwrap_or_else(|_| unreachable!());
    assert!(
        store
            .create_role(NewRoleRecord {
                name: name.clone(),
                description: String::new(),
            })
            .await
            .is_ok()
    );
    assert!(
        store
            .replace_role_permissions(&name, &ids(&["data_view"]))
            .await
            .is_ok()
    );

    let result = store
        .replace_role_permissions(&name, &ids(&["data_view", "sample_purge"]))
        .await;

    assert!(matches!(result, Err(AppError::InvalidReference { .. })));
    assert_eq!(
        store
            .list_role_permissions("analyst")
            .await
            .unwrap_or_default()
            .len(),
        1
    );
}

#[tokio::test]
async fn deleting_role_and_user_removes_junction_rows() {
    let (store, _catalog) = seeded_store().await;
    let name = RoleName::new("operator").unwrap_or_else(|_| unreachable!());
    let role = store
        .create_role(NewRoleRecord {
            name: name.clone(),
            description: String::new(),
        })
        .await
        .unwrap_or_else(|error| panic!("create role: {error}"));
    let alice = create_user(&store, "alice").await;
    let bob = create_user(&store, "bob").await;
    assert!(store.replace_role_members(role.id, &[alice, bob]).await.is_ok());
    assert!(
        store
            .replace_role_permissions(&name, &ids(&["device_control"]))
            .await
            .is_ok()
    );

    assert_eq!(store.delete_user(bob).await.ok(), Some(true));
    assert_eq!(
        store
            .list_role_members(role.id)
            .await
            .unwrap_or_default()
            .len(),
        1
    );

    assert_eq!(store.delete_role(role.id).await.ok(), Some(true));
    assert!(
        store
            .list_roles_for_user(alice)
            .await
            .unwrap_or_default()
            .is_empty()
    );
    assert!(
        store
            .list_role_permissions("operator")
            .await
            .unwrap_or_default()
            .is_empty()
    );
    assert_eq!(store.delete_role(role.id).await.ok(), Some(false));
}

#[tokio::test]
async fn username_and_role_name_collisions_are_duplicate_keys() {
    let (store, _catalog) = seeded_store().await;
    create_user(&store, "alice").await;

    let duplicate_user = store
        .create_user(NewUserRecord {
            username: Username::new("alice").unwrap_or_else(|_| unreachable!()),
            email: None,
            credential_hash: "hash".to_owned(),
            role_label: "user".to_owned(),
        })
        .await;
    assert!(matches!(duplicate_user, Err(AppError::DuplicateKey(_))));

    for name in ["Manager", "manager"] {
        assert!(
            store
                .create_role(NewRoleRecord {
                    name: RoleName::new(name).unwrap_or_else(|_| unreachable!()),
                    description: String::new(),
                })
                .await
                .is_ok()
        );
    }
    let duplicate_role = store
        .create_role(NewRoleRecord {
            name: RoleName::new("Manager").unwrap_or_else(|_| unreachable!()),
            description: String::new(),
        })
        .await;
    assert!(matches!(duplicate_role, Err(AppError::DuplicateKey(_))));
}

#[tokio::test]
async fn pruning_catalog_drops_orphaned_grants() {
    let (store, _catalog) = seeded_store().await;
    let name = RoleName::new("viewer").unwrap_or_else(|_| unreachable!());
    assert!(
        store
            .create_role(NewRoleRecord {
                name: name.clone(),
                description: String::new(),
            })
            .await
            .is_ok()
    );
    assert!(
        store
            .replace_role_permissions(&name, &ids(&["data_view", "device_view"]))
            .await
            .is_ok()
    );

    let reduced = PermissionCatalog::from_json(
        r#"[{"id":"data_view","name":"View data","category":"data_management"}]"#,
    )
    .unwrap_or_else(|error| panic!("catalog: {error}"));
    let report = store.sync_catalog(&reduced, true).await;

    assert_eq!(report.map(|report| report.pruned).unwrap_or_default(), 16);
    assert_eq!(
        store
            .list_role_permissions("viewer")
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|permission| permission.id)
            .collect::<Vec<_>>(),
        ids(&["data_view"])
    );
}
