use std::sync::Arc;

use wqp_core::AppError;
use wqp_domain::UserId;

use crate::CreateRoleInput;
use crate::test_support::{FakePasswordHasher, FakeRbacStore, builtin_catalog, rbac_service};

use super::{RegisterUserInput, UpdateUserInput, UserService};

fn setup() -> (Arc<FakeRbacStore>, UserService) {
    let store = FakeRbacStore::with_catalog(&builtin_catalog());
    let service = UserService::new(store.clone(), Arc::new(FakePasswordHasher));
    (store, service)
}

fn registration(username: &str) -> RegisterUserInput {
    RegisterUserInput {
        username: username.to_owned(),
        email: Some(format!("{username}@example.com")),
        password: "correct horse battery".to_owned(),
        role_label: None,
    }
}

#[tokio::test]
async fn registration_hashes_password_and_defaults_role_label() {
    let (_store, service) = setup();

    let user = service.register_user(registration("alice")).await;

    assert!(user.is_ok());
    let user = user.unwrap_or_else(|_| unreachable!());
    assert_eq!(user.credential_hash, "hashed::correct horse battery");
    assert_eq!(user.role_label, "user");
    assert_eq!(
        user.email.as_ref().map(|email| email.as_str()),
        Some("alice@example.com")
    );
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (_store, service) = setup();
    assert!(service.register_user(registration("alice")).await.is_ok());

    let duplicate = service.register_user(registration("alice")).await;

    assert!(matches!(duplicate, Err(AppError::DuplicateKey(_))));
}

#[tokio::test]
async fn short_password_and_bad_email_are_validation_errors() {
    let (_store, service) = setup();

    let short_password = service
        .register_user(RegisterUserInput {
            password: "short".to_owned(),
            ..registration("alice")
        })
        .await;
    let bad_email = service
        .register_user(RegisterUserInput {
            email: Some("not-an-email".to_owned()),
            ..registration("bob")
        })
        .await;

    assert!(matches!(short_password, Err(AppError::Validation(_))));
    assert!(matches!(bad_email, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn find_by_username_distinguishes_absent_from_failure() {
    let (_store, service) = setup();
    assert!(service.register_user(registration("alice")).await.is_ok());

    let found = service.find_by_username("alice").await;
    let absent = service.find_by_username("mallory").await;

    assert!(matches!(found, Ok(Some(_))));
    assert!(matches!(absent, Ok(None)));
}

#[tokio::test]
async fn update_replaces_profile_fields() {
    let (_store, service) = setup();
    let user = service
        .register_user(registration("alice"))
        .await
        .unwrap_or_else(|error| panic!("register: {error}"));

    let updated = service
        .update_user(
            user.id,
            UpdateUserInput {
                username: "alice.w".to_owned(),
                email: Some(String::new()),
                role_label: "analyst".to_owned(),
            },
        )
        .await;

    assert!(updated.is_ok());
    let updated = updated.unwrap_or_else(|_| unreachable!());
    assert_eq!(updated.username.as_str(), "alice.w");
    assert!(updated.email.is_none());
    assert_eq!(updated.role_label, "analyst");
}

#[tokio::test]
async fn update_cannot_take_another_users_name() {
    let (_store, service) = setup();
    assert!(service.register_user(registration("alice")).await.is_ok());
    let bob = service
        .register_user(registration("bob"))
        .await
        .unwrap_or_else(|error| panic!("register: {error}"));

    let result = service
        .update_user(
            bob.id,
            UpdateUserInput {
                username: "alice".to_owned(),
                email: None,
                role_label: "user".to_owned(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::DuplicateKey(_))));
}

#[tokio::test]
async fn deleting_user_removes_memberships() {
    let (store, service) = setup();
    let rbac = rbac_service(&store, builtin_catalog());
    let role = rbac
        .create_role(CreateRoleInput {
            name: "viewer".to_owned(),
            description: None,
        })
        .await
        .unwrap_or_else(|error| panic!("create role: {error}"));
    let user = service
        .register_user(registration("alice"))
        .await
        .unwrap_or_else(|error| panic!("register: {error}"));
    assert!(rbac.replace_role_members(role.id, vec![user.id]).await.is_ok());

    assert!(service.delete_user(user.id).await.is_ok());

    assert!(store.member_rows(role.id).await.is_empty());
    assert!(matches!(
        service.get_user(user.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_user(UserId::new()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn batch_registration_reports_blank_and_taken_rows() {
    let (_store, service) = setup();
    assert!(service.register_user(registration("alice")).await.is_ok());

    let report = service
        .register_users(vec![
            registration("bob"),
            registration("  "),
            RegisterUserInput {
                password: String::new(),
                ..registration("carol")
            },
            registration("alice"),
            registration("dave"),
            registration("bob"),
        ])
        .await;

    assert!(report.is_ok());
    let report = report.unwrap_or_default();
    let created = report
        .created
        .iter()
        .map(|user| user.username.as_str())
        .collect::<Vec<_>>();
    assert_eq!(created, vec!["bob", "dave"]);
    let failed_rows = report
        .failures
        .iter()
        .map(|failure| (failure.row, failure.username.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        failed_rows,
        vec![(2, "  "), (3, "carol"), (4, "alice"), (6, "bob")]
    );
    assert!(
        report
            .failures
            .iter()
            .all(|failure| !failure.reason.is_empty())
    );
    assert_eq!(service.list_users().await.unwrap_or_default().len(), 3);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let (_store, service) = setup();

    let result = service.register_users(Vec::new()).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}
