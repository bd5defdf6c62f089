use accord_dashboard::{
    CredentialTable, SessionService,
    error::AuthError,
    models::Role,
    session::{AUTHENTICATED_KEY, EMAIL_KEY, ROLE_KEY, Session, spawn_session_sweeper},
    storage::{MemorySessionStorage, SessionStorage, StorageState},
};
use chrono::TimeDelta;
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

// --- Helper Functions ---

fn create_service() -> (SessionService, Arc<MemorySessionStorage>) {
    let storage = Arc::new(MemorySessionStorage::new());
    let service = SessionService::new(storage.clone() as StorageState, CredentialTable::default());
    (service, storage)
}

// --- login ---

#[tokio::test]
async fn test_login_admin_sets_recorded_role() {
    let (service, _) = create_service();
    let sid = Uuid::new_v4();

    let session = service
        .login(sid, "admin@company.com", "admin123")
        .await
        .unwrap();

    assert_eq!(
        session,
        Session::Authenticated {
            email: "admin@company.com".to_string(),
            role: Role::Admin,
        }
    );
    assert_eq!(service.current(sid).await, session);
}

#[tokio::test]
async fn test_login_every_table_entry() {
    let (service, _) = create_service();

    for (email, password, role) in [
        ("admin@company.com", "admin123", Role::Admin),
        ("employee@company.com", "employee123", Role::Employee),
    ] {
        let sid = Uuid::new_v4();
        service.login(sid, email, password).await.unwrap();

        let current = service.current(sid).await;
        assert!(current.is_authenticated());
        assert_eq!(current.role(), Some(role));
        assert_eq!(current.email(), Some(email));
    }
}

#[tokio::test]
async fn test_login_unknown_email_leaves_session_anonymous() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();

    for email in ["nobody@company.com", "", "ADMIN@company.com", "admin@company.com "] {
        let result = service.login(sid, email, "admin123").await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    assert_eq!(service.current(sid).await, Session::Anonymous);
    assert_eq!(storage.session_count().await, 0);
}

#[tokio::test]
async fn test_login_wrong_password_is_rejected() {
    let (service, _) = create_service();
    let sid = Uuid::new_v4();

    let result = service.login(sid, "employee@company.com", "wrongpass").await;

    assert_eq!(result, Err(AuthError::InvalidCredentials));
    assert!(!service.current(sid).await.view().authenticated);
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let (service, _) = create_service();
    let sid = Uuid::new_v4();

    service.login(sid, "admin@company.com", "admin123").await.unwrap();
    let result = service.login(sid, "employee@company.com", "wrongpass").await;

    assert!(result.is_err());
    assert_eq!(service.current(sid).await.role(), Some(Role::Admin));
}

#[tokio::test]
async fn test_custom_credential_table() {
    assert!(CredentialTable::empty().is_empty());
    assert_eq!(CredentialTable::default().len(), 2);

    let storage = Arc::new(MemorySessionStorage::new()) as StorageState;
    let table = CredentialTable::empty().with_user("ops@company.com", "pw", Role::User);
    assert!(!table.is_empty());
    assert_eq!(table.len(), 1);
    let service = SessionService::new(storage, table);
    let sid = Uuid::new_v4();

    assert!(service.login(sid, "admin@company.com", "admin123").await.is_err());
    let session = service.login(sid, "ops@company.com", "pw").await.unwrap();
    assert_eq!(session.role(), Some(Role::User));
}

// --- logout ---

#[tokio::test]
async fn test_logout_is_idempotent() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();
    service.login(sid, "admin@company.com", "admin123").await.unwrap();

    service.logout(sid).await;
    let after_once = service.current(sid).await;
    let count_once = storage.session_count().await;

    service.logout(sid).await;
    let after_twice = service.current(sid).await;

    assert_eq!(after_once, Session::Anonymous);
    assert_eq!(after_once, after_twice);
    assert_eq!(count_once, 0);
    assert_eq!(storage.session_count().await, 0);
}

#[tokio::test]
async fn test_logout_without_session() {
    let (service, _) = create_service();
    let sid = Uuid::new_v4();

    service.logout(sid).await;

    assert_eq!(service.current(sid).await, Session::Anonymous);
}

#[tokio::test]
async fn test_logout_only_clears_own_session() {
    let (service, _) = create_service();
    let mine = Uuid::new_v4();
    let theirs = Uuid::new_v4();
    service.login(mine, "admin@company.com", "admin123").await.unwrap();
    service.login(theirs, "employee@company.com", "employee123").await.unwrap();

    service.logout(mine).await;

    assert!(!service.current(mine).await.is_authenticated());
    assert_eq!(service.current(theirs).await.role(), Some(Role::Employee));
}

// --- current (fail closed) ---

#[tokio::test]
async fn test_current_with_unknown_role_is_anonymous() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();
    storage.set_item(sid, AUTHENTICATED_KEY, "true".to_string()).await;
    storage.set_item(sid, EMAIL_KEY, "admin@company.com".to_string()).await;
    storage.set_item(sid, ROLE_KEY, "superuser".to_string()).await;

    assert_eq!(service.current(sid).await, Session::Anonymous);
}

#[tokio::test]
async fn test_current_with_missing_role_is_anonymous() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();
    storage.set_item(sid, AUTHENTICATED_KEY, "true".to_string()).await;
    storage.set_item(sid, EMAIL_KEY, "admin@company.com".to_string()).await;

    assert_eq!(service.current(sid).await, Session::Anonymous);
}

#[tokio::test]
async fn test_current_with_missing_email_is_anonymous() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();
    storage.set_item(sid, AUTHENTICATED_KEY, "true".to_string()).await;
    storage.set_item(sid, ROLE_KEY, "admin".to_string()).await;

    assert_eq!(service.current(sid).await, Session::Anonymous);
}

#[tokio::test]
async fn test_current_with_garbage_flag_is_anonymous() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();
    storage.set_item(sid, AUTHENTICATED_KEY, "yes".to_string()).await;
    storage.set_item(sid, EMAIL_KEY, "admin@company.com".to_string()).await;
    storage.set_item(sid, ROLE_KEY, "admin".to_string()).await;

    assert_eq!(service.current(sid).await, Session::Anonymous);
}

#[tokio::test]
async fn test_role_without_flag_is_anonymous() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();
    storage.set_item(sid, EMAIL_KEY, "admin@company.com".to_string()).await;
    storage.set_item(sid, ROLE_KEY, "admin".to_string()).await;

    assert_eq!(service.current(sid).await, Session::Anonymous);
}

#[test]
fn test_session_view_shape() {
    let anonymous = serde_json::to_value(Session::Anonymous.view()).unwrap();
    assert_eq!(anonymous, serde_json::json!({ "authenticated": false }));

    let admin = Session::Authenticated {
        email: "admin@company.com".to_string(),
        role: Role::Admin,
    };
    let view = serde_json::to_value(admin.view()).unwrap();
    assert_eq!(
        view,
        serde_json::json!({
            "authenticated": true,
            "email": "admin@company.com",
            "role": "admin"
        })
    );
}

// --- expiry ---

#[tokio::test]
async fn test_purge_expired_keeps_fresh_sessions() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();
    service.login(sid, "admin@company.com", "admin123").await.unwrap();

    assert_eq!(service.purge_expired(TimeDelta::hours(1)).await, 0);
    assert_eq!(service.purge_expired(TimeDelta::MAX).await, 0);
    assert_eq!(service.current(sid).await.role(), Some(Role::Admin));
    assert_eq!(storage.session_count().await, 1);
}

#[tokio::test]
async fn test_purge_expired_drops_old_sessions() {
    let (service, storage) = create_service();
    let sid = Uuid::new_v4();
    service.login(sid, "admin@company.com", "admin123").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(service.purge_expired(TimeDelta::milliseconds(10)).await, 1);
    assert_eq!(service.current(sid).await, Session::Anonymous);
    assert_eq!(storage.session_count().await, 0);
}

#[tokio::test]
async fn test_sweeper_bounds_the_store() {
    let (service, storage) = create_service();
    let service = Arc::new(service);
    for _ in 0..5 {
        service
            .login(Uuid::new_v4(), "employee@company.com", "employee123")
            .await
            .unwrap();
    }
    assert_eq!(storage.session_count().await, 5);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let sweeper = spawn_session_sweeper(
        service.clone(),
        TimeDelta::milliseconds(10),
        Duration::from_millis(10),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    sweeper.abort();

    assert_eq!(storage.session_count().await, 0);
}
