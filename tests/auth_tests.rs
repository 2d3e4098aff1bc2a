mod common;

use std::sync::Arc;

use common::temp_file_store;
use paisapal_core::core::services::{AuthService, ServiceError};
use paisapal_core::domain::UserAccount;
use paisapal_core::storage::{keys, KeyValueStore};

#[test]
fn accounts_and_session_persist_on_disk() {
    let files = temp_file_store(3);
    let shared: Arc<dyn KeyValueStore> = files.clone();
    let user = AuthService::new(shared.clone())
        .signup("Meera Iyer", "meera@example.com", "hunter2")
        .unwrap();

    let again = AuthService::new(shared);
    assert_eq!(again.current_user().unwrap(), Some(user.clone()));
    again.logout().unwrap();
    assert_eq!(files.get(keys::SESSION).unwrap(), None);
    assert_eq!(again.login("meera@example.com", "hunter2").unwrap().id, user.id);
}

#[test]
fn stored_account_list_keeps_its_shape() {
    let files = temp_file_store(3);
    let auth = AuthService::new(files.clone());
    auth.signup("Meera", "meera@example.com", "pw").unwrap();
    let raw = files.get(keys::USERS).unwrap().unwrap();
    let accounts: Vec<UserAccount> = serde_json::from_str(&raw).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].password, "pw");
    let session = files.get(keys::SESSION).unwrap().unwrap();
    assert!(!session.contains("password"));
}

#[test]
fn login_is_an_exact_match() {
    let files = temp_file_store(3);
    let auth = AuthService::new(files);
    auth.signup("Meera", "meera@example.com", "pw").unwrap();
    auth.logout().unwrap();
    for (email, password) in [
        ("MEERA@example.com", "pw"),
        ("meera@example.com", "PW"),
        ("someone@example.com", "pw"),
    ] {
        assert!(matches!(
            auth.login(email, password),
            Err(ServiceError::InvalidCredentials)
        ));
    }
}
