//! Local account registry and session.
//!
//! Accounts live in one shared list; passwords are compared in plain text.
//! This mirrors the stored data format and is not a security boundary.

use std::sync::Arc;

use crate::domain::{User, UserAccount};
use crate::storage::{keys, KeyValueStore};

use super::{ServiceError, ServiceResult};

pub struct AuthService {
    store: Arc<dyn KeyValueStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Registers a new account and logs it in.
    pub fn signup(&self, name: &str, email: &str, password: &str) -> ServiceResult<User> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid("name is required"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::invalid("a valid email is required"));
        }
        if password.is_empty() {
            return Err(ServiceError::invalid("password is required"));
        }

        let mut accounts = self.accounts()?;
        if accounts.iter().any(|a| a.email.eq_ignore_ascii_case(email)) {
            tracing::warn!(email, "signup rejected: email already registered");
            return Err(ServiceError::DuplicateEmail(email.to_string()));
        }
        let account = UserAccount::new(name, email, password);
        let user = account.to_user();
        accounts.push(account);
        self.store
            .set(keys::USERS, &serde_json::to_string(&accounts)?)?;
        self.set_session(&user)?;
        tracing::info!(user = %user.id, "registered account");
        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> ServiceResult<User> {
        let accounts = self.accounts()?;
        let Some(account) = accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
        else {
            tracing::warn!(email, "login failed");
            return Err(ServiceError::InvalidCredentials);
        };
        let user = account.to_user();
        self.set_session(&user)?;
        tracing::info!(user = %user.id, "logged in");
        Ok(user)
    }

    pub fn logout(&self) -> ServiceResult<()> {
        self.store.remove(keys::SESSION)?;
        tracing::info!("logged out");
        Ok(())
    }

    /// The persisted session, if any. An unreadable session counts as logged out.
    pub fn current_user(&self) -> ServiceResult<Option<User>> {
        let Some(raw) = self.store.get(keys::SESSION)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable session");
                Ok(None)
            }
        }
    }

    /// Every registered account.
    pub fn accounts(&self) -> ServiceResult<Vec<UserAccount>> {
        let Some(raw) = self.store.get(keys::USERS)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(accounts) => Ok(accounts),
            Err(err) => {
                let kept = self.store.quarantine(keys::USERS, &raw)?;
                tracing::warn!(error = %err, kept = %kept, "account list unreadable; set aside");
                Ok(Vec::new())
            }
        }
    }

    fn set_session(&self, user: &User) -> ServiceResult<()> {
        self.store.set(keys::SESSION, &serde_json::to_string(user)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn signup_logs_the_user_in() {
        let auth = service();
        let user = auth.signup("Asha Rao", "asha@example.com", "pw").unwrap();
        assert_eq!(auth.current_user().unwrap(), Some(user.clone()));
        auth.logout().unwrap();
        assert_eq!(auth.current_user().unwrap(), None);
        assert_eq!(auth.login("asha@example.com", "pw").unwrap(), user);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let auth = service();
        auth.signup("Asha", "asha@example.com", "pw").unwrap();
        let err = auth.signup("Other", " ASHA@example.com ", "pw2").unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail(_)));
        assert_eq!(auth.accounts().unwrap().len(), 1);
    }

    #[test]
    fn wrong_password_fails() {
        let auth = service();
        auth.signup("Asha", "asha@example.com", "pw").unwrap();
        auth.logout().unwrap();
        assert!(matches!(
            auth.login("asha@example.com", "nope"),
            Err(ServiceError::InvalidCredentials)
        ));
        assert_eq!(auth.current_user().unwrap(), None);
    }

    #[test]
    fn unreadable_account_list_survives_the_next_signup() {
        let backing = Arc::new(MemoryStore::new());
        let raw = r#"[{"id":"1","name":"Old","email":"old@x.y"}]"#;
        backing.set(keys::USERS, raw).unwrap();
        let auth = AuthService::new(backing.clone());

        auth.signup("New", "new@x.y", "pw").unwrap();
        assert_eq!(auth.accounts().unwrap().len(), 1);
        assert_eq!(
            backing.get(&keys::quarantined(keys::USERS)).unwrap().as_deref(),
            Some(raw)
        );
    }

    #[test]
    fn blank_fields_are_invalid() {
        let auth = service();
        assert!(matches!(
            auth.signup(" ", "a@b.c", "pw"),
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            auth.signup("A", "nope", "pw"),
            Err(ServiceError::Invalid(_))
        ));
    }
}
