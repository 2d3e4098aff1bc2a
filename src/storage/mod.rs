pub mod json_backend;
pub mod memory;

use crate::errors::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Abstraction over string key-value persistence.
///
/// Values are JSON documents; each `set` replaces the whole value.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Every stored key, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Copies an unreadable value aside so a later `set` on `key` cannot lose it.
    /// Returns the key the raw value now lives under.
    fn quarantine(&self, key: &str, raw: &str) -> Result<String> {
        let target = keys::quarantined(key);
        self.set(&target, raw)?;
        Ok(target)
    }
}

/// Key layout shared with data written by the browser application.
pub mod keys {
    pub const PREFIX: &str = "paisapal_";
    pub const USERS: &str = "paisapal_users";
    pub const SESSION: &str = "paisapal_user";

    pub fn expenses(user_id: &str) -> String {
        format!("{PREFIX}expenses_{user_id}")
    }

    pub fn goals(user_id: &str) -> String {
        format!("{PREFIX}goals_{user_id}")
    }

    pub fn achievements(user_id: &str) -> String {
        format!("{PREFIX}achievements_{user_id}")
    }

    pub fn income(user_id: &str) -> String {
        format!("{PREFIX}income_{user_id}")
    }

    /// Where an unreadable value for `key` is preserved.
    pub fn quarantined(key: &str) -> String {
        format!("{key}-corrupt")
    }

    /// The four per-user keys, in backup order.
    pub fn for_user(user_id: &str) -> [String; 4] {
        [
            expenses(user_id),
            goals(user_id),
            achievements(user_id),
            income(user_id),
        ]
    }
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;

#[cfg(test)]
mod tests {
    use super::{keys, KeyValueStore};

    #[test]
    fn per_user_keys_match_stored_layout() {
        assert_eq!(keys::expenses("171"), "paisapal_expenses_171");
        assert_eq!(keys::for_user("7")[3], "paisapal_income_7");
        assert_eq!(keys::quarantined(keys::USERS), "paisapal_users-corrupt");
    }

    #[test]
    fn quarantine_keeps_the_raw_text() {
        let store = super::MemoryStore::new();
        let target = store.quarantine("paisapal_goals_u1", "[{broken").unwrap();
        assert_eq!(target, "paisapal_goals_u1-corrupt");
        assert_eq!(store.get(&target).unwrap().as_deref(), Some("[{broken"));
    }
}
