#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use paisapal_core::core::services::{AuthService, FinanceStore};
use paisapal_core::core::time::FixedClock;
use paisapal_core::domain::User;
use paisapal_core::storage::{JsonFileStore, KeyValueStore};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct TestEnv {
    pub files: Arc<JsonFileStore>,
    pub auth: AuthService,
    pub finance: FinanceStore,
    pub user: User,
}

/// A logged-in user over a fresh file store, with the clock frozen at noon on `today`.
pub fn setup_test_env(today: NaiveDate) -> TestEnv {
    let files = temp_file_store(3);
    let shared: Arc<dyn KeyValueStore> = files.clone();
    let auth = AuthService::new(shared.clone());
    let user = auth
        .signup("Asha Rao", "asha@example.com", "secret")
        .expect("signup");
    let mut finance = FinanceStore::new(shared, Box::new(clock_on(today)));
    finance.switch_user(Some(&user)).expect("bind user");
    TestEnv {
        files,
        auth,
        finance,
        user,
    }
}

/// Re-opens the same directory with a fresh record store, as a restart would.
pub fn reopen(env: &TestEnv, today: NaiveDate) -> FinanceStore {
    let shared: Arc<dyn KeyValueStore> = env.files.clone();
    let mut finance = FinanceStore::new(shared, Box::new(clock_on(today)));
    finance.switch_user(Some(&env.user)).expect("bind user");
    finance
}

pub fn temp_file_store(retention: usize) -> Arc<JsonFileStore> {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    Arc::new(JsonFileStore::new(Some(base), Some(retention)).expect("create json store"))
}

pub fn clock_on(day: NaiveDate) -> FixedClock {
    FixedClock(day.and_hms_opt(12, 0, 0).expect("valid time").and_utc())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
