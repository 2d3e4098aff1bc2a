#![doc(test(attr(deny(warnings))))]

//! PaisaPal Core tracks personal expenses and savings goals, aggregates them
//! into summaries, and turns the numbers into insights, badges and reports.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("PaisaPal Core tracing initialized.");
    });
}
