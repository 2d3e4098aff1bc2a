pub mod achievements;
pub mod advisor;
pub mod analytics;
pub mod format;
pub mod insights;
pub mod report;
pub mod services;
pub mod time;
