// crates/db/src/queries/mod.rs
// Status store CRUD operations for the focus-guard SQLite database.

pub mod daily_logs;
pub mod interventions;
pub mod students;
