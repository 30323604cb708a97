//! Inline SQL migrations for the focus-guard schema.
//!
//! Each entry is a single statement and runs exactly once, tracked by
//! version in `_migrations`. Append only; never edit a shipped entry.

pub const MIGRATIONS: &[&str] = &[
    // students
    r#"
CREATE TABLE IF NOT EXISTS students (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    email      TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'normal',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
    // daily_logs (append-only audit trail)
    r#"
CREATE TABLE IF NOT EXISTS daily_logs (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id    TEXT NOT NULL REFERENCES students(id),
    quiz_score    INTEGER NOT NULL,
    focus_minutes INTEGER NOT NULL,
    status        TEXT NOT NULL,
    created_at    INTEGER NOT NULL
);
"#,
    r#"CREATE INDEX IF NOT EXISTS idx_daily_logs_student ON daily_logs(student_id, created_at);"#,
    // interventions
    r#"
CREATE TABLE IF NOT EXISTS interventions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id       TEXT NOT NULL REFERENCES students(id),
    task_description TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'pending',
    assigned_at      INTEGER NOT NULL,
    completed_at     INTEGER
);
"#,
    r#"CREATE INDEX IF NOT EXISTS idx_interventions_student_status ON interventions(student_id, status, assigned_at DESC);"#,
];
