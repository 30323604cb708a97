//! Student row queries.

use focus_guard_core::{Student, StudentStatus};

use crate::queries::daily_logs::NewDailyLog;
use crate::{now_unix, Database, DbResult};

/// Demo students upserted on startup: `(id, name, email)`.
pub const DEFAULT_STUDENTS: &[(&str, &str, &str)] = &[
    ("student_123", "Test Student", "student@example.com"),
    ("student-001", "Legacy Student", "legacy.student@example.com"),
    ("student 123", "Requested Student", "student.123@example.com"),
];

type StudentRow = (String, String, String, String, i64, i64);

fn student_from_row(row: StudentRow) -> DbResult<Student> {
    Ok(Student {
        id: row.0,
        name: row.1,
        email: row.2,
        status: row.3.parse()?,
        created_at: row.4,
        updated_at: row.5,
    })
}

impl Database {
    pub async fn get_student(&self, id: &str) -> DbResult<Option<Student>> {
        let row: Option<StudentRow> = sqlx::query_as(
            "SELECT id, name, email, status, created_at, updated_at FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        row.map(student_from_row).transpose()
    }

    /// Insert a student, or refresh name/email if the id exists.
    /// An existing row keeps its status.
    pub async fn upsert_student(&self, id: &str, name: &str, email: &str) -> DbResult<()> {
        let now = now_unix();
        sqlx::query(
            r#"INSERT INTO students (id, name, email, status, created_at, updated_at)
               VALUES (?1, ?2, ?3, 'normal', ?4, ?4)
               ON CONFLICT(id) DO UPDATE SET name = excluded.name, email = excluded.email"#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(now)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn seed_default_students(&self) -> DbResult<()> {
        for (id, name, email) in DEFAULT_STUDENTS {
            self.upsert_student(id, name, email).await?;
        }
        tracing::debug!(count = DEFAULT_STUDENTS.len(), "Seeded default students");
        Ok(())
    }

    /// Set a student's status and append `log` if given, in one transaction.
    ///
    /// Returns `false` (and writes nothing) when the student does not exist.
    pub async fn record_status_event(
        &self,
        student_id: &str,
        status: StudentStatus,
        log: Option<&NewDailyLog>,
    ) -> DbResult<bool> {
        let now = now_unix();
        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query("UPDATE students SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(log) = log {
            sqlx::query(
                r#"INSERT INTO daily_logs (student_id, quiz_score, focus_minutes, status, created_at)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(student_id)
            .bind(log.quiz_score)
            .bind(log.focus_minutes)
            .bind(&log.status_label)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
