//! Daily log rows. Written alongside status changes in
//! [`Database::record_status_event`]; read back only for auditing.

use crate::{Database, DbResult};

/// A log row to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDailyLog {
    pub quiz_score: i64,
    pub focus_minutes: i64,
    pub status_label: String,
}

impl NewDailyLog {
    pub fn new(quiz_score: i64, focus_minutes: i64, status_label: impl Into<String>) -> Self {
        Self {
            quiz_score,
            focus_minutes,
            status_label: status_label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLog {
    pub id: i64,
    pub student_id: String,
    pub quiz_score: i64,
    pub focus_minutes: i64,
    pub status_label: String,
    pub created_at: i64,
}

impl Database {
    /// All log rows for a student, oldest first.
    pub async fn daily_logs_for_student(&self, student_id: &str) -> DbResult<Vec<DailyLog>> {
        let rows: Vec<(i64, String, i64, i64, String, i64)> = sqlx::query_as(
            r#"SELECT id, student_id, quiz_score, focus_minutes, status, created_at
               FROM daily_logs WHERE student_id = ? ORDER BY id ASC"#,
        )
        .bind(student_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DailyLog {
                id: r.0,
                student_id: r.1,
                quiz_score: r.2,
                focus_minutes: r.3,
                status_label: r.4,
                created_at: r.5,
            })
            .collect())
    }
}
