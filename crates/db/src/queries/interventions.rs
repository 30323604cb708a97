//! Intervention queries.

use focus_guard_core::{Intervention, InterventionStatus, StudentStatus};

use crate::{now_unix, Database, DbResult};

type InterventionRow = (i64, String, String, String, i64, Option<i64>);

fn intervention_from_row(row: InterventionRow) -> DbResult<Intervention> {
    Ok(Intervention {
        id: row.0,
        student_id: row.1,
        task_description: row.2,
        status: row.3.parse()?,
        assigned_at: row.4,
        completed_at: row.5,
    })
}

impl Database {
    pub async fn get_intervention(&self, id: i64) -> DbResult<Option<Intervention>> {
        let row: Option<InterventionRow> = sqlx::query_as(
            r#"SELECT id, student_id, task_description, status, assigned_at, completed_at
               FROM interventions WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        row.map(intervention_from_row).transpose()
    }

    /// The most recently assigned pending intervention for a student.
    pub async fn latest_pending_intervention(
        &self,
        student_id: &str,
    ) -> DbResult<Option<Intervention>> {
        let row: Option<InterventionRow> = sqlx::query_as(
            r#"SELECT id, student_id, task_description, status, assigned_at, completed_at
               FROM interventions
               WHERE student_id = ? AND status = ?
               ORDER BY assigned_at DESC, id DESC
               LIMIT 1"#,
        )
        .bind(student_id)
        .bind(InterventionStatus::Pending.as_str())
        .fetch_optional(self.pool())
        .await?;
        row.map(intervention_from_row).transpose()
    }

    /// Create a pending intervention and move the student to `remedial`.
    ///
    /// Returns `None` (nothing written) when the student does not exist.
    pub async fn assign_intervention(
        &self,
        student_id: &str,
        task_description: &str,
    ) -> DbResult<Option<Intervention>> {
        let now = now_unix();
        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query("UPDATE students SET status = ?, updated_at = ? WHERE id = ?")
            .bind(StudentStatus::Remedial.as_str())
            .bind(now)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let inserted = sqlx::query(
            r#"INSERT INTO interventions (student_id, task_description, status, assigned_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(student_id)
        .bind(task_description)
        .bind(InterventionStatus::Pending.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(Intervention {
            id: inserted.last_insert_rowid(),
            student_id: student_id.to_string(),
            task_description: task_description.to_string(),
            status: InterventionStatus::Pending,
            assigned_at: now,
            completed_at: None,
        }))
    }

    /// Mark a pending intervention completed and return the student to `normal`.
    ///
    /// Only a pending row matching both ids is touched. Returns `false` (and
    /// leaves the student untouched) when there is no such row.
    pub async fn complete_intervention(
        &self,
        intervention_id: i64,
        student_id: &str,
    ) -> DbResult<bool> {
        let now = now_unix();
        let mut tx = self.pool().begin().await?;

        let completed = sqlx::query(
            r#"UPDATE interventions SET status = ?, completed_at = ?
               WHERE id = ? AND student_id = ? AND status = ?"#,
        )
        .bind(InterventionStatus::Completed.as_str())
        .bind(now)
        .bind(intervention_id)
        .bind(student_id)
        .bind(InterventionStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;
        if completed.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE students SET status = ?, updated_at = ? WHERE id = ?")
            .bind(StudentStatus::Normal.as_str())
            .bind(now)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
