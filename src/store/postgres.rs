use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{ApplicationStatus, JobApplication, TransitionLog};
use crate::models::interview::{InterviewDetail, InterviewOutcome, InterviewStatus};
use crate::store::{
    ApplicationPage, ApplicationStore, InterviewStore, InterviewWrite, TransitionCommit,
};

/// Postgres-backed store. Transition commits run in a single transaction
/// with the application row locked, so the status compare-and-swap and the
/// interview write land together or not at all.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    candidate_id: Uuid,
    job_posting_id: Uuid,
    position_id: Option<Uuid>,
    status: ApplicationStatus,
    history: Json<TransitionLog>,
    withdrawn_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ApplicationRow> for JobApplication {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            candidate_id: row.candidate_id,
            job_posting_id: row.job_posting_id,
            position_id: row.position_id,
            status: row.status,
            history: row.history.0,
            withdrawn_at: row.withdrawn_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct InterviewRow {
    id: Uuid,
    job_application_id: Uuid,
    job_posting_id: Uuid,
    candidate_id: Uuid,
    status: InterviewStatus,
    result: Option<InterviewOutcome>,
    interview_date: NaiveDate,
    interview_time: Option<NaiveTime>,
    duration_minutes: Option<i32>,
    location: Option<String>,
    contact_person: Option<String>,
    required_documents: Json<Vec<String>>,
    notes: Option<String>,
    rescheduled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InterviewRow> for InterviewDetail {
    fn from(row: InterviewRow) -> Self {
        Self {
            id: row.id,
            job_application_id: row.job_application_id,
            job_posting_id: row.job_posting_id,
            candidate_id: row.candidate_id,
            status: row.status,
            result: row.result,
            interview_date: row.interview_date,
            interview_time: row.interview_time,
            duration_minutes: row.duration_minutes,
            location: row.location,
            contact_person: row.contact_person,
            required_documents: row.required_documents.0,
            notes: row.notes,
            rescheduled_at: row.rescheduled_at,
            completed_at: row.completed_at,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

async fn write_interview<'c>(
    tx: &mut sqlx::Transaction<'c, sqlx::Postgres>,
    write: InterviewWrite,
) -> Result<()> {
    match write {
        InterviewWrite::Create(interview) => {
            sqlx::query(
                r#"
                INSERT INTO interview_details (
                    id, job_application_id, job_posting_id, candidate_id,
                    status, result, interview_date, interview_time, duration_minutes,
                    location, contact_person, required_documents, notes,
                    rescheduled_at, completed_at, cancelled_at, created_at, updated_at
                ) VALUES (
                    $1, $2, $3, $4,
                    $5, $6, $7, $8, $9,
                    $10, $11, $12, $13,
                    $14, $15, $16, $17, $18
                )
                "#,
            )
            .bind(interview.id)
            .bind(interview.job_application_id)
            .bind(interview.job_posting_id)
            .bind(interview.candidate_id)
            .bind(interview.status)
            .bind(interview.result)
            .bind(interview.interview_date)
            .bind(interview.interview_time)
            .bind(interview.duration_minutes)
            .bind(interview.location)
            .bind(interview.contact_person)
            .bind(Json(interview.required_documents))
            .bind(interview.notes)
            .bind(interview.rescheduled_at)
            .bind(interview.completed_at)
            .bind(interview.cancelled_at)
            .bind(interview.created_at)
            .bind(interview.updated_at)
            .execute(&mut **tx)
            .await?;
        }
        InterviewWrite::Update(interview) => {
            let result = sqlx::query(
                r#"
                UPDATE interview_details
                SET status = $2, result = $3, interview_date = $4, interview_time = $5,
                    duration_minutes = $6, location = $7, contact_person = $8,
                    required_documents = $9, notes = $10, rescheduled_at = $11,
                    completed_at = $12, cancelled_at = $13, updated_at = $14
                WHERE id = $1
                "#,
            )
            .bind(interview.id)
            .bind(interview.status)
            .bind(interview.result)
            .bind(interview.interview_date)
            .bind(interview.interview_time)
            .bind(interview.duration_minutes)
            .bind(interview.location)
            .bind(interview.contact_person)
            .bind(Json(interview.required_documents))
            .bind(interview.notes)
            .bind(interview.rescheduled_at)
            .bind(interview.completed_at)
            .bind(interview.cancelled_at)
            .bind(interview.updated_at)
            .execute(&mut **tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(Error::InterviewNotFound);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn insert(&self, application: &JobApplication) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_applications (
                id, candidate_id, job_posting_id, position_id,
                status, history, withdrawn_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(application.id)
        .bind(application.candidate_id)
        .bind(application.job_posting_id)
        .bind(application.position_id)
        .bind(application.status)
        .bind(Json(&application.history))
        .bind(application.withdrawn_at)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateApplication
            } else {
                Error::from(e)
            }
        })?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"SELECT * FROM job_applications WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(JobApplication::from))
    }

    async fn find_by_pair(
        &self,
        candidate_id: Uuid,
        job_posting_id: Uuid,
    ) -> Result<Option<JobApplication>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"SELECT * FROM job_applications WHERE candidate_id = $1 AND job_posting_id = $2"#,
        )
        .bind(candidate_id)
        .bind(job_posting_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(JobApplication::from))
    }

    async fn list_by_candidate(
        &self,
        candidate_id: Uuid,
        page: &ApplicationPage,
    ) -> Result<(Vec<JobApplication>, i64)> {
        let direction = if page.ascending { "ASC" } else { "DESC" };

        let query = format!(
            r#"
            SELECT * FROM job_applications
            WHERE candidate_id = $1
              AND ($2::application_status IS NULL OR status = $2)
            ORDER BY created_at {direction}, id {direction}
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(candidate_id)
            .bind(page.status)
            .bind(page.capped_limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM job_applications
            WHERE candidate_id = $1
              AND ($2::application_status IS NULL OR status = $2)
            "#,
        )
        .bind(candidate_id)
        .bind(page.status)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(JobApplication::from).collect(), total))
    }

    async fn commit(&self, commit: TransitionCommit) -> Result<JobApplication> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"SELECT * FROM job_applications WHERE id = $1 FOR UPDATE"#,
        )
        .bind(commit.application_id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut application = JobApplication::from(row.ok_or(Error::ApplicationNotFound)?);

        if application.status != commit.expected_status {
            // Dropping the transaction rolls everything back.
            return Err(Error::StaleStatus(commit.expected_status));
        }

        application.apply_transition(commit.record);

        sqlx::query(
            r#"
            UPDATE job_applications
            SET status = $2, history = $3, withdrawn_at = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(application.id)
        .bind(application.status)
        .bind(Json(&application.history))
        .bind(application.withdrawn_at)
        .bind(application.updated_at)
        .execute(&mut *tx)
        .await?;

        if let Some(write) = commit.interview {
            write_interview(&mut tx, write).await?;
        }

        tx.commit().await?;
        Ok(application)
    }
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn get_interview(&self, id: Uuid) -> Result<Option<InterviewDetail>> {
        let row =
            sqlx::query_as::<_, InterviewRow>(r#"SELECT * FROM interview_details WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(InterviewDetail::from))
    }

    async fn find_latest_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewDetail>> {
        let row = sqlx::query_as::<_, InterviewRow>(
            r#"
            SELECT * FROM interview_details
            WHERE job_application_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(InterviewDetail::from))
    }

    async fn list_for_posting(&self, job_posting_id: Uuid) -> Result<Vec<InterviewDetail>> {
        let rows = sqlx::query_as::<_, InterviewRow>(
            r#"
            SELECT * FROM interview_details
            WHERE job_posting_id = $1
            ORDER BY interview_date, interview_time
            "#,
        )
        .bind(job_posting_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(InterviewDetail::from).collect())
    }

    async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<InterviewDetail>> {
        let rows = sqlx::query_as::<_, InterviewRow>(
            r#"
            SELECT * FROM interview_details
            WHERE candidate_id = $1
            ORDER BY interview_date, interview_time
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(InterviewDetail::from).collect())
    }
}
