use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::job::{Job, JobStatus, JobUpdate};
use crate::services::store::{JobStore, StoreError};

const JOB_COLUMNS: &str =
    "job_id, user_id, status, image_url, roast_text, video_url, error, created_at, completed_at";

/// PostgreSQL-backed [`JobStore`].
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn job_from_row(row: &PgRow) -> Result<Job, sqlx::Error> {
    let status: String = row.try_get("status")?;

    Ok(Job {
        job_id: row.try_get("job_id")?,
        user_id: row.try_get("user_id")?,
        status: JobStatus::from(status),
        image_url: row.try_get("image_url")?,
        roast_text: row.try_get("roast_text")?,
        video_url: row.try_get("video_url")?,
        error: row.try_get("error")?,
        created_at: row.try_get("created_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn upsert_job(&self, job: &Job) -> Result<Job, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO roast_jobs
                (job_id, user_id, status, image_url, roast_text, video_url, error, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (job_id) DO UPDATE
            SET user_id = COALESCE(roast_jobs.user_id, EXCLUDED.user_id),
                image_url = EXCLUDED.image_url,
                roast_text = EXCLUDED.roast_text,
                created_at = EXCLUDED.created_at
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&job.job_id)
            .bind(&job.user_id)
            .bind(job.status.as_str())
            .bind(&job.image_url)
            .bind(&job.roast_text)
            .bind(&job.video_url)
            .bind(&job.error)
            .bind(job.created_at)
            .bind(job.completed_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(job_from_row(&row)?)
    }

    async fn apply_update(&self, update: &JobUpdate) -> Result<Job, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO roast_jobs (job_id, user_id, status, video_url, error, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (job_id) DO UPDATE
            SET status = EXCLUDED.status,
                video_url = EXCLUDED.video_url,
                error = EXCLUDED.error,
                completed_at = CASE
                    WHEN roast_jobs.status = 'completed'
                         AND EXCLUDED.status = 'completed'
                         AND roast_jobs.video_url IS NOT DISTINCT FROM EXCLUDED.video_url
                    THEN roast_jobs.completed_at
                    ELSE EXCLUDED.completed_at
                END,
                user_id = COALESCE(roast_jobs.user_id, EXCLUDED.user_id)
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&update.job_id)
            .bind(&update.user_id)
            .bind(update.status.as_str())
            .bind(&update.video_url)
            .bind(&update.error)
            .bind(update.completed_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(job_from_row(&row)?)
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM roast_jobs WHERE job_id = $1");

        let row = sqlx::query(&sql)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(job_from_row).transpose()?)
    }

    async fn list_jobs_by_user(&self, user_id: &str) -> Result<Vec<Job>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM roast_jobs WHERE user_id = $1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(job_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
