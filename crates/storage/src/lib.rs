use std::{str::FromStr, time::Duration};

use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use thiserror::Error;
use tracing::debug;

use jobposts_core::{InvalidJobPostId, JobPost, JobPostId, JobPostPatch, NewJobPost};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = connect_options(database_url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        debug!(stage = "storage", "sqlite pool established");
        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle to operate on job posts.
    pub fn job_posts(&self) -> JobPostRepository {
        JobPostRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every pooled connection, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, StorageError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(StorageError::Connect)?
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);
    Ok(options)
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository responsible for the `job_posts` table.
///
/// Every method issues exactly one statement. Writes run to completion inside
/// their own transaction, which is committed before the method returns, so a
/// read on any pooled connection observes them. Identifiers are accepted in their wire
/// form and validated here.
#[derive(Clone)]
pub struct JobPostRepository {
    pool: SqlitePool,
}

impl JobPostRepository {
    /// Persists a new job post and returns it with its assigned identifier.
    pub async fn create(&self, record: &NewJobPost) -> Result<JobPost, JobPostError> {
        let id = JobPostId::generate();
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, JobPostRow>(
            "INSERT INTO job_posts (id, job_title, job_description) VALUES (?, ?, ?) \
             RETURNING id, job_title, job_description",
        )
        .bind(id.to_hex())
        .bind(record.job_title.as_deref())
        .bind(record.job_description.as_deref())
        .fetch_all(&mut *tx)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;

        row.into_domain()
    }

    /// Lists every job post in the order the store yields them.
    pub async fn list(&self) -> Result<Vec<JobPost>, JobPostError> {
        let rows = sqlx::query_as::<_, JobPostRow>(
            "SELECT id, job_title, job_description FROM job_posts",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(JobPostRow::into_domain).collect()
    }

    /// Loads a single job post, `None` when no record has the identifier.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<JobPost>, JobPostError> {
        let id: JobPostId = id.parse()?;
        let row = sqlx::query_as::<_, JobPostRow>(
            "SELECT id, job_title, job_description FROM job_posts WHERE id = ?",
        )
        .bind(id.to_hex())
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobPostRow::into_domain).transpose()
    }

    /// Overwrites the fields present in `patch` and returns the updated record.
    pub async fn update(
        &self,
        id: &str,
        patch: &JobPostPatch,
    ) -> Result<Option<JobPost>, JobPostError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let id: JobPostId = id.parse()?;
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, JobPostRow>(
            "UPDATE job_posts SET \
             job_title = CASE WHEN ?1 THEN ?2 ELSE job_title END, \
             job_description = CASE WHEN ?3 THEN ?4 ELSE job_description END \
             WHERE id = ?5 \
             RETURNING id, job_title, job_description",
        )
        .bind(patch.job_title.is_some())
        .bind(patch.job_title.clone().flatten())
        .bind(patch.job_description.is_some())
        .bind(patch.job_description.clone().flatten())
        .bind(id.to_hex())
        .fetch_all(&mut *tx)
        .await?
        .pop();
        tx.commit().await?;

        row.map(JobPostRow::into_domain).transpose()
    }

    /// Removes a job post and returns it as it was before deletion.
    pub async fn delete(&self, id: &str) -> Result<Option<JobPost>, JobPostError> {
        let id: JobPostId = id.parse()?;
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, JobPostRow>(
            "DELETE FROM job_posts WHERE id = ? RETURNING id, job_title, job_description",
        )
        .bind(id.to_hex())
        .fetch_all(&mut *tx)
        .await?
        .pop();
        tx.commit().await?;

        row.map(JobPostRow::into_domain).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobPostRow {
    id: String,
    job_title: Option<String>,
    job_description: Option<String>,
}

impl JobPostRow {
    fn into_domain(self) -> Result<JobPost, JobPostError> {
        let id = self
            .id
            .parse()
            .map_err(|_| JobPostError::CorruptRow(self.id.clone()))?;
        Ok(JobPost {
            id,
            job_title: self.job_title,
            job_description: self.job_description,
        })
    }
}

/// Errors raised by job post operations.
#[derive(Debug, Error)]
pub enum JobPostError {
    #[error("{0}")]
    InvalidId(#[from] InvalidJobPostId),
    #[error("stored job post has an unreadable id: {0}")]
    CorruptRow(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
