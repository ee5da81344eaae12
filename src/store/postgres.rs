use std::marker::PhantomData;

use anyhow::Context;
use sqlx::error::ErrorKind;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::error::{require_non_empty, DevfileError, Result};
use crate::model::{Devfile, DevfileRecord, Page, User};
use crate::store::traits::{validate_page_request, DevfileDao, UserStore};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Data access object for one record scope, sharing this store's pool.
    pub fn devfiles<R: DevfileRecord>(&self) -> PostgresDevfileDao<R> {
        PostgresDevfileDao {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

/// Relational data access object, generic over the record scope.
///
/// Each operation runs in a single transaction against the scope's table.
pub struct PostgresDevfileDao<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for PostgresDevfileDao<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: DevfileRecord> PostgresDevfileDao<R> {
    fn table() -> &'static str {
        R::SCOPE.table()
    }
}

#[async_trait::async_trait]
impl<R: DevfileRecord> DevfileDao<R> for PostgresDevfileDao<R> {
    async fn create(&self, record: R) -> Result<R> {
        require_non_empty(record.id(), "Devfile id")?;
        let content = serde_json::to_value(record.devfile())?;
        let sql = format!(
            "INSERT INTO {} (id, owner_id, name, content) VALUES ($1, $2, $3, $4) \
             RETURNING id, owner_id, content",
            Self::table()
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&sql)
            .bind(record.id())
            .bind(record.owner())
            .bind(record.name())
            .bind(content)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| write_error(e, record.id(), record.name()))?;
        tx.commit()
            .await
            .map_err(|e| write_error(e, record.id(), record.name()))?;

        record_from_row(&row)
    }

    async fn update(&self, record: R) -> Result<R> {
        require_non_empty(record.id(), "Devfile id")?;
        let content = serde_json::to_value(record.devfile())?;
        let find_sql = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", Self::table());
        let update_sql = format!(
            "UPDATE {} SET name = $2, content = $3, updated_at = NOW() WHERE id = $1 \
             RETURNING id, owner_id, content",
            Self::table()
        );

        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query(&find_sql)
            .bind(record.id())
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Err(DevfileError::NotFound(format!(
                "Could not update devfile with id {} because it doesn't exist",
                record.id()
            )));
        }

        let row = sqlx::query(&update_sql)
            .bind(record.id())
            .bind(record.name())
            .bind(content)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| write_error(e, record.id(), record.name()))?;
        tx.commit().await?;

        record_from_row(&row)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        require_non_empty(id, "Devfile id")?;
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::table());

        sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<R> {
        require_non_empty(id, "Devfile id")?;
        let sql = format!(
            "SELECT id, owner_id, content FROM {} WHERE id = $1",
            Self::table()
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(DevfileError::not_found_by_id(id));
        };

        record_from_row(&row)
    }

    async fn get_devfiles(
        &self,
        owner_id: &str,
        max_items: usize,
        skip_count: usize,
    ) -> Result<Page<R>> {
        require_non_empty(owner_id, "Owner id")?;
        validate_page_request(max_items)?;
        let page_sql = format!(
            "SELECT id, owner_id, content FROM {} WHERE owner_id = $1 \
             ORDER BY seq LIMIT $2 OFFSET $3",
            Self::table()
        );
        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE owner_id = $1", Self::table());

        // Both queries must observe the same snapshot.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;
        let rows = sqlx::query(&page_sql)
            .bind(owner_id)
            .bind(to_i64(max_items))
            .bind(to_i64(skip_count))
            .fetch_all(&mut *tx)
            .await?;
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        let items = rows
            .iter()
            .map(record_from_row::<R>)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(
            items,
            skip_count,
            max_items,
            usize::try_from(total).unwrap_or_default(),
        ))
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresStore {
    async fn create_user(&self, user: User) -> Result<User> {
        require_non_empty(&user.id, "User id")?;
        sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(|e| match database_error_kind(&e) {
                Some(ErrorKind::UniqueViolation) => DevfileError::Conflict(format!(
                    "User with id '{}' already exists",
                    user.id
                )),
                _ => DevfileError::from(e),
            })?;

        Ok(user)
    }

    async fn ensure_user(&self, user: User) -> Result<()> {
        require_non_empty(&user.id, "User id")?;
        sqlx::query(
            "INSERT INTO users (id, name, email) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        require_non_empty(id, "User id")?;
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(DevfileError::NotFound(format!(
                "User with id '{}' doesn't exist",
                id
            )));
        };

        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        })
    }

    async fn remove_user(&self, id: &str) -> Result<()> {
        require_non_empty(id, "User id")?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match database_error_kind(&e) {
                Some(ErrorKind::ForeignKeyViolation) => {
                    DevfileError::Conflict(format!("User '{}' still owns devfiles", id))
                }
                _ => DevfileError::from(e),
            })?;

        Ok(())
    }
}

fn record_from_row<R: DevfileRecord>(row: &PgRow) -> Result<R> {
    let id: String = row.try_get("id")?;
    let owner: Option<String> = row.try_get("owner_id")?;
    let content: serde_json::Value = row.try_get("content")?;
    let devfile: Devfile = serde_json::from_value(content)?;

    Ok(R::from_parts(id, owner, devfile))
}

fn database_error_kind(err: &sqlx::Error) -> Option<ErrorKind> {
    match err {
        sqlx::Error::Database(db_err) => Some(db_err.kind()),
        _ => None,
    }
}

/// Translates constraint violations raised by inserts and updates.
fn write_error(err: sqlx::Error, id: &str, name: Option<&str>) -> DevfileError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.kind() {
            ErrorKind::UniqueViolation => {
                let on_primary_key = db_err
                    .constraint()
                    .map_or(false, |constraint| constraint.ends_with("_pkey"));
                if on_primary_key {
                    return DevfileError::Conflict(format!(
                        "Devfile with id '{}' already exists",
                        id
                    ));
                }
                return DevfileError::Conflict(format!(
                    "Devfile with name '{}' already exists for current user",
                    name.unwrap_or_default()
                ));
            }
            ErrorKind::ForeignKeyViolation => {
                return DevfileError::Conflict(
                    "Could not create devfile with creator that refers on non-existent user"
                        .to_string(),
                );
            }
            _ => {}
        }
    }
    DevfileError::from(err)
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
