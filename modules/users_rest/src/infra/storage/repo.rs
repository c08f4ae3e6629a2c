use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;

use crate::domain::error::DomainError;
use crate::domain::model::User;

/// SQLite repository for the `users` table. Columns are TEXT throughout,
/// matching the wire formats: RFC 3339 for timestamps, `YYYY-MM-DD` for
/// birth dates, so lexicographic comparison works for the 7-day window.
#[derive(Clone)]
pub struct UsersRepository {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password: String,
    cpf: String,
    #[sqlx(rename = "birthDate")]
    birth_date: String,
    avatar: Option<String>,
    #[sqlx(rename = "createdAt")]
    created_at: String,
    #[sqlx(rename = "updatedAt")]
    updated_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, DomainError> {
        Ok(User {
            birth_date: parse_date(&self.birth_date)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            name: self.name,
            email: self.email,
            password: self.password,
            cpf: self.cpf,
            avatar: self.avatar,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, DomainError> {
    raw.parse()
        .map_err(|e| DomainError::database(format!("bad birthDate '{raw}': {e}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::database(format!("bad timestamp '{raw}': {e}")))
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::database(e.to_string())
}

impl UsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT,
                email TEXT UNIQUE,
                password TEXT,
                cpf TEXT,
                birthDate TEXT,
                avatar TEXT,
                createdAt TEXT,
                updatedAt TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// All users, name-descending (the listing order the API serves).
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY name DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(UserRow::into_user).transpose()
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(found.is_some())
    }

    pub async fn insert(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, cpf, birthDate, avatar, createdAt, updatedAt)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.cpf)
        .bind(user.birth_date.to_string())
        .bind(&user.avatar)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Overwrite every column of an existing row with the merged record.
    pub async fn update(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, password = ?, cpf = ?, birthDate = ?, avatar = ?, updatedAt = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.cpf)
        .bind(user.birth_date.to_string())
        .bind(&user.avatar)
        .bind(user.updated_at.to_rfc3339())
        .bind(&user.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Returns false when no row had the given id.
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    /// Birth dates of every user that has one, for the mean-age aggregate.
    pub async fn birth_dates(&self) -> Result<Vec<NaiveDate>, DomainError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT birthDate FROM users WHERE birthDate IS NOT NULL")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        rows.iter().map(|(raw,)| parse_date(raw)).collect()
    }

    /// Users created at or after the cutoff.
    pub async fn created_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE createdAt >= ?")
            .bind(cutoff.to_rfc3339())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(UserRow::into_user).collect()
    }
}
