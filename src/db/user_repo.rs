use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::User;

/// Accounts and their auth tokens.
pub struct UserRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    avatar: String,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, sqlx::Error> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            avatar: self.avatar,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, avatar, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    pub async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Persists an opaque auth token for a user.
    pub async fn store_token(&self, token: &str, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id.to_string())
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Resolves a Bearer token to the user id it was issued for.
    pub async fn user_id_for_token(&self, token: &str) -> Result<Option<Uuid>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM auth_tokens WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id,)| parse_uuid(&id)).transpose()
    }

    pub async fn revoke_tokens(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM auth_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::tempdir;

    async fn repo() -> (tempfile::TempDir, UserRepository) {
        let dir = tempdir().unwrap();
        let pool = init_db(&dir.path().join("test.db")).await.unwrap();
        (dir, UserRepository::new(pool))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_dir, repo) = repo().await;
        let user = User::new("Ada", "ada@example.com", "hash", "http://a/img");

        repo.create(&user).await.unwrap();

        let loaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Ada");
        assert_eq!(loaded.email, "ada@example.com");
        assert_eq!(loaded.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let (_dir, repo) = repo().await;
        let user = User::new("Ada", "Ada@Example.com", "hash", "http://a/img");
        repo.create(&user).await.unwrap();

        let loaded = repo.get_by_email("ada@example.com").await.unwrap();
        assert!(loaded.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (_dir, repo) = repo().await;
        repo.create(&User::new("Ada", "ada@example.com", "h", "a"))
            .await
            .unwrap();

        let result = repo
            .create(&User::new("Eve", "ada@example.com", "h", "a"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let (_dir, repo) = repo().await;
        let user = User::new("Ada", "ada@example.com", "h", "a");
        repo.create(&user).await.unwrap();

        repo.store_token("tok-1", user.id).await.unwrap();
        assert_eq!(
            repo.user_id_for_token("tok-1").await.unwrap(),
            Some(user.id)
        );
        assert_eq!(repo.user_id_for_token("other").await.unwrap(), None);

        repo.revoke_tokens(user.id).await.unwrap();
        assert_eq!(repo.user_id_for_token("tok-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_cascades_tokens() {
        let (_dir, repo) = repo().await;
        let user = User::new("Ada", "ada@example.com", "h", "a");
        repo.create(&user).await.unwrap();
        repo.store_token("tok-1", user.id).await.unwrap();

        repo.delete(user.id).await.unwrap();

        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
        assert_eq!(repo.user_id_for_token("tok-1").await.unwrap(), None);
    }
}
