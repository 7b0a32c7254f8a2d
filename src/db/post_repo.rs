use sqlx::SqlitePool;
use uuid::Uuid;

use super::user_repo::{parse_timestamp, parse_uuid};
use crate::models::Post;

/// Post documents. Likes and comments are embedded JSON lists written back
/// whole on every mutation.
pub struct PostRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: String,
    user_id: String,
    name: String,
    avatar: String,
    text: String,
    likes: String,
    comments: String,
    created_at: String,
}

impl PostRow {
    fn into_post(self) -> Result<Post, sqlx::Error> {
        Ok(Post {
            id: parse_uuid(&self.id)?,
            user: parse_uuid(&self.user_id)?,
            name: self.name,
            avatar: self.avatar,
            text: self.text,
            likes: serde_json::from_str(&self.likes).unwrap_or_default(),
            comments: serde_json::from_str(&self.comments).unwrap_or_default(),
            date: parse_timestamp(&self.created_at)?,
        })
    }
}

impl PostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, post: &Post) -> Result<(), sqlx::Error> {
        let likes = serde_json::to_string(&post.likes).unwrap_or_else(|_| "[]".to_string());
        let comments = serde_json::to_string(&post.comments).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, name, avatar, text, likes, comments, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.id.to_string())
        .bind(post.user.to_string())
        .bind(&post.name)
        .bind(&post.avatar)
        .bind(&post.text)
        .bind(&likes)
        .bind(&comments)
        .bind(post.date.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        let row: Option<PostRow> = sqlx::query_as("SELECT * FROM posts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(PostRow::into_post).transpose()
    }

    /// All posts, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, sqlx::Error> {
        let rows: Vec<PostRow> =
            sqlx::query_as("SELECT * FROM posts ORDER BY created_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(PostRow::into_post).collect()
    }

    /// Writes the mutable part of a post document back (likes and comments).
    pub async fn save(&self, post: &Post) -> Result<(), sqlx::Error> {
        let likes = serde_json::to_string(&post.likes).unwrap_or_else(|_| "[]".to_string());
        let comments = serde_json::to_string(&post.comments).unwrap_or_else(|_| "[]".to_string());

        sqlx::query("UPDATE posts SET likes = ?, comments = ? WHERE id = ?")
            .bind(&likes)
            .bind(&comments)
            .bind(post.id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Removes every post authored by a user. Part of account deletion.
    pub async fn delete_by_user(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::tempdir;

    async fn repo() -> (tempfile::TempDir, PostRepository) {
        let dir = tempdir().unwrap();
        let pool = init_db(&dir.path().join("test.db")).await.unwrap();
        (dir, PostRepository::new(pool))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_dir, repo) = repo().await;
        let post = Post::new(Uuid::new_v4(), "Ada", "http://a/img", "hello");
        repo.create(&post).await.unwrap();

        let loaded = repo.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(loaded.text, "hello");
        assert!(loaded.likes.is_empty());
        assert!(loaded.comments.is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_dir, repo) = repo().await;
        let author = Uuid::new_v4();
        let first = Post::new(author, "Ada", "a", "first");
        let second = Post::new(author, "Ada", "a", "second");
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let posts = repo.list().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text, "second");
        assert_eq!(posts[1].text, "first");
    }

    #[tokio::test]
    async fn test_save_persists_likes_and_comments() {
        let (_dir, repo) = repo().await;
        let liker = Uuid::new_v4();
        let mut post = Post::new(Uuid::new_v4(), "Ada", "a", "hello");
        repo.create(&post).await.unwrap();

        post.like(liker);
        post.add_comment(liker, "Eve", "http://e/img", "nice");
        repo.save(&post).await.unwrap();

        let loaded = repo.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(loaded.likes.len(), 1);
        assert_eq!(loaded.likes[0].user, liker);
        assert_eq!(loaded.comments.len(), 1);
        assert_eq!(loaded.comments[0].text, "nice");
    }

    #[tokio::test]
    async fn test_delete_by_user_leaves_other_authors() {
        let (_dir, repo) = repo().await;
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.create(&Post::new(author, "Ada", "a", "one")).await.unwrap();
        repo.create(&Post::new(author, "Ada", "a", "two")).await.unwrap();
        repo.create(&Post::new(other, "Eve", "e", "keep")).await.unwrap();

        let removed = repo.delete_by_user(author).await.unwrap();
        assert_eq!(removed, 2);

        let posts = repo.list().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text, "keep");
    }
}
