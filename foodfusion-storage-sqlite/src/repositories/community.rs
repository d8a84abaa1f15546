//! SQLite implementation of the community repository.
//!
//! Like and comment counts are computed per row with subqueries rather than
//! kept as counters on the post.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodfusion_core::{
    Author, Comment, Error, LikeOutcome, Post, UserId,
    error::StorageError,
    repositories::{CommunityRepository, PostFields},
};
use sqlx::SqlitePool;

use super::timestamp;

pub struct SqliteCommunityRepository {
    pool: SqlitePool,
}

impl SqliteCommunityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const POST_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.title, p.photo_url, p.caption, p.created_at, p.updated_at,
           u.first_name AS author_first_name, u.last_name AS author_last_name,
           (SELECT COUNT(*) FROM community_likes l WHERE l.post_id = p.id) AS like_count,
           (SELECT COUNT(*) FROM community_comments c WHERE c.post_id = p.id) AS comment_count
    FROM community_posts p
    LEFT JOIN users u ON u.id = p.user_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.user_id, c.comment, c.created_at,
           u.first_name AS author_first_name, u.last_name AS author_last_name
    FROM community_comments c
    LEFT JOIN users u ON u.id = c.user_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct SqlitePost {
    id: i64,
    user_id: i64,
    title: String,
    photo_url: Option<String>,
    caption: Option<String>,
    created_at: i64,
    updated_at: i64,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
    like_count: i64,
    comment_count: i64,
}

impl TryFrom<SqlitePost> for Post {
    type Error = Error;

    fn try_from(row: SqlitePost) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.id,
            user_id: UserId::new(row.user_id),
            title: row.title,
            photo_url: row.photo_url,
            caption: row.caption,
            author: Author::from_parts(row.author_first_name, row.author_last_name),
            like_count: row.like_count.unsigned_abs(),
            comment_count: row.comment_count.unsigned_abs(),
            created_at: timestamp(row.created_at)?,
            updated_at: timestamp(row.updated_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteComment {
    id: i64,
    post_id: i64,
    user_id: i64,
    comment: String,
    created_at: i64,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
}

impl TryFrom<SqliteComment> for Comment {
    type Error = Error;

    fn try_from(row: SqliteComment) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: row.id,
            post_id: row.post_id,
            user_id: UserId::new(row.user_id),
            comment: row.comment,
            author: Author::from_parts(row.author_first_name, row.author_last_name),
            created_at: timestamp(row.created_at)?,
        })
    }
}

fn database_error(action: &str, e: sqlx::Error) -> Error {
    tracing::error!(error = %e, "Failed to {action}");
    StorageError::Database(format!("Failed to {action}")).into()
}

fn missing_after_write(what: &str) -> Error {
    StorageError::Database(format!("Created {what} could not be read back")).into()
}

impl SqliteCommunityRepository {
    async fn fetch_comment(&self, id: i64) -> Result<Option<Comment>, Error> {
        let row = sqlx::query_as::<_, SqliteComment>(&format!("{COMMENT_SELECT} WHERE c.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("load comment", e))?;

        row.map(Comment::try_from).transpose()
    }
}

#[async_trait]
impl CommunityRepository for SqliteCommunityRepository {
    async fn create_post(
        &self,
        user_id: UserId,
        fields: PostFields,
        at: DateTime<Utc>,
    ) -> Result<Post, Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO community_posts (user_id, title, photo_url, caption, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id
            "#,
        )
        .bind(user_id.as_i64())
        .bind(&fields.title)
        .bind(&fields.photo_url)
        .bind(&fields.caption)
        .bind(at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create post", e))?;

        self.find_post(id)
            .await?
            .ok_or_else(|| missing_after_write("post"))
    }

    async fn list_posts(&self, author_email: Option<&str>, limit: u32) -> Result<Vec<Post>, Error> {
        let rows = sqlx::query_as::<_, SqlitePost>(&format!(
            r#"
            {POST_SELECT}
            WHERE ?1 IS NULL OR u.email = ?1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?2
            "#
        ))
        .bind(author_email)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list posts", e))?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, Error> {
        let row = sqlx::query_as::<_, SqlitePost>(&format!("{POST_SELECT} WHERE p.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("load post", e))?;

        row.map(Post::try_from).transpose()
    }

    async fn update_post(
        &self,
        id: i64,
        user_id: UserId,
        fields: PostFields,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>, Error> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE community_posts
            SET title = ?1, photo_url = ?2, caption = ?3, updated_at = ?4
            WHERE id = ?5 AND user_id = ?6
            RETURNING id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.photo_url)
        .bind(&fields.caption)
        .bind(at.timestamp())
        .bind(id)
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("update post", e))?;

        match updated {
            Some(id) => self.find_post(id).await,
            None => Ok(None),
        }
    }

    async fn list_posts_by_user(&self, user_id: UserId) -> Result<Vec<Post>, Error> {
        let rows = sqlx::query_as::<_, SqlitePost>(&format!(
            "{POST_SELECT} WHERE p.user_id = ?1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list posts", e))?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn count_posts_by_user(&self, user_id: UserId) -> Result<u64, Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM community_posts WHERE user_id = ?1")
                .bind(user_id.as_i64())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| database_error("count posts", e))?;

        Ok(count.unsigned_abs())
    }

    async fn add_comment(
        &self,
        post_id: i64,
        user_id: UserId,
        comment: &str,
        at: DateTime<Utc>,
    ) -> Result<Comment, Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO community_comments (post_id, user_id, comment, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(user_id.as_i64())
        .bind(comment)
        .bind(at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("add comment", e))?;

        self.fetch_comment(id)
            .await?
            .ok_or_else(|| missing_after_write("comment"))
    }

    async fn recent_comments(&self, post_id: i64, limit: u32) -> Result<Vec<Comment>, Error> {
        let rows = sqlx::query_as::<_, SqliteComment>(&format!(
            r#"
            {COMMENT_SELECT}
            WHERE c.post_id = ?1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT ?2
            "#
        ))
        .bind(post_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list comments", e))?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    async fn liked_by(&self, post_id: i64, limit: u32) -> Result<Vec<Author>, Error> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT u.first_name, u.last_name
            FROM community_likes l
            JOIN users u ON u.id = l.user_id
            WHERE l.post_id = ?1
            ORDER BY l.created_at, l.id
            LIMIT ?2
            "#,
        )
        .bind(post_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list likes", e))?;

        Ok(rows
            .into_iter()
            .map(|(first_name, last_name)| Author {
                first_name,
                last_name,
            })
            .collect())
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<LikeOutcome, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("toggle like", e))?;

        let removed = sqlx::query("DELETE FROM community_likes WHERE post_id = ?1 AND user_id = ?2")
            .bind(post_id)
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("toggle like", e))?;

        let outcome = if removed.rows_affected() > 0 {
            LikeOutcome::Unliked
        } else {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO community_likes (post_id, user_id, created_at)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(post_id)
            .bind(user_id.as_i64())
            .bind(at.timestamp())
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("toggle like", e))?;
            LikeOutcome::Liked
        };

        tx.commit()
            .await
            .map_err(|e| database_error("toggle like", e))?;

        Ok(outcome)
    }
}
