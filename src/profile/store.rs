use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::types::{NewUser, ProfileChanges, User};

/// Narrow CRUD contract the core needs from durable user storage.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> anyhow::Result<()>;
    async fn update_avatar(&self, id: Uuid, avatar: &str) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, category, dob, bio, avatar
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, category, dob, bio, avatar
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, name, category, dob, bio, avatar)
            VALUES ($1, $2, $3, $4, $5, $6, $7, '')
            RETURNING id, email, password_hash, name, category, dob, bio, avatar
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.category)
        .bind(user.dob)
        .bind(&user.bio)
        .fetch_one(&self.db)
        .await
        .context("create user")?;
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET name = $1, category = $2, dob = $3, bio = $4 WHERE id = $5")
            .bind(&changes.name)
            .bind(&changes.category)
            .bind(changes.dob)
            .bind(&changes.bio)
            .bind(id)
            .execute(&self.db)
            .await
            .context("update profile")?;
        Ok(())
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET avatar = $1 WHERE id = $2")
            .bind(avatar)
            .bind(id)
            .execute(&self.db)
            .await
            .context("update avatar")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(())
    }
}
