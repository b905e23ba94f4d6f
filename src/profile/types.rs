use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub category: String,
    pub dob: Date,
    pub bio: String,
    /// Storage-relative name of the current avatar file, or empty for none.
    pub avatar: String,
}

/// Fields needed to create a user; the id is generated by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub category: String,
    pub dob: Date,
    pub bio: String,
}

/// Mutable profile fields applied by the edit operation.
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub name: String,
    pub category: String,
    pub dob: Date,
    pub bio: String,
}
