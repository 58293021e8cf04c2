//! Shared fixtures: an in-memory database seeded with nine users.

#![allow(dead_code)]

use dbkit_axum::{create_pool, DbSession, Model, Select};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn placeholder() -> Self {
        Self {
            id: -1,
            name: "n/a".into(),
            email: "n/a".into(),
        }
    }
}

impl Model for User {
    const TABLE: &'static str = "users";
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
}

impl Model for Product {
    const TABLE: &'static str = "products";
}

/// A user joined with their profile
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub bio: String,
}

impl Model for UserProfile {
    const TABLE: &'static str = "users";

    fn base_query() -> Select {
        Select::from_table("users")
            .columns(["users.id", "users.name", "profiles.bio"])
            .join("JOIN profiles ON profiles.user_id = users.id")
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL)",
    "CREATE TABLE profiles (
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users (id),
        bio TEXT NOT NULL
    )",
    "CREATE TABLE products (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
];

/// In-memory pool with the schema and users 1..=9 in place.
pub async fn setup_pool() -> SqlitePool {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let pool = create_pool("sqlite::memory:").await.expect("pool creation failed");
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(&pool).await.expect("schema failed");
    }

    for i in 1..=9_i64 {
        sqlx::query("INSERT INTO users (id, name, email) VALUES (?, ?, ?)")
            .bind(i)
            .bind(format!("user_{:02}", i))
            .bind(format!("{:02}@user", i))
            .execute(&pool)
            .await
            .expect("seed users failed");
        sqlx::query("INSERT INTO profiles (id, user_id, bio) VALUES (?, ?, ?)")
            .bind(i)
            .bind(i)
            .bind(format!("bio_{:02}", i))
            .execute(&pool)
            .await
            .expect("seed profiles failed");
    }

    pool
}

/// Seeded database plus a session holding its only connection.
pub async fn setup() -> (SqlitePool, DbSession) {
    let pool = setup_pool().await;
    let session = DbSession::acquire(&pool).await.expect("session failed");
    (pool, session)
}

pub fn ids<'a>(users: impl IntoIterator<Item = &'a User>) -> Vec<i64> {
    users.into_iter().map(|u| u.id).collect()
}
