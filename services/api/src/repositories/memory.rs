//! In-memory repositories for router tests
//!
//! Mirrors the constraints of the PostgreSQL schema: unique usernames and
//! emails, and slogans that must reference an existing user.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::RwLock;

use super::{HealthProbe, SloganRepository, UserRepository};
use crate::{
    error::{StoreError, StoreResult},
    models::{NewUser, Slogan, User},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    slogans: Vec<Slogan>,
}

/// Shared in-memory store implementing every repository trait
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// Remove a user and, like the foreign key, every slogan it owns
    pub async fn delete_user(&self, id: i32) {
        let mut tables = self.tables.write().await;
        tables.users.retain(|u| u.id != id);
        tables.slogans.retain(|s| s.user_id != id);
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, new_user: &NewUser) -> StoreResult<User> {
        self.check()?;
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(StoreError::DuplicateKey("users_username_key".to_string()));
        }
        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateKey("users_email_key".to_string()));
        }

        let user = User {
            id: tables.users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            pet_name: new_user.pet_name.clone(),
            pet_species: new_user.pet_species.clone(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_all_users(&self) -> StoreResult<Vec<User>> {
        self.check()?;
        Ok(self.tables.read().await.users.clone())
    }
}

#[async_trait]
impl SloganRepository for InMemoryStore {
    async fn create_slogan(&self, user_id: i32, text: &str) -> StoreResult<Slogan> {
        self.check()?;
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::ConstraintViolation(format!(
                "user {user_id} does not exist"
            )));
        }

        let slogan = Slogan {
            id: tables.slogans.iter().map(|s| s.id).max().unwrap_or(0) + 1,
            user_id,
            slogan: text.to_string(),
            created_at: Utc::now(),
        };
        tables.slogans.push(slogan.clone());
        Ok(slogan)
    }

    async fn list_slogans_by_user(&self, user_id: i32) -> StoreResult<Vec<Slogan>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .slogans
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all_slogans(&self) -> StoreResult<Vec<Slogan>> {
        self.check()?;
        Ok(self.tables.read().await.slogans.clone())
    }
}

#[async_trait]
impl HealthProbe for InMemoryStore {
    async fn ping(&self) -> DatabaseResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}
