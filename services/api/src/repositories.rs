//! Repositories for database operations
//!
//! Handlers only see the traits defined here; the PostgreSQL
//! implementations live in the submodules.

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;

use crate::{
    error::StoreResult,
    models::{NewUser, Slogan, User},
};

#[cfg(test)]
pub mod memory;
pub mod slogan;
pub mod user;

pub use slogan::PgSloganRepository;
pub use user::PgUserRepository;

/// Repository for user operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; fails with `DuplicateKey` if the username or email is taken
    async fn create_user(&self, new_user: &NewUser) -> StoreResult<User>;

    /// Find a user by username
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Find a user by id
    async fn find_user_by_id(&self, id: i32) -> StoreResult<Option<User>>;

    /// All users
    async fn list_all_users(&self) -> StoreResult<Vec<User>>;
}

/// Repository for slogan operations
#[async_trait]
pub trait SloganRepository: Send + Sync {
    /// Create a slogan owned by `user_id`
    ///
    /// The owner is not looked up first; a dangling id is rejected by the
    /// foreign key and surfaces as `ConstraintViolation`.
    async fn create_slogan(&self, user_id: i32, text: &str) -> StoreResult<Slogan>;

    /// Slogans of one user, oldest first
    async fn list_slogans_by_user(&self, user_id: i32) -> StoreResult<Vec<Slogan>>;

    /// Every slogan, in no guaranteed order
    async fn list_all_slogans(&self) -> StoreResult<Vec<Slogan>>;
}

/// Database liveness probe
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> DatabaseResult<()>;
}

/// [`HealthProbe`] backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgHealthProbe {
    pool: PgPool,
}

impl PgHealthProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    async fn ping(&self) -> DatabaseResult<()> {
        common::database::health_check(&self.pool).await?;
        Ok(())
    }
}
