//! User repository.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::users;

/// Input for creating a user (seeder / admin tooling).
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Login name.
    pub username: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Display name.
    pub display_name: String,
    /// Approval authority: 0 none, 1..=4 ladder rung, 9 superuser.
    pub admin_level: i16,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, DbErr> {
        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username),
            password_hash: Set(input.password_hash),
            display_name: Set(input.display_name),
            admin_level: Set(input.admin_level),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        model.insert(&self.db).await
    }

    /// Finds a user by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }
}
