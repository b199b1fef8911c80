//! Database-backed session store.
//!
//! Session state lives in the `sessions` table with an explicit TTL, so
//! the service survives restarts and can run multiple instances; no
//! process-local session map exists anywhere. Tokens are stored hashed.

use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::{sessions, users};

/// Raw token length in bytes before base64url encoding.
const TOKEN_BYTES: usize = 32;

fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// A freshly issued session: the raw token goes to the client once and
/// is never stored.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The bearer token to hand to the client.
    pub token: String,
    /// The stored session row.
    pub session: sessions::Model,
}

/// Session repository.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a session for a user with the given TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, user_id: Uuid, ttl_secs: u64) -> Result<IssuedSession, DbErr> {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = base64_url::encode(&bytes);

        let now = Utc::now();
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        let model = sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(hash_token(&token)),
            expires_at: Set((now + Duration::seconds(ttl)).into()),
            revoked_at: Set(None),
            created_at: Set(now.into()),
        };
        let session = model.insert(&self.db).await?;

        Ok(IssuedSession { token, session })
    }

    /// Resolves a bearer token to its user. Returns `None` for unknown,
    /// expired, revoked, or deactivated-user sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn resolve(&self, token: &str) -> Result<Option<users::Model>, DbErr> {
        let now = Utc::now();

        let Some(session) = sessions::Entity::find()
            .filter(sessions::Column::TokenHash.eq(hash_token(token)))
            .filter(sessions::Column::RevokedAt.is_null())
            .filter(sessions::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let user = users::Entity::find_by_id(session.user_id)
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        Ok(user)
    }

    /// Revokes a session by token. Returns whether a live session was
    /// revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn revoke(&self, token: &str) -> Result<bool, DbErr> {
        let result = sessions::Entity::update_many()
            .col_expr(
                sessions::Column::RevokedAt,
                Expr::value(Some(chrono::DateTime::<chrono::FixedOffset>::from(
                    Utc::now(),
                ))),
            )
            .filter(sessions::Column::TokenHash.eq(hash_token(token)))
            .filter(sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes expired sessions. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn purge_expired(&self) -> Result<u64, DbErr> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lt(Utc::now()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
