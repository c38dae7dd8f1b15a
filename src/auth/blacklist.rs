use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::AuthError;

/// Shared store of revoked token ids. Logout must survive process restarts
/// and work across replicas, so the production implementation is external
/// (Redis); entries expire with the token itself.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Marks a token id as revoked for `ttl` (the token's remaining life).
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), AuthError>;

    /// Whether a token id has been revoked.
    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError>;
}

/// Redis-backed blacklist; one key per revoked token with a server-side TTL.
pub struct RedisTokenBlacklist {
    client: Arc<redis::Client>,
    namespace: String,
}

impl RedisTokenBlacklist {
    pub fn new(client: Arc<redis::Client>, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn key(&self, jti: &str) -> String {
        format!("{}:revoked:{}", self.namespace, jti)
    }
}

#[async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), AuthError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| AuthError::InternalError(format!("redis connection failed: {}", e)))?;

        // A zero TTL means the token is already expired; nothing to store.
        let secs = ttl.as_secs().max(1);
        redis::cmd("SET")
            .arg(self.key(jti))
            .arg("revoked")
            .arg("EX")
            .arg(secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AuthError::InternalError(format!("redis SET failed: {}", e)))
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| AuthError::InternalError(format!("redis connection failed: {}", e)))?;

        redis::cmd("EXISTS")
            .arg(self.key(jti))
            .query_async::<_, bool>(&mut conn)
            .await
            .map_err(|e| AuthError::InternalError(format!("redis EXISTS failed: {}", e)))
    }
}

/// In-process blacklist for tests and single-instance development runs.
#[derive(Default)]
pub struct InMemoryTokenBlacklist {
    entries: DashMap<String, Instant>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), AuthError> {
        self.entries
            .insert(jti.to_string(), Instant::now() + ttl);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        match self.entries.get(jti) {
            Some(expiry) if *expiry > Instant::now() => Ok(true),
            Some(_) => {
                drop(self.entries.remove(jti));
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
