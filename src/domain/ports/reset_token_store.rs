//! Reset Token Store Port
//!
//! Defines the interface for persisting password reset tokens.
//! Tokens must outlive the process and be visible to every instance,
//! so implementations are backed by external storage.

use crate::domain::entities::ResetToken;
use async_trait::async_trait;
use std::time::Duration;

/// Errors raised by token storage backends.
#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("token storage failed: {0}")]
    Storage(String),
    #[error("email must not be empty")]
    EmptyEmail,
}

/// Expiring, single-use key-value store for password reset tokens.
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    /// Issue a fresh token for `email`, valid for `ttl`.
    async fn issue(&self, email: &str, ttl: Duration) -> Result<ResetToken, TokenStoreError>;

    /// Redeem a token, returning the email it was issued for.
    ///
    /// A token can be consumed once. Expired or unknown tokens yield `None`.
    async fn consume(&self, token: &str) -> Result<Option<String>, TokenStoreError>;

    /// Remove all expired tokens, returning how many were deleted.
    async fn purge_expired(&self) -> Result<usize, TokenStoreError>;
}
