use async_trait::async_trait;

use crate::domain::codes::CodeError;
use crate::domain::foundation::DealId;
use crate::domain::reporting::{CodeStats, CollaborationRow, RedemptionFilter, RedemptionRecord};

/// Read-only port for dashboard and back-office queries.
#[async_trait]
pub trait CodeReader: Send + Sync {
    /// Total and used code counts for one deal.
    async fn code_stats(&self, deal_id: &DealId) -> Result<CodeStats, ReaderError>;

    /// Consumed codes matching `filter`, most recent first.
    async fn list_redemptions(
        &self,
        filter: &RedemptionFilter,
    ) -> Result<Vec<RedemptionRecord>, ReaderError>;

    /// One row per active deal with view and redemption counters.
    async fn list_collaborations(&self) -> Result<Vec<CollaborationRow>, ReaderError>;
}

/// Errors that can occur during read queries
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("Deal not found: {0}")]
    DealNotFound(DealId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ReaderError {
    fn from(err: sqlx::Error) -> Self {
        ReaderError::Database(err.to_string())
    }
}

impl From<ReaderError> for CodeError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::DealNotFound(id) => CodeError::deal_not_found(id),
            ReaderError::Database(msg) => CodeError::infrastructure(msg),
        }
    }
}
