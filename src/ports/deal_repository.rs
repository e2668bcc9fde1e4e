//! Deal repository port.
//!
//! Persists `Deal` aggregates. Deletion is refused by the store while any
//! discount code still references the deal.

use crate::domain::deal::Deal;
use crate::domain::foundation::{DealId, DomainError, SalonId};
use async_trait::async_trait;

/// Repository port for Deal persistence.
#[async_trait]
pub trait DealRepository: Send + Sync {
    /// Save a new deal.
    async fn save(&self, deal: &Deal) -> Result<(), DomainError>;

    /// Update an existing deal.
    ///
    /// # Errors
    ///
    /// - `DealNotFound` if the deal doesn't exist
    async fn update(&self, deal: &Deal) -> Result<(), DomainError>;

    /// Find a deal by its ID.
    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DomainError>;

    /// All deals owned by a salon, newest first.
    async fn list_by_salon(&self, salon_id: &SalonId) -> Result<Vec<Deal>, DomainError>;

    /// Delete a deal.
    ///
    /// # Errors
    ///
    /// - `DealNotFound` if the deal doesn't exist
    /// - `DealHasCodes` if discount codes still reference it
    async fn delete(&self, id: &DealId) -> Result<(), DomainError>;

    /// Increment the view counter. Returns false if the deal doesn't exist.
    async fn record_view(&self, id: &DealId) -> Result<bool, DomainError>;
}
