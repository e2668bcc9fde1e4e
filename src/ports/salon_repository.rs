use crate::domain::foundation::{DomainError, SalonId};
use crate::domain::salon::Salon;
use async_trait::async_trait;

/// Repository port for salon accounts.
#[async_trait]
pub trait SalonRepository: Send + Sync {
    async fn save(&self, salon: &Salon) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &SalonId) -> Result<Option<Salon>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salon_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SalonRepository) {}
    }
}
