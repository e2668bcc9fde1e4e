//! Shared fixtures for handler tests.

use std::sync::Arc;

use crate::adapters::memory::InMemoryStore;
use crate::domain::codes::{CodeValue, DiscountCode};
use crate::domain::deal::test_support::approved_deal;
use crate::domain::deal::Deal;
use crate::domain::foundation::{DealId, SalonId, Timestamp};
use crate::domain::salon::Salon;
use crate::ports::{DealRepository, DiscountCodeRepository, SalonRepository};

pub(crate) struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub owner: Salon,
    pub other: Salon,
    pub admin: Salon,
    pub deal: Deal,
}

/// A store with an owner, an unrelated salon, an admin and one approved deal.
pub(crate) async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let owner = Salon::new_partner(SalonId::new(), "Klippet", "hej@klippet.se");
    let other = Salon::new_partner(SalonId::new(), "Annan", "hej@annan.se");
    let admin = Salon::new_admin(SalonId::new(), "Admin", "admin@example.se");
    for salon in [&owner, &other, &admin] {
        SalonRepository::save(store.as_ref(), salon).await.unwrap();
    }
    let deal = approved_deal(owner.id);
    DealRepository::save(store.as_ref(), &deal).await.unwrap();
    Fixture {
        store,
        owner,
        other,
        admin,
        deal,
    }
}

pub(crate) async fn seed_codes(store: &InMemoryStore, deal_id: DealId, codes: &[&str]) {
    let batch: Vec<DiscountCode> = codes
        .iter()
        .map(|c| DiscountCode::new(deal_id, CodeValue::try_new(c).unwrap(), Timestamp::now()))
        .collect();
    store.insert_batch(&batch).await.unwrap();
}
