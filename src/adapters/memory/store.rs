//! In-Memory Store Adapter
//!
//! Keeps salons, deals and code pools in process memory behind a single
//! lock. Every claim and compare-and-swap happens inside one write guard,
//! which gives the same at-most-once guarantee as the Postgres adapter.
//! Used for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::codes::{CodeStatus, CodeValue, DiscountCode, GenerationJob, GenerationStart};
use crate::domain::deal::Deal;
use crate::domain::foundation::{DealId, DomainError, ErrorCode, SalonId, Timestamp};
use crate::domain::redemption::{ContactRejection, CustomerInfo, EmailAddress, PhoneNumber};
use crate::domain::reporting::{CodeStats, CollaborationRow, RedemptionFilter, RedemptionRecord};
use crate::domain::salon::Salon;
use crate::ports::{
    ClaimOutcome, CodeReader, DealRepository, DiscountCodeRepository, MarkUsedOutcome,
    ReaderError, SalonRepository,
};

#[derive(Debug, Default)]
struct State {
    salons: HashMap<SalonId, Salon>,
    deals: HashMap<DealId, Deal>,
    // Insertion order doubles as "first unused" order.
    codes: Vec<DiscountCode>,
    generation_jobs: HashMap<DealId, GenerationJob>,
}

impl State {
    fn count_for_deal(&self, deal_id: &DealId) -> u64 {
        self.codes.iter().filter(|c| &c.deal_id == deal_id).count() as u64
    }

    fn contact_conflict(
        &self,
        deal_id: &DealId,
        email: &EmailAddress,
        phone: &PhoneNumber,
    ) -> Option<ContactRejection> {
        let customers = || {
            self.codes
                .iter()
                .filter(move |c| &c.deal_id == deal_id)
                .filter_map(DiscountCode::customer)
        };
        if customers().any(|c| &c.email == email) {
            return Some(ContactRejection::EmailAlreadyUsed);
        }
        if customers().any(|c| &c.phone == phone) {
            return Some(ContactRejection::PhoneAlreadyUsed);
        }
        None
    }
}

/// In-memory implementation of every persistence port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored codes across all deals.
    pub async fn code_count(&self) -> usize {
        self.state.read().await.codes.len()
    }

    /// All codes of a deal in insertion order.
    pub async fn codes_for_deal(&self, deal_id: &DealId) -> Vec<DiscountCode> {
        self.state
            .read()
            .await
            .codes
            .iter()
            .filter(|c| &c.deal_id == deal_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SalonRepository for InMemoryStore {
    async fn save(&self, salon: &Salon) -> Result<(), DomainError> {
        self.state
            .write()
            .await
            .salons
            .insert(salon.id, salon.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SalonId) -> Result<Option<Salon>, DomainError> {
        Ok(self.state.read().await.salons.get(id).cloned())
    }
}

#[async_trait]
impl DealRepository for InMemoryStore {
    async fn save(&self, deal: &Deal) -> Result<(), DomainError> {
        self.state.write().await.deals.insert(deal.id, deal.clone());
        Ok(())
    }

    async fn update(&self, deal: &Deal) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.deals.get_mut(&deal.id) {
            Some(existing) => {
                let views = existing.views;
                *existing = deal.clone();
                existing.views = views;
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::DealNotFound,
                format!("Deal not found: {}", deal.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DomainError> {
        Ok(self.state.read().await.deals.get(id).cloned())
    }

    async fn list_by_salon(&self, salon_id: &SalonId) -> Result<Vec<Deal>, DomainError> {
        let state = self.state.read().await;
        let mut deals: Vec<Deal> = state
            .deals
            .values()
            .filter(|d| &d.salon_id == salon_id)
            .cloned()
            .collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(deals)
    }

    async fn delete(&self, id: &DealId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.codes.iter().any(|c| &c.deal_id == id) {
            return Err(DomainError::new(
                ErrorCode::DealHasCodes,
                format!("Deal {} still has discount codes", id),
            ));
        }
        state.generation_jobs.remove(id);
        state.deals.remove(id).map(|_| ()).ok_or_else(|| {
            DomainError::new(ErrorCode::DealNotFound, format!("Deal not found: {}", id))
        })
    }

    async fn record_view(&self, id: &DealId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        Ok(match state.deals.get_mut(id) {
            Some(deal) => {
                deal.views += 1;
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl DiscountCodeRepository for InMemoryStore {
    async fn count_for_deal(&self, deal_id: &DealId) -> Result<u64, DomainError> {
        Ok(self.state.read().await.count_for_deal(deal_id))
    }

    async fn start_generation(
        &self,
        deal_id: &DealId,
        requested: u32,
        now: Timestamp,
        lease_until: Timestamp,
    ) -> Result<GenerationStart, DomainError> {
        let mut state = self.state.write().await;
        let existing = state.count_for_deal(deal_id);
        if let Some(job) = state.generation_jobs.get_mut(deal_id) {
            return Ok(job.try_resume(existing, now, lease_until));
        }
        if existing > 0 {
            return Ok(GenerationStart::Filled { existing });
        }
        state
            .generation_jobs
            .insert(*deal_id, GenerationJob::open(*deal_id, requested, lease_until));
        Ok(GenerationStart::Fresh)
    }

    async fn finish_generation(
        &self,
        deal_id: &DealId,
        completed_at: Option<Timestamp>,
    ) -> Result<(), DomainError> {
        if let Some(job) = self.state.write().await.generation_jobs.get_mut(deal_id) {
            job.release(completed_at);
        }
        Ok(())
    }

    async fn insert_batch(&self, codes: &[DiscountCode]) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        for code in codes {
            if state.codes.iter().any(|c| c.code == code.code) {
                return Err(DomainError::new(
                    ErrorCode::DuplicateCode,
                    format!("Code {} already exists", code.code),
                ));
            }
        }
        state.codes.extend_from_slice(codes);
        Ok(())
    }

    async fn find_unused(&self, deal_id: &DealId) -> Result<Option<DiscountCode>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .codes
            .iter()
            .find(|c| &c.deal_id == deal_id && !c.is_used())
            .cloned())
    }

    async fn find_by_code(&self, code: &CodeValue) -> Result<Option<DiscountCode>, DomainError> {
        let state = self.state.read().await;
        Ok(state.codes.iter().find(|c| &c.code == code).cloned())
    }

    async fn mark_used(
        &self,
        code: &CodeValue,
        customer: &CustomerInfo,
        used_at: Timestamp,
    ) -> Result<MarkUsedOutcome, DomainError> {
        let mut state = self.state.write().await;
        let Some(index) = state.codes.iter().position(|c| &c.code == code) else {
            return Ok(MarkUsedOutcome::NotFound);
        };
        if state.codes[index].is_used() {
            return Ok(MarkUsedOutcome::AlreadyUsed);
        }
        let deal_id = state.codes[index].deal_id;
        if let Some(reason) = state.contact_conflict(&deal_id, &customer.email, &customer.phone) {
            return Ok(MarkUsedOutcome::ContactTaken(reason));
        }
        let entry = &mut state.codes[index];
        entry.status = CodeStatus::Used {
            used_at,
            customer: customer.clone(),
        };
        Ok(MarkUsedOutcome::Marked(entry.clone()))
    }

    async fn claim(
        &self,
        deal_id: &DealId,
        customer: &CustomerInfo,
        used_at: Timestamp,
    ) -> Result<ClaimOutcome, DomainError> {
        let mut state = self.state.write().await;
        if let Some(reason) = state.contact_conflict(deal_id, &customer.email, &customer.phone) {
            return Ok(ClaimOutcome::ContactTaken(reason));
        }
        let Some(entry) = state
            .codes
            .iter_mut()
            .find(|c| &c.deal_id == deal_id && !c.is_used())
        else {
            return Ok(ClaimOutcome::Exhausted);
        };
        entry.status = CodeStatus::Used {
            used_at,
            customer: customer.clone(),
        };
        Ok(ClaimOutcome::Claimed(entry.clone()))
    }

    async fn find_contact_conflict(
        &self,
        deal_id: &DealId,
        email: &EmailAddress,
        phone: &PhoneNumber,
    ) -> Result<Option<ContactRejection>, DomainError> {
        Ok(self.state.read().await.contact_conflict(deal_id, email, phone))
    }
}

#[async_trait]
impl CodeReader for InMemoryStore {
    async fn code_stats(&self, deal_id: &DealId) -> Result<CodeStats, ReaderError> {
        let state = self.state.read().await;
        if !state.deals.contains_key(deal_id) {
            return Err(ReaderError::DealNotFound(*deal_id));
        }
        let codes = state.codes.iter().filter(|c| &c.deal_id == deal_id);
        let (total, used) = codes.fold((0, 0), |(total, used), c| {
            (total + 1, used + u64::from(c.is_used()))
        });
        Ok(CodeStats::new(*deal_id, total, used))
    }

    async fn list_redemptions(
        &self,
        filter: &RedemptionFilter,
    ) -> Result<Vec<RedemptionRecord>, ReaderError> {
        let state = self.state.read().await;
        let mut records: Vec<RedemptionRecord> = state
            .codes
            .iter()
            .filter_map(|code| {
                let CodeStatus::Used { used_at, customer } = &code.status else {
                    return None;
                };
                let deal = state.deals.get(&code.deal_id)?;
                Some(RedemptionRecord {
                    code: code.code.to_string(),
                    deal_id: deal.id,
                    deal_title: deal.title.clone(),
                    salon_id: deal.salon_id,
                    customer_name: customer.name.clone(),
                    customer_email: customer.email.to_string(),
                    customer_phone: customer.phone.to_string(),
                    subscribed_to_newsletter: customer.subscribed_to_newsletter,
                    used_at: *used_at,
                })
            })
            .filter(|record| filter.matches(record))
            .collect();
        records.sort_by(|a, b| b.used_at.cmp(&a.used_at));
        Ok(records)
    }

    async fn list_collaborations(&self) -> Result<Vec<CollaborationRow>, ReaderError> {
        let state = self.state.read().await;
        let mut rows: Vec<CollaborationRow> = state
            .deals
            .values()
            .filter(|d| d.is_active)
            .map(|deal| CollaborationRow {
                deal_id: deal.id,
                code: deal.title.clone(),
                created_at: deal.created_at,
                views: deal.views,
                redemptions: state
                    .codes
                    .iter()
                    .filter(|c| c.deal_id == deal.id && c.is_used())
                    .count() as u64,
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
