//! GenerateCodesHandler - Command handler for filling a deal's code pool.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::codes::{
    CodeError, DiscountCode, GenerationOutcome, GenerationPlan, GenerationStart,
    GENERATION_LEASE_SECS, MAX_QUANTITY,
};
use crate::domain::foundation::{DealId, DomainError, Timestamp};
use crate::domain::salon::Salon;
use crate::ports::{DealRepository, DiscountCodeRepository};

/// Batch sizing for code inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub max_quantity: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            batch_delay: Duration::from_millis(300),
            max_quantity: MAX_QUANTITY,
        }
    }
}

/// Command to generate codes for a deal.
#[derive(Debug, Clone)]
pub struct GenerateCodesCommand {
    pub deal_id: DealId,
    pub quantity: u32,
    pub actor: Salon,
}

/// Handler for code generation.
///
/// A deal's pool is filled once. The run takes the deal's generation job
/// before inserting anything; a concurrent request gets
/// `GenerationInProgress`. Batches are inserted one at a time with a pause in
/// between. A failing batch stops the run, earlier batches stay stored and
/// the job stays open, so the next request tops the pool up to the quantity
/// of the first one.
pub struct GenerateCodesHandler {
    deals: Arc<dyn DealRepository>,
    codes: Arc<dyn DiscountCodeRepository>,
    settings: GenerationSettings,
}

impl GenerateCodesHandler {
    pub fn new(
        deals: Arc<dyn DealRepository>,
        codes: Arc<dyn DiscountCodeRepository>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            deals,
            codes,
            settings,
        }
    }

    pub async fn handle(&self, cmd: GenerateCodesCommand) -> Result<GenerationOutcome, CodeError> {
        // 1. Validate quantity
        let plan = GenerationPlan::new(
            cmd.quantity,
            self.settings.max_quantity,
            self.settings.batch_size,
        )?;

        // 2. Load deal and authorize
        let deal = self
            .deals
            .find_by_id(&cmd.deal_id)
            .await?
            .ok_or(CodeError::deal_not_found(cmd.deal_id))?;
        if !cmd.actor.can_manage(&deal.salon_id) {
            return Err(CodeError::forbidden(cmd.actor.id, deal.id));
        }

        // 3. Take the generation job
        let now = Timestamp::now();
        let start = self
            .codes
            .start_generation(
                &deal.id,
                plan.quantity(),
                now,
                now.plus_secs(GENERATION_LEASE_SECS),
            )
            .await?;
        let (target, existing) = match start {
            GenerationStart::Fresh => (plan.quantity(), 0),
            GenerationStart::Resume {
                requested,
                existing,
            } => {
                tracing::info!(deal_id = %deal.id, requested, existing, "Resuming unfinished code generation");
                (requested, u32::try_from(existing).unwrap_or(u32::MAX))
            }
            GenerationStart::Busy => return Err(CodeError::generation_in_progress(deal.id)),
            GenerationStart::Filled { existing } => {
                tracing::info!(deal_id = %deal.id, existing, "Deal already has codes, skipping generation");
                return Ok(GenerationOutcome::skipped(plan.quantity()));
            }
        };

        // 4. Insert what is missing
        let missing = target.saturating_sub(existing);
        if missing == 0 {
            self.release(&deal.id, Some(now)).await;
            return Ok(GenerationOutcome::topped_up(target, 0));
        }
        let fill = GenerationPlan::new(missing, target, self.settings.batch_size)?;

        match self.insert_batches(&deal.id, fill, now).await {
            Ok(()) => {
                self.release(&deal.id, Some(Timestamp::now())).await;
                tracing::info!(deal_id = %deal.id, generated = missing, target, "Discount codes generated");
                Ok(if existing == 0 {
                    GenerationOutcome::completed(target)
                } else {
                    GenerationOutcome::topped_up(target, missing)
                })
            }
            Err((inserted, err)) => {
                self.release(&deal.id, None).await;
                let stored = existing + inserted;
                if stored == 0 {
                    return Err(CodeError::from(err));
                }
                Err(CodeError::partial_generation(stored, target))
            }
        }
    }

    /// Inserts the planned batches in order. On failure, returns how many
    /// codes this run stored before the error.
    async fn insert_batches(
        &self,
        deal_id: &DealId,
        plan: GenerationPlan,
        now: Timestamp,
    ) -> Result<(), (u32, DomainError)> {
        let batches = plan.draw_batches(&mut rand::thread_rng());
        let batch_count = batches.len();
        let mut inserted: u32 = 0;

        for (index, batch) in batches.into_iter().enumerate() {
            if index > 0 && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }

            let rows: Vec<DiscountCode> = batch
                .into_iter()
                .map(|code| DiscountCode::new(*deal_id, code, now))
                .collect();

            if let Err(err) = self.codes.insert_batch(&rows).await {
                tracing::error!(
                    deal_id = %deal_id,
                    batch = index + 1,
                    batch_count,
                    inserted,
                    error = %err,
                    "Code batch insert failed"
                );
                return Err((inserted, err));
            }

            inserted += rows.len() as u32;
            tracing::debug!(deal_id = %deal_id, batch = index + 1, inserted, "Code batch inserted");
        }

        Ok(())
    }

    async fn release(&self, deal_id: &DealId, completed_at: Option<Timestamp>) {
        if let Err(err) = self.codes.finish_generation(deal_id, completed_at).await {
            tracing::warn!(deal_id = %deal_id, error = %err, "Failed to release generation job");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::test_support::{fixture, seed_codes};
    use crate::domain::codes::{CodeValue, CODE_ALPHABET, CODE_LENGTH};
    use crate::domain::redemption::{ContactRejection, CustomerInfo, EmailAddress, PhoneNumber};
    use crate::ports::{ClaimOutcome, MarkUsedOutcome};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn fast_settings(batch_size: usize) -> GenerationSettings {
        GenerationSettings {
            batch_size,
            batch_delay: Duration::ZERO,
            max_quantity: MAX_QUANTITY,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Stores through an in-memory store, but fails every insert after a
    /// fixed number of batches.
    struct FlakyCodeRepository {
        inner: Arc<InMemoryStore>,
        batches_before_failure: usize,
        calls: Mutex<usize>,
    }

    impl FlakyCodeRepository {
        fn new(inner: Arc<InMemoryStore>, batches_before_failure: usize) -> Self {
            Self {
                inner,
                batches_before_failure,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl DiscountCodeRepository for FlakyCodeRepository {
        async fn count_for_deal(&self, deal_id: &DealId) -> Result<u64, DomainError> {
            self.inner.count_for_deal(deal_id).await
        }

        async fn start_generation(
            &self,
            deal_id: &DealId,
            requested: u32,
            now: Timestamp,
            lease_until: Timestamp,
        ) -> Result<GenerationStart, DomainError> {
            self.inner
                .start_generation(deal_id, requested, now, lease_until)
                .await
        }

        async fn finish_generation(
            &self,
            deal_id: &DealId,
            completed_at: Option<Timestamp>,
        ) -> Result<(), DomainError> {
            self.inner.finish_generation(deal_id, completed_at).await
        }

        async fn insert_batch(&self, codes: &[DiscountCode]) -> Result<(), DomainError> {
            {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                if *calls > self.batches_before_failure {
                    return Err(DomainError::database("connection reset"));
                }
            }
            self.inner.insert_batch(codes).await
        }

        async fn find_unused(&self, deal_id: &DealId) -> Result<Option<DiscountCode>, DomainError> {
            self.inner.find_unused(deal_id).await
        }

        async fn find_by_code(&self, code: &CodeValue) -> Result<Option<DiscountCode>, DomainError> {
            self.inner.find_by_code(code).await
        }

        async fn mark_used(
            &self,
            _code: &CodeValue,
            _customer: &CustomerInfo,
            _used_at: Timestamp,
        ) -> Result<MarkUsedOutcome, DomainError> {
            Ok(MarkUsedOutcome::NotFound)
        }

        async fn claim(
            &self,
            _deal_id: &DealId,
            _customer: &CustomerInfo,
            _used_at: Timestamp,
        ) -> Result<ClaimOutcome, DomainError> {
            Ok(ClaimOutcome::Exhausted)
        }

        async fn find_contact_conflict(
            &self,
            _deal_id: &DealId,
            _email: &EmailAddress,
            _phone: &PhoneNumber,
        ) -> Result<Option<ContactRejection>, DomainError> {
            Ok(None)
        }
    }

    fn command(deal_id: DealId, quantity: u32, actor: &Salon) -> GenerateCodesCommand {
        GenerateCodesCommand {
            deal_id,
            quantity,
            actor: actor.clone(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn generates_requested_number_of_valid_codes() {
        let f = fixture().await;
        let handler = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(2));

        let outcome = handler.handle(command(f.deal.id, 5, &f.owner)).await.unwrap();

        assert_eq!(outcome, GenerationOutcome::completed(5));
        let codes = f.store.codes_for_deal(&f.deal.id).await;
        assert_eq!(codes.len(), 5);
        for code in &codes {
            assert!(!code.is_used());
            assert_eq!(code.code.as_str().len(), CODE_LENGTH);
            assert!(code.code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn generation_is_a_no_op_when_codes_exist() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222"]).await;
        let handler = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(50));

        let outcome = handler.handle(command(f.deal.id, 10, &f.owner)).await.unwrap();

        assert!(outcome.skipped_existing);
        assert_eq!(outcome.generated, 0);
        assert_eq!(f.store.codes_for_deal(&f.deal.id).await.len(), 1);
    }

    #[tokio::test]
    async fn second_generation_after_completion_is_skipped() {
        let f = fixture().await;
        let handler = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(50));
        handler.handle(command(f.deal.id, 4, &f.owner)).await.unwrap();

        let outcome = handler.handle(command(f.deal.id, 9, &f.owner)).await.unwrap();

        assert!(outcome.skipped_existing);
        assert_eq!(f.store.codes_for_deal(&f.deal.id).await.len(), 4);
    }

    #[tokio::test]
    async fn quantity_outside_bounds_is_rejected() {
        let f = fixture().await;
        let handler = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(50));

        for quantity in [0, 501] {
            let result = handler.handle(command(f.deal.id, quantity, &f.owner)).await;
            assert!(matches!(result, Err(CodeError::ValidationFailed { .. })));
        }
    }

    #[tokio::test]
    async fn other_salon_cannot_generate() {
        let f = fixture().await;
        let handler = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(50));

        let result = handler.handle(command(f.deal.id, 5, &f.other)).await;

        assert!(matches!(result, Err(CodeError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn admin_can_generate_for_any_deal() {
        let f = fixture().await;
        let handler = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(50));

        let outcome = handler.handle(command(f.deal.id, 3, &f.admin)).await.unwrap();

        assert_eq!(outcome.generated, 3);
    }

    #[tokio::test]
    async fn unknown_deal_is_not_found() {
        let f = fixture().await;
        let handler = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(50));
        let missing = DealId::new();

        let result = handler.handle(command(missing, 3, &f.admin)).await;

        assert_eq!(result, Err(CodeError::DealNotFound(missing)));
    }

    #[tokio::test]
    async fn failing_batch_reports_partial_progress() {
        let f = fixture().await;
        let codes = Arc::new(FlakyCodeRepository::new(f.store.clone(), 2));
        let handler = GenerateCodesHandler::new(f.store.clone(), codes, fast_settings(10));

        let result = handler.handle(command(f.deal.id, 35, &f.owner)).await;

        assert_eq!(result, Err(CodeError::partial_generation(20, 35)));
        assert_eq!(f.store.codes_for_deal(&f.deal.id).await.len(), 20);
    }

    #[tokio::test]
    async fn failing_first_batch_is_an_infrastructure_error() {
        let f = fixture().await;
        let codes = Arc::new(FlakyCodeRepository::new(f.store.clone(), 0));
        let handler = GenerateCodesHandler::new(f.store.clone(), codes, fast_settings(10));

        let result = handler.handle(command(f.deal.id, 5, &f.owner)).await;

        assert!(matches!(result, Err(CodeError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn retry_after_partial_failure_tops_up_to_the_first_quantity() {
        let f = fixture().await;
        let flaky = Arc::new(FlakyCodeRepository::new(f.store.clone(), 1));
        let failing = GenerateCodesHandler::new(f.store.clone(), flaky, fast_settings(10));
        let healthy = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(10));

        let first = failing.handle(command(f.deal.id, 35, &f.owner)).await;
        assert_eq!(first, Err(CodeError::partial_generation(10, 35)));

        // The retry asks for a different quantity; the recorded one wins.
        let retry = healthy.handle(command(f.deal.id, 12, &f.owner)).await.unwrap();

        assert_eq!(retry, GenerationOutcome::topped_up(35, 25));
        assert_eq!(f.store.codes_for_deal(&f.deal.id).await.len(), 35);

        let again = healthy.handle(command(f.deal.id, 35, &f.owner)).await.unwrap();
        assert!(again.skipped_existing);
        assert_eq!(f.store.codes_for_deal(&f.deal.id).await.len(), 35);
    }

    #[tokio::test]
    async fn failed_retry_reports_the_whole_stored_pool() {
        let f = fixture().await;
        let first = GenerateCodesHandler::new(
            f.store.clone(),
            Arc::new(FlakyCodeRepository::new(f.store.clone(), 1)),
            fast_settings(10),
        );
        first.handle(command(f.deal.id, 35, &f.owner)).await.unwrap_err();

        let second = GenerateCodesHandler::new(
            f.store.clone(),
            Arc::new(FlakyCodeRepository::new(f.store.clone(), 1)),
            fast_settings(10),
        );
        let result = second.handle(command(f.deal.id, 35, &f.owner)).await;

        assert_eq!(result, Err(CodeError::partial_generation(20, 35)));
    }

    #[tokio::test]
    async fn held_generation_job_rejects_a_second_run() {
        let f = fixture().await;
        let now = Timestamp::now();
        f.store
            .start_generation(&f.deal.id, 5, now, now.plus_secs(GENERATION_LEASE_SECS))
            .await
            .unwrap();
        let handler = GenerateCodesHandler::new(f.store.clone(), f.store.clone(), fast_settings(50));

        let result = handler.handle(command(f.deal.id, 5, &f.owner)).await;

        assert_eq!(result, Err(CodeError::GenerationInProgress(f.deal.id)));
        assert!(f.store.codes_for_deal(&f.deal.id).await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_generation_fills_the_pool_once() {
        let f = fixture().await;
        let settings = GenerationSettings {
            batch_size: 1,
            batch_delay: Duration::from_millis(5),
            max_quantity: MAX_QUANTITY,
        };
        let handler = Arc::new(GenerateCodesHandler::new(f.store.clone(), f.store.clone(), settings));

        let runs: Vec<_> = (0..2)
            .map(|_| {
                let handler = handler.clone();
                let cmd = command(f.deal.id, 5, &f.owner);
                tokio::spawn(async move { handler.handle(cmd).await })
            })
            .collect();
        let mut results = Vec::new();
        for run in runs {
            results.push(run.await.unwrap());
        }

        assert_eq!(f.store.codes_for_deal(&f.deal.id).await.len(), 5);
        let generated: u32 = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|o| o.generated)
            .sum();
        assert_eq!(generated, 5);
        for result in &results {
            assert!(matches!(
                result,
                Ok(_) | Err(CodeError::GenerationInProgress(_))
            ));
        }
    }
}
