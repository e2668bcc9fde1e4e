//! Batch planning and job bookkeeping for code generation.
//!
//! A deal's pool is filled under a `GenerationJob`. The job is created in the
//! same step as the "no codes yet" check, so two requests for an empty deal
//! cannot both start inserting. A run that stops short leaves the job open
//! and the next request tops the pool up to the recorded quantity.

use rand::Rng;
use serde::Serialize;

use super::code_value::{generate_unique, CodeValue};
use crate::domain::foundation::{DealId, Timestamp, ValidationError};

/// Largest pool a single request may create.
pub const MAX_QUANTITY: u32 = 500;

/// How long a run may hold a job before another request may take it over.
pub const GENERATION_LEASE_SECS: i64 = 600;

/// A validated generation request split into insert batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    quantity: u32,
    batch_size: usize,
}

impl GenerationPlan {
    /// Validates `quantity` against `1..=max_quantity`.
    pub fn new(quantity: u32, max_quantity: u32, batch_size: usize) -> Result<Self, ValidationError> {
        if quantity == 0 || quantity > max_quantity {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                i64::from(max_quantity),
                i64::from(quantity),
            ));
        }
        Ok(Self {
            quantity,
            batch_size: batch_size.max(1),
        })
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Draws the codes for this plan and splits them into batches.
    pub fn draw_batches<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec<CodeValue>> {
        generate_unique(rng, self.quantity as usize)
            .chunks(self.batch_size)
            .map(<[CodeValue]>::to_vec)
            .collect()
    }
}

/// Result of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    pub requested: u32,
    pub generated: u32,
    /// True when the deal already had codes and nothing was inserted.
    pub skipped_existing: bool,
}

impl GenerationOutcome {
    pub fn skipped(requested: u32) -> Self {
        Self {
            requested,
            generated: 0,
            skipped_existing: true,
        }
    }

    pub fn completed(requested: u32) -> Self {
        Self::topped_up(requested, requested)
    }

    /// A resumed run that inserted the `generated` codes still missing.
    pub fn topped_up(requested: u32, generated: u32) -> Self {
        Self {
            requested,
            generated,
            skipped_existing: false,
        }
    }
}

/// How a generation request may proceed for a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStart {
    /// No codes and no earlier job; the caller now holds a new job.
    Fresh,
    /// An earlier run stopped short; the caller holds its job and should
    /// top up to `requested`.
    Resume { requested: u32, existing: u64 },
    /// Another run holds the job.
    Busy,
    /// The pool was already filled.
    Filled { existing: u64 },
}

/// Per-deal record of a pool fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub deal_id: DealId,
    pub requested: u32,
    pub lease_expires_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl GenerationJob {
    /// A new job, leased to the run that created it.
    pub fn open(deal_id: DealId, requested: u32, lease_until: Timestamp) -> Self {
        Self {
            deal_id,
            requested,
            lease_expires_at: Some(lease_until),
            completed_at: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether a run currently holds the lease.
    pub fn is_held(&self, now: Timestamp) -> bool {
        self.lease_expires_at
            .is_some_and(|until| until.is_after(&now))
    }

    /// Lets a new run take over an unfinished job whose lease has lapsed.
    pub fn try_resume(
        &mut self,
        existing: u64,
        now: Timestamp,
        lease_until: Timestamp,
    ) -> GenerationStart {
        if self.is_complete() {
            return GenerationStart::Filled { existing };
        }
        if self.is_held(now) {
            return GenerationStart::Busy;
        }
        self.lease_expires_at = Some(lease_until);
        GenerationStart::Resume {
            requested: self.requested,
            existing,
        }
    }

    /// Drops the lease; `completed_at` closes the job for good.
    pub fn release(&mut self, completed_at: Option<Timestamp>) {
        self.lease_expires_at = None;
        if completed_at.is_some() {
            self.completed_at = completed_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn quantity_must_be_within_bounds() {
        assert!(GenerationPlan::new(0, MAX_QUANTITY, 50).is_err());
        assert!(GenerationPlan::new(501, MAX_QUANTITY, 50).is_err());
        assert!(GenerationPlan::new(1, MAX_QUANTITY, 50).is_ok());
        assert!(GenerationPlan::new(500, MAX_QUANTITY, 50).is_ok());
    }

    #[test]
    fn batches_cover_quantity_in_batch_size_chunks() {
        let plan = GenerationPlan::new(120, MAX_QUANTITY, 50).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let batches = plan.draw_batches(&mut rng);

        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
    }

    fn job(now: Timestamp) -> GenerationJob {
        GenerationJob::open(DealId::new(), 35, now.plus_secs(GENERATION_LEASE_SECS))
    }

    #[test]
    fn held_job_turns_other_runs_away() {
        let now = Timestamp::now();
        let mut job = job(now);

        let start = job.try_resume(10, now.plus_secs(1), now.plus_secs(700));

        assert_eq!(start, GenerationStart::Busy);
    }

    #[test]
    fn released_job_resumes_with_recorded_quantity() {
        let now = Timestamp::now();
        let mut job = job(now);
        job.release(None);

        let start = job.try_resume(10, now, now.plus_secs(GENERATION_LEASE_SECS));

        assert_eq!(
            start,
            GenerationStart::Resume {
                requested: 35,
                existing: 10
            }
        );
        assert!(job.is_held(now));
    }

    #[test]
    fn lapsed_lease_can_be_taken_over() {
        let now = Timestamp::now();
        let mut job = job(now);

        let later = now.plus_secs(GENERATION_LEASE_SECS + 1);
        let start = job.try_resume(10, later, later.plus_secs(GENERATION_LEASE_SECS));

        assert!(matches!(start, GenerationStart::Resume { .. }));
    }

    #[test]
    fn completed_job_reports_filled_pool() {
        let now = Timestamp::now();
        let mut job = job(now);
        job.release(Some(now));

        let start = job.try_resume(35, now, now.plus_secs(GENERATION_LEASE_SECS));

        assert_eq!(start, GenerationStart::Filled { existing: 35 });
        assert!(!job.is_held(now));
    }

    #[test]
    fn zero_batch_size_falls_back_to_one() {
        let plan = GenerationPlan::new(3, MAX_QUANTITY, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(plan.draw_batches(&mut rng).len(), 3);
    }
}
