//! PostgreSQL implementation of DiscountCodeRepository.
//!
//! Consumption is a single conditional `UPDATE ... RETURNING`. The partial
//! unique indexes on `(deal_id, customer_email)` and `(deal_id, customer_phone)`
//! turn a second redemption by the same customer into a constraint violation,
//! which is reported as `ContactTaken`.
//!
//! `claim` picks its row with `FOR UPDATE SKIP LOCKED`. A row locked by a
//! transaction that later rolls back is skipped, so an empty result only
//! means "exhausted" once no unused row is visible any more. The claim is
//! retried a bounded number of times while one is.
//!
//! Pool fills are coordinated through `code_generation_jobs`, one row per
//! deal, created only while the deal has no codes.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::domain::codes::{CodeStatus, CodeValue, DiscountCode, GenerationStart};
use crate::domain::foundation::{DealId, DiscountCodeId, DomainError, ErrorCode, Timestamp};
use crate::domain::redemption::{ContactRejection, CustomerInfo, EmailAddress, PhoneNumber};
use crate::ports::{ClaimOutcome, DiscountCodeRepository, MarkUsedOutcome};

const CODE_COLUMNS: &str = "id, code, deal_id, used, used_at, customer_name, customer_email, \
     customer_phone, subscribed_to_newsletter, created_at";

const CODE_UNIQUE: &str = "discount_codes_code_key";
const EMAIL_UNIQUE: &str = "discount_codes_deal_email_key";
const PHONE_UNIQUE: &str = "discount_codes_deal_phone_key";

const CLAIM_ATTEMPTS: u32 = 3;
const CLAIM_RETRY_DELAY: Duration = Duration::from_millis(25);

/// PostgreSQL implementation of DiscountCodeRepository.
#[derive(Clone)]
pub struct PostgresDiscountCodeRepository {
    pool: PgPool,
}

impl PostgresDiscountCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn claim_once(
        &self,
        deal_id: &DealId,
        customer: &CustomerInfo,
        used_at: Timestamp,
    ) -> Result<ClaimOutcome, DomainError> {
        // SKIP LOCKED lets concurrent claims take different rows instead of
        // queueing on the same one.
        let claimed = sqlx::query(&format!(
            r#"
            UPDATE discount_codes SET
                used = TRUE,
                used_at = $2,
                customer_name = $3,
                customer_email = $4,
                customer_phone = $5,
                subscribed_to_newsletter = $6
            WHERE id = (
                SELECT id FROM discount_codes
                WHERE deal_id = $1 AND NOT used
                ORDER BY created_at, id
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {}
            "#,
            CODE_COLUMNS
        ))
        .bind(deal_id.as_uuid())
        .bind(used_at.as_datetime())
        .bind(&customer.name)
        .bind(customer.email.as_str())
        .bind(customer.phone.as_str())
        .bind(customer.subscribed_to_newsletter)
        .fetch_optional(&self.pool)
        .await;

        match claimed {
            Ok(Some(row)) => Ok(ClaimOutcome::Claimed(row_to_code(row)?)),
            Ok(None) => Ok(ClaimOutcome::Exhausted),
            Err(e) => match contact_rejection(&e) {
                Some(reason) => Ok(ClaimOutcome::ContactTaken(reason)),
                None => Err(DomainError::database(format!("Failed to claim code: {}", e))),
            },
        }
    }

    async fn open_job_state(&self, deal_id: &DealId) -> Result<Option<bool>, DomainError> {
        let row: Option<(bool,)> = sqlx::query_as(
            "SELECT completed_at IS NOT NULL FROM code_generation_jobs WHERE deal_id = $1",
        )
        .bind(deal_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to read generation job: {}", e)))?;

        Ok(row.map(|(completed,)| completed))
    }
}

#[async_trait]
impl DiscountCodeRepository for PostgresDiscountCodeRepository {
    async fn count_for_deal(&self, deal_id: &DealId) -> Result<u64, DomainError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM discount_codes WHERE deal_id = $1")
            .bind(deal_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to count codes: {}", e)))?;

        Ok(count.0.max(0) as u64)
    }

    async fn start_generation(
        &self,
        deal_id: &DealId,
        requested: u32,
        now: Timestamp,
        lease_until: Timestamp,
    ) -> Result<GenerationStart, DomainError> {
        // The primary key on deal_id lets exactly one run create the job.
        let created = sqlx::query(
            r#"
            INSERT INTO code_generation_jobs (deal_id, requested, lease_expires_at)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (SELECT 1 FROM discount_codes WHERE deal_id = $1)
            ON CONFLICT (deal_id) DO NOTHING
            RETURNING deal_id
            "#,
        )
        .bind(deal_id.as_uuid())
        .bind(requested as i32)
        .bind(lease_until.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to create generation job: {}", e)))?;

        if created.is_some() {
            return Ok(GenerationStart::Fresh);
        }

        let resumed: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE code_generation_jobs SET lease_expires_at = $3
            WHERE deal_id = $1
              AND completed_at IS NULL
              AND (lease_expires_at IS NULL OR lease_expires_at < $2)
            RETURNING requested
            "#,
        )
        .bind(deal_id.as_uuid())
        .bind(now.as_datetime())
        .bind(lease_until.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to resume generation job: {}", e)))?;

        let existing = self.count_for_deal(deal_id).await?;
        if let Some((requested,)) = resumed {
            return Ok(GenerationStart::Resume {
                requested: requested.max(0) as u32,
                existing,
            });
        }

        Ok(match self.open_job_state(deal_id).await? {
            Some(false) => GenerationStart::Busy,
            _ => GenerationStart::Filled { existing },
        })
    }

    async fn finish_generation(
        &self,
        deal_id: &DealId,
        completed_at: Option<Timestamp>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE code_generation_jobs SET
                lease_expires_at = NULL,
                completed_at = COALESCE($2, completed_at)
            WHERE deal_id = $1
            "#,
        )
        .bind(deal_id.as_uuid())
        .bind(completed_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to finish generation job: {}", e)))?;

        Ok(())
    }

    async fn insert_batch(&self, codes: &[DiscountCode]) -> Result<(), DomainError> {
        if codes.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO discount_codes (id, code, deal_id, created_at) ");
        builder.push_values(codes, |mut row, code| {
            row.push_bind(*code.id.as_uuid())
                .push_bind(code.code.as_str().to_string())
                .push_bind(*code.deal_id.as_uuid())
                .push_bind(*code.created_at.as_datetime());
        });

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| match constraint_name(&e).as_deref() {
                Some(CODE_UNIQUE) => {
                    DomainError::new(ErrorCode::DuplicateCode, "Code value already exists")
                }
                _ => DomainError::database(format!("Failed to insert code batch: {}", e)),
            })?;

        Ok(())
    }

    async fn find_unused(&self, deal_id: &DealId) -> Result<Option<DiscountCode>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM discount_codes WHERE deal_id = $1 AND NOT used \
             ORDER BY created_at, id LIMIT 1",
            CODE_COLUMNS
        ))
        .bind(deal_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch unused code: {}", e)))?;

        row.map(row_to_code).transpose()
    }

    async fn find_by_code(&self, code: &CodeValue) -> Result<Option<DiscountCode>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM discount_codes WHERE code = $1",
            CODE_COLUMNS
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch code: {}", e)))?;

        row.map(row_to_code).transpose()
    }

    async fn mark_used(
        &self,
        code: &CodeValue,
        customer: &CustomerInfo,
        used_at: Timestamp,
    ) -> Result<MarkUsedOutcome, DomainError> {
        let updated = sqlx::query(&format!(
            r#"
            UPDATE discount_codes SET
                used = TRUE,
                used_at = $2,
                customer_name = $3,
                customer_email = $4,
                customer_phone = $5,
                subscribed_to_newsletter = $6
            WHERE code = $1 AND NOT used
            RETURNING {}
            "#,
            CODE_COLUMNS
        ))
        .bind(code.as_str())
        .bind(used_at.as_datetime())
        .bind(&customer.name)
        .bind(customer.email.as_str())
        .bind(customer.phone.as_str())
        .bind(customer.subscribed_to_newsletter)
        .fetch_optional(&self.pool)
        .await;

        match updated {
            Ok(Some(row)) => Ok(MarkUsedOutcome::Marked(row_to_code(row)?)),
            Ok(None) => {
                // Lost the swap or never existed; tell the two apart.
                let exists = self.find_by_code(code).await?.is_some();
                Ok(if exists {
                    MarkUsedOutcome::AlreadyUsed
                } else {
                    MarkUsedOutcome::NotFound
                })
            }
            Err(e) => match contact_rejection(&e) {
                Some(reason) => Ok(MarkUsedOutcome::ContactTaken(reason)),
                None => Err(DomainError::database(format!("Failed to mark code used: {}", e))),
            },
        }
    }

    async fn claim(
        &self,
        deal_id: &DealId,
        customer: &CustomerInfo,
        used_at: Timestamp,
    ) -> Result<ClaimOutcome, DomainError> {
        let mut attempt = 1;
        loop {
            let outcome = self.claim_once(deal_id, customer, used_at).await?;
            if outcome != ClaimOutcome::Exhausted {
                return Ok(outcome);
            }
            let unused_remaining = self.find_unused(deal_id).await?.is_some();
            if !retry_empty_claim(attempt, unused_remaining) {
                return Ok(outcome);
            }
            tracing::debug!(deal_id = %deal_id, attempt, "Claim skipped locked rows, retrying");
            tokio::time::sleep(CLAIM_RETRY_DELAY).await;
            attempt += 1;
        }
    }

    async fn find_contact_conflict(
        &self,
        deal_id: &DealId,
        email: &EmailAddress,
        phone: &PhoneNumber,
    ) -> Result<Option<ContactRejection>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM discount_codes
                        WHERE deal_id = $1 AND used AND customer_email = $2) AS email_taken,
                EXISTS (SELECT 1 FROM discount_codes
                        WHERE deal_id = $1 AND used AND customer_phone = $3) AS phone_taken
            "#,
        )
        .bind(deal_id.as_uuid())
        .bind(email.as_str())
        .bind(phone.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check contact: {}", e)))?;

        let email_taken: bool = row.get("email_taken");
        let phone_taken: bool = row.get("phone_taken");

        Ok(if email_taken {
            Some(ContactRejection::EmailAlreadyUsed)
        } else if phone_taken {
            Some(ContactRejection::PhoneAlreadyUsed)
        } else {
            None
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Whether an empty claim should be tried again. Rows skipped because another
/// transaction held their lock may still be free once that transaction ends.
fn retry_empty_claim(attempt: u32, unused_remaining: bool) -> bool {
    unused_remaining && attempt < CLAIM_ATTEMPTS
}

fn constraint_name(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            db.constraint().map(str::to_string)
        }
        _ => None,
    }
}

fn contact_rejection(err: &sqlx::Error) -> Option<ContactRejection> {
    match constraint_name(err).as_deref() {
        Some(EMAIL_UNIQUE) => Some(ContactRejection::EmailAlreadyUsed),
        Some(PHONE_UNIQUE) => Some(ContactRejection::PhoneAlreadyUsed),
        _ => None,
    }
}

fn row_to_code(row: sqlx::postgres::PgRow) -> Result<DiscountCode, DomainError> {
    let get_err = |e: sqlx::Error| DomainError::database(format!("Failed to read code row: {}", e));

    let raw_code: String = row.try_get("code").map_err(get_err)?;
    let code = CodeValue::try_new(&raw_code)
        .map_err(|e| DomainError::database(format!("Invalid stored code {}: {}", raw_code, e)))?;

    let used: bool = row.try_get("used").map_err(get_err)?;
    let status = if used {
        let used_at: chrono::DateTime<chrono::Utc> = row.try_get("used_at").map_err(get_err)?;
        CodeStatus::Used {
            used_at: Timestamp::from_datetime(used_at),
            customer: CustomerInfo::reconstitute(
                row.try_get("customer_name").map_err(get_err)?,
                row.try_get("customer_email").map_err(get_err)?,
                row.try_get("customer_phone").map_err(get_err)?,
                row.try_get("subscribed_to_newsletter").map_err(get_err)?,
            ),
        }
    } else {
        CodeStatus::Unused
    };

    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(get_err)?;

    Ok(DiscountCode {
        id: DiscountCodeId::from_uuid(row.try_get("id").map_err(get_err)?),
        code,
        deal_id: DealId::from_uuid(row.try_get("deal_id").map_err(get_err)?),
        status,
        created_at: Timestamp::from_datetime(created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_claim_is_retried_while_an_unused_row_is_visible() {
        assert!(retry_empty_claim(1, true));
        assert!(retry_empty_claim(CLAIM_ATTEMPTS - 1, true));
    }

    #[test]
    fn empty_claim_retries_are_bounded() {
        assert!(!retry_empty_claim(CLAIM_ATTEMPTS, true));
    }

    #[test]
    fn empty_pool_is_exhausted_without_retry() {
        assert!(!retry_empty_claim(1, false));
    }
}
