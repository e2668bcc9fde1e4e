//! PostgreSQL implementation of CodeReader.
//!
//! Read-side queries for the salon dashboard and the admin back-office.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DealId, SalonId, Timestamp};
use crate::domain::reporting::{CodeStats, CollaborationRow, RedemptionFilter, RedemptionRecord};
use crate::ports::{CodeReader, ReaderError};

/// PostgreSQL implementation of CodeReader.
#[derive(Clone)]
pub struct PostgresCodeReader {
    pool: PgPool,
}

impl PostgresCodeReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeReader for PostgresCodeReader {
    async fn code_stats(&self, deal_id: &DealId) -> Result<CodeStats, ReaderError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(c.id) AS total,
                COUNT(c.id) FILTER (WHERE c.used) AS used
            FROM deals d
            LEFT JOIN discount_codes c ON c.deal_id = d.id
            WHERE d.id = $1
            GROUP BY d.id
            "#,
        )
        .bind(deal_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(ReaderError::DealNotFound(*deal_id))?;
        let total: i64 = row.try_get("total")?;
        let used: i64 = row.try_get("used")?;

        Ok(CodeStats::new(*deal_id, total.max(0) as u64, used.max(0) as u64))
    }

    async fn list_redemptions(
        &self,
        filter: &RedemptionFilter,
    ) -> Result<Vec<RedemptionRecord>, ReaderError> {
        let rows = sqlx::query(
            r#"
            SELECT
                c.code, c.deal_id, d.title, d.salon_id,
                c.customer_name, c.customer_email, c.customer_phone,
                c.subscribed_to_newsletter, c.used_at
            FROM discount_codes c
            JOIN deals d ON d.id = c.deal_id
            WHERE c.used
              AND ($1::uuid IS NULL OR d.salon_id = $1)
              AND ($2::uuid IS NULL OR c.deal_id = $2)
            ORDER BY c.used_at DESC
            "#,
        )
        .bind(filter.salon_id.map(|id| *id.as_uuid()))
        .bind(filter.deal_id.map(|id| *id.as_uuid()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<RedemptionRecord, ReaderError> {
                let used_at: chrono::DateTime<chrono::Utc> = row.try_get("used_at")?;
                Ok(RedemptionRecord {
                    code: row.try_get("code")?,
                    deal_id: DealId::from_uuid(row.try_get("deal_id")?),
                    deal_title: row.try_get("title")?,
                    salon_id: SalonId::from_uuid(row.try_get("salon_id")?),
                    customer_name: row.try_get("customer_name")?,
                    customer_email: row.try_get("customer_email")?,
                    customer_phone: row.try_get("customer_phone")?,
                    subscribed_to_newsletter: row.try_get("subscribed_to_newsletter")?,
                    used_at: Timestamp::from_datetime(used_at),
                })
            })
            .collect()
    }

    async fn list_collaborations(&self) -> Result<Vec<CollaborationRow>, ReaderError> {
        let rows = sqlx::query(
            r#"
            SELECT
                d.id, d.title, d.created_at, d.views,
                COUNT(c.id) FILTER (WHERE c.used) AS redemptions
            FROM deals d
            LEFT JOIN discount_codes c ON c.deal_id = d.id
            WHERE d.is_active
            GROUP BY d.id
            ORDER BY d.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<CollaborationRow, ReaderError> {
                let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at")?;
                let views: i64 = row.try_get("views")?;
                let redemptions: i64 = row.try_get("redemptions")?;
                Ok(CollaborationRow {
                    deal_id: DealId::from_uuid(row.try_get("id")?),
                    code: row.try_get("title")?,
                    created_at: Timestamp::from_datetime(created_at),
                    views: views.max(0) as u64,
                    redemptions: redemptions.max(0) as u64,
                })
            })
            .collect()
    }
}
