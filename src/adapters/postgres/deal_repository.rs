//! PostgreSQL implementation of DealRepository.
//!
//! Prices are stored as whole kronor; the view counter is only ever touched
//! by `record_view`, so updates never overwrite it.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::deal::{ApprovalStatus, Deal, PricePair, RedemptionMode};
use crate::domain::foundation::{DealId, DomainError, ErrorCode, SalonId, Timestamp};
use crate::ports::DealRepository;

const DEAL_COLUMNS: &str = "id, salon_id, title, description, original_price, discounted_price, \
     category, city, is_active, approval, booking_url, redemption_mode, views, created_at, updated_at";

/// PostgreSQL implementation of DealRepository.
#[derive(Clone)]
pub struct PostgresDealRepository {
    pool: PgPool,
}

impl PostgresDealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DealRepository for PostgresDealRepository {
    async fn save(&self, deal: &Deal) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO deals (
                id, salon_id, title, description, original_price, discounted_price,
                category, city, is_active, approval, booking_url, redemption_mode,
                views, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(deal.id.as_uuid())
        .bind(deal.salon_id.as_uuid())
        .bind(&deal.title)
        .bind(&deal.description)
        .bind(deal.price.original() as i32)
        .bind(deal.price.discounted() as i32)
        .bind(&deal.category)
        .bind(&deal.city)
        .bind(deal.is_active)
        .bind(deal.approval.as_str())
        .bind(&deal.booking_url)
        .bind(deal.redemption_mode.as_str())
        .bind(deal.views as i64)
        .bind(deal.created_at.as_datetime())
        .bind(deal.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert deal: {}", e)))?;

        Ok(())
    }

    async fn update(&self, deal: &Deal) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE deals SET
                title = $2,
                description = $3,
                original_price = $4,
                discounted_price = $5,
                category = $6,
                city = $7,
                is_active = $8,
                approval = $9,
                booking_url = $10,
                redemption_mode = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(deal.id.as_uuid())
        .bind(&deal.title)
        .bind(&deal.description)
        .bind(deal.price.original() as i32)
        .bind(deal.price.discounted() as i32)
        .bind(&deal.category)
        .bind(&deal.city)
        .bind(deal.is_active)
        .bind(deal.approval.as_str())
        .bind(&deal.booking_url)
        .bind(deal.redemption_mode.as_str())
        .bind(deal.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update deal: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::DealNotFound,
                format!("Deal not found: {}", deal.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &DealId) -> Result<Option<Deal>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM deals WHERE id = $1", DEAL_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch deal: {}", e)))?;

        row.map(row_to_deal).transpose()
    }

    async fn list_by_salon(&self, salon_id: &SalonId) -> Result<Vec<Deal>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM deals WHERE salon_id = $1 ORDER BY created_at DESC",
            DEAL_COLUMNS
        ))
        .bind(salon_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch deals by salon: {}", e)))?;

        rows.into_iter().map(row_to_deal).collect()
    }

    async fn delete(&self, id: &DealId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => DomainError::new(
                    ErrorCode::DealHasCodes,
                    format!("Deal {} still has discount codes", id),
                ),
                other => DomainError::database(format!("Failed to delete deal: {}", other)),
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::DealNotFound,
                format!("Deal not found: {}", id),
            ));
        }

        Ok(())
    }

    async fn record_view(&self, id: &DealId) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE deals SET views = views + 1 WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to record deal view: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn row_to_deal(row: sqlx::postgres::PgRow) -> Result<Deal, DomainError> {
    let get_err = |e: sqlx::Error| DomainError::database(format!("Failed to read deal row: {}", e));

    let original: i32 = row.try_get("original_price").map_err(get_err)?;
    let discounted: i32 = row.try_get("discounted_price").map_err(get_err)?;
    let price = PricePair::try_new(original.max(0) as u32, discounted.max(0) as u32)
        .map_err(|e| DomainError::database(format!("Invalid stored price: {}", e)))?;

    let approval: String = row.try_get("approval").map_err(get_err)?;
    let approval = ApprovalStatus::parse(&approval)
        .ok_or_else(|| DomainError::database(format!("Invalid approval status: {}", approval)))?;

    let mode: String = row.try_get("redemption_mode").map_err(get_err)?;
    let redemption_mode = RedemptionMode::parse(&mode)
        .ok_or_else(|| DomainError::database(format!("Invalid redemption mode: {}", mode)))?;

    let views: i64 = row.try_get("views").map_err(get_err)?;
    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(get_err)?;
    let updated_at: chrono::DateTime<chrono::Utc> = row.try_get("updated_at").map_err(get_err)?;

    Ok(Deal {
        id: DealId::from_uuid(row.try_get("id").map_err(get_err)?),
        salon_id: SalonId::from_uuid(row.try_get("salon_id").map_err(get_err)?),
        title: row.try_get("title").map_err(get_err)?,
        description: row.try_get("description").map_err(get_err)?,
        price,
        category: row.try_get("category").map_err(get_err)?,
        city: row.try_get("city").map_err(get_err)?,
        is_active: row.try_get("is_active").map_err(get_err)?,
        approval,
        booking_url: row.try_get("booking_url").map_err(get_err)?,
        redemption_mode,
        views: views.max(0) as u64,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
