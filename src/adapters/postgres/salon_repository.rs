//! PostgreSQL implementation of SalonRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, SalonId, Timestamp};
use crate::domain::salon::{Salon, SalonRole, SubscriptionState};
use crate::ports::SalonRepository;

/// PostgreSQL implementation of SalonRepository.
#[derive(Clone)]
pub struct PostgresSalonRepository {
    pool: PgPool,
}

impl PostgresSalonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalonRepository for PostgresSalonRepository {
    async fn save(&self, salon: &Salon) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO salons (
                id, name, contact_email, phone, address, role, subscription, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                contact_email = EXCLUDED.contact_email,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                role = EXCLUDED.role,
                subscription = EXCLUDED.subscription
            "#,
        )
        .bind(salon.id.as_uuid())
        .bind(&salon.name)
        .bind(&salon.contact_email)
        .bind(&salon.phone)
        .bind(&salon.address)
        .bind(salon.role.as_str())
        .bind(salon.subscription.as_str())
        .bind(salon.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save salon: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SalonId) -> Result<Option<Salon>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, contact_email, phone, address, role, subscription, created_at
            FROM salons
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch salon: {}", e)))?;

        row.map(row_to_salon).transpose()
    }
}

fn row_to_salon(row: sqlx::postgres::PgRow) -> Result<Salon, DomainError> {
    let get_err = |e: sqlx::Error| DomainError::database(format!("Failed to read salon row: {}", e));

    let role: String = row.try_get("role").map_err(get_err)?;
    let subscription: String = row.try_get("subscription").map_err(get_err)?;
    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(get_err)?;

    Ok(Salon {
        id: SalonId::from_uuid(row.try_get("id").map_err(get_err)?),
        name: row.try_get("name").map_err(get_err)?,
        contact_email: row.try_get("contact_email").map_err(get_err)?,
        phone: row.try_get("phone").map_err(get_err)?,
        address: row.try_get("address").map_err(get_err)?,
        role: SalonRole::parse(&role)
            .ok_or_else(|| DomainError::database(format!("Invalid salon role: {}", role)))?,
        subscription: SubscriptionState::parse(&subscription).ok_or_else(|| {
            DomainError::database(format!("Invalid subscription state: {}", subscription))
        })?,
        created_at: Timestamp::from_datetime(created_at),
    })
}
