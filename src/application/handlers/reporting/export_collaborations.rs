//! ExportCollaborationsHandler - Admin query producing the collaboration CSV.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::codes::CodeError;
use crate::domain::reporting::{export_collaborations, CsvExport};
use crate::domain::salon::Salon;
use crate::ports::CodeReader;

#[derive(Debug, Clone)]
pub struct ExportCollaborationsQuery {
    /// Date stamped into the filename.
    pub date: NaiveDate,
    pub actor: Salon,
}

pub struct ExportCollaborationsHandler {
    reader: Arc<dyn CodeReader>,
}

impl ExportCollaborationsHandler {
    pub fn new(reader: Arc<dyn CodeReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(&self, query: ExportCollaborationsQuery) -> Result<CsvExport, CodeError> {
        if !query.actor.is_admin() {
            return Err(CodeError::admin_only(query.actor.id));
        }
        let rows = self.reader.list_collaborations().await?;
        tracing::info!(rows = rows.len(), "Collaboration export generated");
        Ok(export_collaborations(&rows, query.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{fixture, seed_codes};
    use crate::domain::foundation::Timestamp;
    use crate::domain::redemption::CustomerInfo;
    use crate::ports::{DealRepository, DiscountCodeRepository};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[tokio::test]
    async fn admin_exports_views_and_conversion() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222", "BBBB3333"]).await;
        for _ in 0..10 {
            f.store.record_view(&f.deal.id).await.unwrap();
        }
        for (email, phone) in [("a@example.se", "0701111111"), ("b@example.se", "0702222222")] {
            let customer = CustomerInfo::parse("Kund", email, phone, false).unwrap();
            f.store.claim(&f.deal.id, &customer, Timestamp::now()).await.unwrap();
        }
        let handler = ExportCollaborationsHandler::new(f.store.clone());

        let export = handler
            .handle(ExportCollaborationsQuery {
                date: date(),
                actor: f.admin.clone(),
            })
            .await
            .unwrap();

        assert_eq!(export.filename, "aktiva-samarbeten-2024-03-05.csv");
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines[0], "ID,Rabattkod,Skapad,Visningar,Inlösta,Konvertering %");
        assert!(lines[1].starts_with(&f.deal.id.to_string()));
        assert!(lines[1].ends_with(",10,2,20.0%"));
    }

    #[tokio::test]
    async fn salon_cannot_export() {
        let f = fixture().await;
        let handler = ExportCollaborationsHandler::new(f.store.clone());

        let result = handler
            .handle(ExportCollaborationsQuery {
                date: date(),
                actor: f.owner.clone(),
            })
            .await;

        assert_eq!(result, Err(CodeError::admin_only(f.owner.id)));
    }
}
