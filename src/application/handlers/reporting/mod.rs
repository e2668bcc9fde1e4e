//! Dashboard and back-office query handlers.

mod export_collaborations;
mod get_code_stats;
mod list_redemptions;

pub use export_collaborations::{ExportCollaborationsHandler, ExportCollaborationsQuery};
pub use get_code_stats::{GetCodeStatsHandler, GetCodeStatsQuery};
pub use list_redemptions::{ListRedemptionsHandler, ListRedemptionsQuery};
