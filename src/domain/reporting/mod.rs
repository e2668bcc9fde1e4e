pub mod code_stats;
pub mod collaborations;

pub use code_stats::{CodeStats, RedemptionFilter, RedemptionRecord};
pub use collaborations::{export_collaborations, CollaborationRow, CsvExport, CSV_HEADER};
