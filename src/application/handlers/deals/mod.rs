//! Deal management command and query handlers.

mod create_deal;
mod delete_deal;
mod get_deal;
mod record_view;
mod review_deal;
mod update_deal;

pub use create_deal::{CreateDealCommand, CreateDealHandler};
pub use delete_deal::{DeleteDealCommand, DeleteDealHandler};
pub use get_deal::{GetDealHandler, GetDealQuery, ListDealsHandler, ListDealsQuery};
pub use record_view::RecordViewHandler;
pub use review_deal::{ReviewDealCommand, ReviewDealHandler, ReviewDecision};
pub use update_deal::{UpdateDealCommand, UpdateDealHandler};
