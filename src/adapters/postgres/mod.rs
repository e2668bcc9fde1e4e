//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSalonRepository` - Salon and admin accounts
//! - `PostgresDealRepository` - Deals and their view counters
//! - `PostgresDiscountCodeRepository` - Code pools with atomic claims
//! - `PostgresCodeReader` - Dashboard and back-office queries

mod code_reader;
mod deal_repository;
mod discount_code_repository;
mod salon_repository;

pub use code_reader::PostgresCodeReader;
pub use deal_repository::PostgresDealRepository;
pub use discount_code_repository::PostgresDiscountCodeRepository;
pub use salon_repository::PostgresSalonRepository;
