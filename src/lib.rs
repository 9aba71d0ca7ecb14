pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod identity;
pub mod ledger;
pub mod models;
pub mod repository;
pub mod validation;

pub use error::{ActionResult, LedgerError, StoreError};
pub use ledger::{Ledger, MonthSummary};
