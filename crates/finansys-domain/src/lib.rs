//! finansys-domain
//!
//! Pure ledger models (Category, Transaction, Subscription, LedgerSnapshot).
//! No I/O, no CLI, no storage. Only data types, defaults and display lookups.

pub mod category;
pub mod common;
pub mod icon;
pub mod snapshot;
pub mod subscription;
pub mod transaction;

pub use category::*;
pub use common::*;
pub use icon::*;
pub use snapshot::*;
pub use subscription::*;
pub use transaction::*;
