#![doc(test(attr(deny(warnings))))]

//! Finansys is a local, single-user personal finance ledger: transactions,
//! recurring subscriptions and spending categories, with monthly statistics
//! and a small command-line front end.

pub mod app;
pub mod cli;
pub mod currency;
pub mod errors;
pub mod utils;

pub use app::App;
pub use errors::FinansysError;

/// Default tracing directive when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "finansys=info";

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(DEFAULT_LOG_FILTER);
}

/// Initializes global tracing. Only the first call has any effect.
pub fn init_with_filter(directive: &str) {
    if utils::init_tracing(directive) {
        tracing::debug!(directive, "finansys tracing initialized");
    }
}
