//! Read paths over drift scores and the repository ledger.

pub mod drift;
pub mod ledger;

pub use drift::{drift_report, DriftReport};
pub use ledger::{ledger_summaries, ledger_timeline};
