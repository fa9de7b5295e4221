//! Query modules, one per table.

pub mod drift;
pub mod edges;
pub mod entities;
pub mod impact_reports;
pub mod ledger;
pub mod patterns;
pub mod review_configs;
pub mod reviews;
pub mod rules;
pub mod util;
pub mod workflows;
