//! Rule drafting, partial updates, pattern promotion and persistence.

pub mod compiler;
pub mod lifecycle;
pub mod merge;
pub mod promotion;

pub use compiler::{DraftedRule, RuleCompiler};
pub use lifecycle::{create_rule, delete_rule, update_rule};
pub use merge::apply_patch;
pub use promotion::{promote_pattern, PromotionOverrides};
