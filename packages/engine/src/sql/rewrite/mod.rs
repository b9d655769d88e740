//! Rewrite stages for extraction statements: classification and column
//! rewriting, group-key resolution, grouping, type coercion and dedup.

mod bindings;
mod classify;
mod coerce;
mod dedup;
mod evaluate;
mod group;
mod resolve;
mod statement;

pub(crate) use coerce::CoercionPlan;
pub(crate) use dedup::consolidate_group;
pub use evaluate::EvalError;
pub(crate) use group::GroupSet;
pub(crate) use statement::{rewrite_statement, rewrite_statement_columns};
