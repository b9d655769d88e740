mod engine;
mod error;
mod sql;
mod types;

pub use engine::{rewrite_batch, rewrite_statements};
pub use error::{ErrorKind, GraphloadError};
pub use sql::rewrite::EvalError;
pub use types::{GroupOutput, RewriteConfig, TypeMap, LABEL_TYPE};
