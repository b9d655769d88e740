use sqlparser::ast::{Cte, Query, Select, Statement};

use crate::sql::ast::{first_select, rewrite_query_selects};
use crate::sql::rewrite::classify::{rewrite_select, StatementKind};
use crate::sql::rewrite::evaluate::EvalError;
use crate::sql::rewrite::resolve::resolve_group_key;
use crate::GraphloadError;

/// One input statement after column rewriting and key resolution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RewriteResult {
    pub(crate) statement: Query,
    pub(crate) kind: StatementKind,
    pub(crate) group_key: String,
    /// Columns a group deduplicates on; equal for every member of a group.
    pub(crate) identity_columns: Vec<String>,
}

impl RewriteResult {
    /// SELECT whose projection names the statement's output columns.
    pub(crate) fn base_select(&self) -> Option<&Select> {
        first_select(self.statement.body.as_ref())
    }
}

/// Classifies every top-level SELECT of `statement`, rewrites its projection
/// and resolves the group key. Branches of an input UNION must agree on kind
/// and key.
pub(crate) fn rewrite_statement(statement: Statement) -> Result<RewriteResult, GraphloadError> {
    let mut query = into_query(statement)?;
    let ctes: Vec<Cte> = query
        .with
        .as_ref()
        .map(|with| with.cte_tables.clone())
        .unwrap_or_default();

    let mut branches: Vec<(StatementKind, String)> = Vec::new();
    rewrite_query_selects(&mut query, &mut |select| {
        let classified = rewrite_select(select)?;
        let group_column = classified.kind.group_column();
        let Some(group_expr) = classified.group_expr else {
            return Err(GraphloadError::UnresolvedGroupType {
                expression: group_column.to_string(),
                reason: EvalError::MissingColumn(group_column.to_string()),
            });
        };
        let group_key = resolve_group_key(&group_expr, select, &ctes)?;
        branches.push((classified.kind, group_key));
        Ok(())
    })?;

    let mut branches = branches.into_iter();
    let Some((kind, group_key)) = branches.next() else {
        return Err(GraphloadError::UnrecognizedStatement);
    };
    for (branch_kind, branch_key) in branches {
        if branch_kind != kind {
            return Err(GraphloadError::MixedStatementBranches {
                detail: format!("{kind} branch combined with {branch_kind} branch"),
            });
        }
        if branch_key != group_key {
            return Err(GraphloadError::MixedStatementBranches {
                detail: format!("group keys `{group_key}` and `{branch_key}`"),
            });
        }
    }

    Ok(RewriteResult {
        statement: query,
        kind,
        group_key,
        identity_columns: kind.identity_columns(),
    })
}

/// Column rewriting only: no key resolution, dedup or coercion.
pub(crate) fn rewrite_statement_columns(statement: Statement) -> Result<Query, GraphloadError> {
    let mut query = into_query(statement)?;
    rewrite_query_selects(&mut query, &mut |select| rewrite_select(select).map(|_| ()))?;
    Ok(query)
}

fn into_query(statement: Statement) -> Result<Query, GraphloadError> {
    match statement {
        Statement::Query(query) => Ok(*query),
        other => Err(GraphloadError::UnsupportedStatement {
            statement: other.to_string(),
        }),
    }
}
