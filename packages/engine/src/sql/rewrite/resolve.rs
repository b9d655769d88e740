use log::debug;
use sqlparser::ast::{Cte, Expr, Query, Select, SelectItem, TableFactor};

use crate::sql::ast::{
    column_reference_name, first_select, object_name_matches, projected_name,
    string_literal_value, unwrap_wrappers,
};
use crate::sql::rewrite::bindings::{collect_bindings, literal_candidates};
use crate::sql::rewrite::evaluate::{evaluate_string_expr, EvalError};
use crate::GraphloadError;

/// Resolves the group-defining expression of `select` to a literal.
///
/// Order: direct literal, constant folding against the WHERE bindings of
/// `select`, then (for a bare column) the projection of the FROM subqueries
/// and CTEs that produce that column, each resolved in its own scope. `ctes`
/// are the WITH bindings visible to `select`.
pub(crate) fn resolve_group_key(
    expr: &Expr,
    select: &Select,
    ctes: &[Cte],
) -> Result<String, GraphloadError> {
    if let Some(value) = string_literal_value(expr) {
        return Ok(value);
    }

    let bindings = collect_bindings(select.selection.as_ref());
    let mut reason = match evaluate_string_expr(expr, &bindings) {
        Ok(value) => {
            debug!(
                "resolved group key `{value}` from `{expr}` with {} WHERE binding(s)",
                bindings.len()
            );
            return Ok(value);
        }
        Err(reason) => reason,
    };

    if let Some(column) = column_reference_name(unwrap_wrappers(expr)) {
        if let Some(value) = resolve_from_sources(select, column, ctes)? {
            debug!("resolved group key `{value}` for column `{column}` from a FROM source");
            return Ok(value);
        }
        if let Some(candidates) = literal_candidates(select.selection.as_ref(), column) {
            if candidates.len() > 1 {
                reason = EvalError::AmbiguousColumn {
                    column: column.to_string(),
                    candidates,
                };
            }
        }
    }

    Err(GraphloadError::UnresolvedGroupType {
        expression: expr.to_string(),
        reason,
    })
}

fn resolve_from_sources(
    select: &Select,
    column: &str,
    ctes: &[Cte],
) -> Result<Option<String>, GraphloadError> {
    for table in &select.from {
        if let Some(value) = resolve_from_table_factor(&table.relation, column, ctes)? {
            return Ok(Some(value));
        }
        for join in &table.joins {
            if let Some(value) = resolve_from_table_factor(&join.relation, column, ctes)? {
                return Ok(Some(value));
            }
        }
    }
    Ok(None)
}

fn resolve_from_table_factor(
    relation: &TableFactor,
    column: &str,
    ctes: &[Cte],
) -> Result<Option<String>, GraphloadError> {
    match relation {
        TableFactor::Derived { subquery, .. } => resolve_from_query(subquery, column, ctes),
        TableFactor::Table { name, .. } => {
            // A CTE may only refer to the bindings declared before it.
            let position = ctes
                .iter()
                .rposition(|cte| object_name_matches(name, &cte.alias.name.value));
            match position {
                Some(index) => resolve_from_query(&ctes[index].query, column, &ctes[..index]),
                None => Ok(None),
            }
        }
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            if let Some(value) =
                resolve_from_table_factor(&table_with_joins.relation, column, ctes)?
            {
                return Ok(Some(value));
            }
            for join in &table_with_joins.joins {
                if let Some(value) = resolve_from_table_factor(&join.relation, column, ctes)? {
                    return Ok(Some(value));
                }
            }
            Ok(None)
        }
        _ => Ok(None),
    }
}

fn resolve_from_query(
    query: &Query,
    column: &str,
    ctes: &[Cte],
) -> Result<Option<String>, GraphloadError> {
    let mut scope = ctes.to_vec();
    if let Some(with) = &query.with {
        scope.extend(with.cte_tables.iter().cloned());
    }
    let Some(select) = first_select(query.body.as_ref()) else {
        return Ok(None);
    };

    for item in &select.projection {
        let matches = projected_name(item).is_some_and(|name| name.eq_ignore_ascii_case(column));
        if !matches {
            continue;
        }
        if let SelectItem::ExprWithAlias { expr, .. } | SelectItem::UnnamedExpr(expr) = item {
            return resolve_group_key(expr, select, &scope).map(Some);
        }
    }

    let has_wildcard = select.projection.iter().any(|item| {
        matches!(
            item,
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..)
        )
    });
    if has_wildcard {
        return resolve_from_sources(select, column, &scope);
    }
    Ok(None)
}
