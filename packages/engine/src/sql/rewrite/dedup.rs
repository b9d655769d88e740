use log::info;
use sqlparser::ast::{Expr, Ident, Query, Select, SelectItem, SetExpr};

use crate::sql::ast::{
    column_reference_name, derived_table, eq_expr, expr_ident, expr_int, fresh_alias,
    query_from_body, rewrite_query_selects, row_number_partitioned_expr, select_alias,
    select_query_from_parts, union_all, unwrap_wrappers,
};
use crate::sql::rewrite::statement::RewriteResult;
use crate::GraphloadError;

const ROW_NUMBER_ALIAS: &str = "rn";
const SOURCE_ALIAS: &str = "src";
const RANKED_ALIAS: &str = "ranked";

/// Builds the single output statement of a group: the members, unioned when
/// there are several, reduced to one row per identity-column tuple.
///
/// ```sql
/// SELECT <columns> FROM (
///   SELECT <columns>, row_number() OVER (PARTITION BY <identity> ORDER BY 1) AS rn
///   FROM (<member> UNION ALL <member> ...) AS src
/// ) AS ranked WHERE rn = 1
/// ```
pub(crate) fn consolidate_group(
    group_key: &str,
    members: Vec<RewriteResult>,
) -> Result<Query, GraphloadError> {
    let Some(identity_columns) = members.first().map(|first| first.identity_columns.clone())
    else {
        return Err(GraphloadError::UnrecognizedStatement);
    };
    let member_count = members.len();

    let mut expected: Option<Vec<Ident>> = None;
    let mut statements = Vec::with_capacity(member_count);
    for mut member in members {
        rewrite_query_selects(&mut member.statement, &mut |select| {
            select.distinct = None;
            name_projection(select)
        })?;
        let names = member_output_names(&member);
        match &expected {
            None => expected = Some(names),
            Some(expected) if same_names(expected, &names) => {}
            Some(expected) => {
                return Err(GraphloadError::OutputColumnMismatch {
                    group_key: group_key.to_string(),
                    expected: ident_values(expected),
                    found: ident_values(&names),
                })
            }
        }
        statements.push(member.statement);
    }
    let columns = expected.unwrap_or_default();

    let mut hoisted_with = None;
    let source = if member_count == 1 {
        let mut statement = statements.remove(0);
        hoisted_with = statement.with.take();
        statement
    } else {
        let branches = statements.into_iter().map(union_branch).collect();
        match union_all(branches) {
            Some(body) => query_from_body(body),
            None => return Err(GraphloadError::UnrecognizedStatement),
        }
    };

    let row_number_alias = row_number_alias(&columns);
    let mut ranked_projection: Vec<SelectItem> = columns
        .iter()
        .map(|column| SelectItem::UnnamedExpr(Expr::Identifier(column.clone())))
        .collect();
    ranked_projection.push(select_alias(
        row_number_partitioned_expr(&identity_columns),
        &row_number_alias,
    ));
    let ranked = select_query_from_parts(
        ranked_projection,
        vec![derived_table(source, SOURCE_ALIAS)],
        None,
    );

    let mut outer = select_query_from_parts(
        columns
            .iter()
            .map(|column| SelectItem::UnnamedExpr(Expr::Identifier(column.clone())))
            .collect(),
        vec![derived_table(ranked, RANKED_ALIAS)],
        Some(eq_expr(expr_ident(&row_number_alias), expr_int(1))),
    );
    outer.with = hoisted_with;

    info!(
        "consolidated group `{group_key}`: {member_count} statement(s), union={}",
        member_count > 1
    );
    Ok(outer)
}

/// Gives every projection item a distinct output name. Items with no
/// derivable name get `_c<position>`; a name already used earlier in the
/// projection moves to `<name>_<n>`, so identity columns keep theirs.
fn name_projection(select: &mut Select) -> Result<(), GraphloadError> {
    let mut seen: Vec<String> = Vec::with_capacity(select.projection.len());
    for (position, item) in select.projection.iter_mut().enumerate() {
        let (expr, current) = match &*item {
            SelectItem::ExprWithAlias { expr, alias } => (expr, Some(alias.value.clone())),
            SelectItem::UnnamedExpr(expr) => {
                let current = match expr {
                    Expr::Identifier(ident) => Some(ident.value.clone()),
                    Expr::CompoundIdentifier(idents) => {
                        idents.last().map(|ident| ident.value.clone())
                    }
                    _ => None,
                };
                (expr, current)
            }
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                return Err(GraphloadError::UnsupportedProjection {
                    item: item.to_string(),
                    reason: "wildcard output columns cannot be deduplicated".to_string(),
                });
            }
        };
        let base = current.clone().unwrap_or_else(|| {
            column_reference_name(unwrap_wrappers(expr))
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(|| format!("_c{position}"))
        });
        let name = fresh_alias(&base, |candidate| {
            seen.iter().any(|name| name.eq_ignore_ascii_case(candidate))
        });
        if current.as_deref() != Some(name.as_str()) {
            *item = select_alias(expr.clone(), &name);
        }
        seen.push(name);
    }
    Ok(())
}

/// Output names of a member, taken from its leftmost SELECT as UNION does.
fn member_output_names(member: &RewriteResult) -> Vec<Ident> {
    let Some(select) = member.base_select() else {
        return Vec::new();
    };
    select
        .projection
        .iter()
        .filter_map(|item| match item {
            SelectItem::ExprWithAlias { alias, .. } => Some(alias.clone()),
            SelectItem::UnnamedExpr(Expr::Identifier(ident)) => Some(ident.clone()),
            SelectItem::UnnamedExpr(Expr::CompoundIdentifier(idents)) => idents.last().cloned(),
            _ => None,
        })
        .collect()
}

fn same_names(left: &[Ident], right: &[Ident]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(left, right)| left.value.eq_ignore_ascii_case(&right.value))
}

fn ident_values(idents: &[Ident]) -> Vec<String> {
    idents.iter().map(|ident| ident.value.clone()).collect()
}

fn row_number_alias(columns: &[Ident]) -> String {
    fresh_alias(ROW_NUMBER_ALIAS, |candidate| {
        columns
            .iter()
            .any(|column| column.value.eq_ignore_ascii_case(candidate))
    })
}

/// Plain SELECT bodies join the union directly; anything carrying WITH,
/// ORDER BY, LIMIT or its own set operation stays parenthesized.
fn union_branch(statement: Query) -> SetExpr {
    let is_plain = statement.with.is_none()
        && statement.order_by.is_none()
        && statement.limit_clause.is_none()
        && statement.fetch.is_none()
        && matches!(statement.body.as_ref(), SetExpr::Select(_));
    if is_plain {
        *statement.body
    } else {
        SetExpr::Query(Box::new(statement))
    }
}
