use sqlparser::ast::{
    DataType, Expr, ObjectName, ObjectNamePart, Query, Select, SelectItem, SetExpr, Statement,
    Value, ValueWithSpan,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

use crate::GraphloadError;

pub(crate) fn parse_sql_statements(sql: &str) -> Result<Vec<Statement>, GraphloadError> {
    Parser::parse_sql(&GenericDialect {}, sql).map_err(GraphloadError::from)
}

pub(crate) fn parse_data_type(type_name: &str) -> Result<DataType, GraphloadError> {
    let dialect = GenericDialect {};
    let mut parser = Parser::new(&dialect).try_with_sql(type_name)?;
    let data_type = parser.parse_data_type()?;
    if parser.peek_token().token != Token::EOF {
        return Err(GraphloadError::parse(format!(
            "unexpected input after type `{data_type}` in `{type_name}`"
        )));
    }
    Ok(data_type)
}

pub(crate) fn render_query(query: &Query, pretty: bool) -> String {
    if pretty {
        format!("{query:#}")
    } else {
        query.to_string()
    }
}

pub(crate) fn object_name_matches(name: &ObjectName, target: &str) -> bool {
    name.0
        .last()
        .and_then(ObjectNamePart::as_ident)
        .map(|ident| ident.value.eq_ignore_ascii_case(target))
        .unwrap_or(false)
}

pub(crate) fn string_literal_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => string_value(value),
        _ => None,
    }
}

pub(crate) fn string_value(value: &Value) -> Option<String> {
    value.clone().into_string()
}

/// Last identifier of a column reference, qualified or not.
pub(crate) fn column_reference_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.as_str()),
        Expr::CompoundIdentifier(idents) => idents.last().map(|ident| ident.value.as_str()),
        _ => None,
    }
}

/// Peels cast and parenthesis wrappers.
pub(crate) fn unwrap_wrappers(mut expr: &Expr) -> &Expr {
    loop {
        match expr {
            Expr::Cast { expr: inner, .. } | Expr::Nested(inner) => expr = inner,
            _ => return expr,
        }
    }
}

/// Name a projection item is matched by: its alias, else an unqualified bare
/// column. Lower-cased.
pub(crate) fn alias_or_column_name(item: &SelectItem) -> Option<String> {
    match item {
        SelectItem::ExprWithAlias { alias, .. } => Some(alias.value.to_ascii_lowercase()),
        SelectItem::UnnamedExpr(Expr::Identifier(ident)) => Some(ident.value.to_ascii_lowercase()),
        _ => None,
    }
}

pub(crate) fn derive_alias_from_expr(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_ascii_lowercase()),
        Expr::Cast { expr, .. } | Expr::Nested(expr) => derive_alias_from_expr(expr),
        _ => None,
    }
}

/// `base`, or the first `base_<n>` (n >= 1) that `taken` rejects.
pub(crate) fn fresh_alias(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|suffix| format!("{base}_{suffix}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_default()
}

/// Output column name a projection item exposes to an enclosing query.
pub(crate) fn projected_name(item: &SelectItem) -> Option<String> {
    match item {
        SelectItem::ExprWithAlias { alias, .. } => Some(alias.value.clone()),
        SelectItem::UnnamedExpr(expr) => column_reference_name(expr).map(str::to_string),
        _ => None,
    }
}

/// Applies `rewrite_select` to every top-level SELECT of a statement: the
/// plain body, each UNION branch and parenthesized queries. Subqueries in FROM
/// are left alone.
pub(crate) fn rewrite_query_selects(
    query: &mut Query,
    rewrite_select: &mut dyn FnMut(&mut Select) -> Result<(), GraphloadError>,
) -> Result<(), GraphloadError> {
    rewrite_selects_in_set_expr(query.body.as_mut(), rewrite_select)
}

fn rewrite_selects_in_set_expr(
    set_expr: &mut SetExpr,
    rewrite_select: &mut dyn FnMut(&mut Select) -> Result<(), GraphloadError>,
) -> Result<(), GraphloadError> {
    match set_expr {
        SetExpr::Select(select) => rewrite_select(select.as_mut()),
        SetExpr::Query(query) => rewrite_selects_in_set_expr(query.body.as_mut(), rewrite_select),
        SetExpr::SetOperation { left, right, .. } => {
            rewrite_selects_in_set_expr(left.as_mut(), rewrite_select)?;
            rewrite_selects_in_set_expr(right.as_mut(), rewrite_select)
        }
        other => Err(GraphloadError::UnsupportedStatement {
            statement: other.to_string(),
        }),
    }
}

/// Leftmost SELECT of a statement body.
pub(crate) fn first_select(set_expr: &SetExpr) -> Option<&Select> {
    match set_expr {
        SetExpr::Select(select) => Some(select.as_ref()),
        SetExpr::Query(query) => first_select(query.body.as_ref()),
        SetExpr::SetOperation { left, .. } => first_select(left.as_ref()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use sqlparser::ast::{Query, SelectItem, Statement};

    use super::{
        alias_or_column_name, derive_alias_from_expr, first_select, parse_data_type,
        parse_sql_statements, rewrite_query_selects, unwrap_wrappers,
    };

    fn parse_query(sql: &str) -> Query {
        let mut statements = parse_sql_statements(sql).expect("parse SQL");
        assert_eq!(statements.len(), 1);
        match statements.remove(0) {
            Statement::Query(query) => *query,
            other => panic!("expected query, got {other:?}"),
        }
    }

    fn projection(sql: &str) -> Vec<SelectItem> {
        let query = parse_query(sql);
        first_select(query.body.as_ref())
            .expect("select")
            .projection
            .clone()
    }

    #[test]
    fn parses_multiple_statements_and_skips_empty_ones() {
        let statements =
            parse_sql_statements("SELECT 1 AS a;; SELECT 2 AS b;").expect("parse SQL");
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn parse_error_is_reported() {
        let error = parse_sql_statements("SELECT (1 FROM t").expect_err("should fail");
        assert!(error.to_string().starts_with("failed to parse SQL"));
    }

    #[test]
    fn alias_wins_over_column_name() {
        let items = projection("SELECT Point_ID, src AS POINT_TYPE, t.point_id, 1 FROM t");
        let names: Vec<_> = items.iter().map(alias_or_column_name).collect();
        assert_eq!(
            names,
            vec![
                Some("point_id".to_string()),
                Some("point_type".to_string()),
                None,
                None
            ]
        );
    }

    #[test]
    fn derives_alias_through_cast_and_parens() {
        let items = projection("SELECT cast((weight) as float), a + b FROM t");
        let SelectItem::UnnamedExpr(first) = &items[0] else {
            panic!("expected unnamed expr");
        };
        let SelectItem::UnnamedExpr(second) = &items[1] else {
            panic!("expected unnamed expr");
        };
        assert_eq!(derive_alias_from_expr(first), Some("weight".to_string()));
        assert_eq!(derive_alias_from_expr(second), None);
        assert_eq!(unwrap_wrappers(first).to_string(), "weight");
    }

    #[test]
    fn rewrites_every_union_branch() {
        let mut query = parse_query("SELECT a FROM t UNION ALL (SELECT b FROM u)");
        let mut count = 0usize;
        rewrite_query_selects(&mut query, &mut |select| {
            select.distinct = None;
            count += 1;
            Ok(())
        })
        .expect("rewrite should succeed");
        assert_eq!(count, 2);
    }

    #[test]
    fn parses_scalar_type_names() {
        assert_eq!(parse_data_type("string").expect("type").to_string(), "STRING");
        assert_eq!(
            parse_data_type("DECIMAL(10, 2)").expect("type").to_string(),
            "DECIMAL(10,2)"
        );
        assert!(parse_data_type("string)").is_err());
    }
}
