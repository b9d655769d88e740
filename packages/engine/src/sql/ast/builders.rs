use sqlparser::ast::helpers::attached_token::AttachedToken;
use sqlparser::ast::{
    BinaryOperator, CastKind, DataType, Expr, Function, FunctionArg, FunctionArgExpr,
    FunctionArgumentList, FunctionArguments, GroupByExpr, Ident, ObjectName, ObjectNamePart,
    OrderByExpr, OrderByOptions, Query, Select, SelectFlavor, SelectItem, SetExpr, SetOperator,
    SetQuantifier, TableAlias, TableFactor, TableWithJoins, Value, WindowSpec, WindowType,
};

pub(crate) fn select_query_from_parts(
    projection: Vec<SelectItem>,
    from: Vec<TableWithJoins>,
    selection: Option<Expr>,
) -> Query {
    query_from_body(SetExpr::Select(Box::new(Select {
        select_token: AttachedToken::empty(),
        distinct: None,
        top: None,
        top_before_distinct: false,
        projection,
        exclude: None,
        into: None,
        from,
        lateral_views: Vec::new(),
        prewhere: None,
        selection,
        group_by: GroupByExpr::Expressions(Vec::new(), Vec::new()),
        cluster_by: Vec::new(),
        distribute_by: Vec::new(),
        sort_by: Vec::new(),
        having: None,
        named_window: Vec::new(),
        qualify: None,
        window_before_qualify: false,
        value_table_mode: None,
        connect_by: None,
        flavor: SelectFlavor::Standard,
    })))
}

pub(crate) fn query_from_body(body: SetExpr) -> Query {
    Query {
        with: None,
        body: Box::new(body),
        order_by: None,
        limit_clause: None,
        fetch: None,
        locks: Vec::new(),
        for_clause: None,
        settings: None,
        format_clause: None,
        pipe_operators: Vec::new(),
    }
}

/// Chains branches left-deep with `UNION ALL`. Returns `None` for no branches.
pub(crate) fn union_all(branches: Vec<SetExpr>) -> Option<SetExpr> {
    let mut iter = branches.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |left, right| SetExpr::SetOperation {
        op: SetOperator::Union,
        set_quantifier: SetQuantifier::All,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

pub(crate) fn derived_table(subquery: Query, alias: &str) -> TableWithJoins {
    TableWithJoins {
        relation: TableFactor::Derived {
            lateral: false,
            subquery: Box::new(subquery),
            alias: Some(explicit_alias(alias)),
        },
        joins: Vec::new(),
    }
}

fn explicit_alias(name: &str) -> TableAlias {
    TableAlias {
        explicit: true,
        name: Ident::new(name),
        columns: Vec::new(),
    }
}

#[cfg(test)]
pub(crate) fn select_ident(name: &str) -> SelectItem {
    SelectItem::UnnamedExpr(expr_ident(name))
}

pub(crate) fn select_alias(expr: Expr, alias: &str) -> SelectItem {
    SelectItem::ExprWithAlias {
        expr,
        alias: Ident::new(alias),
    }
}

pub(crate) fn expr_ident(name: &str) -> Expr {
    Expr::Identifier(Ident::new(name))
}

pub(crate) fn expr_string(value: &str) -> Expr {
    Expr::Value(Value::SingleQuotedString(value.to_string()).into())
}

pub(crate) fn expr_int(value: i64) -> Expr {
    Expr::Value(Value::Number(value.to_string(), false).into())
}

pub(crate) fn eq_expr(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOperator::Eq,
        right: Box::new(right),
    }
}

pub(crate) fn cast_expr(expr: Expr, data_type: DataType) -> Expr {
    Expr::Cast {
        kind: CastKind::Cast,
        expr: Box::new(expr),
        data_type,
        format: None,
    }
}

pub(crate) fn function_expr(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function(function_call(name, args, None))
}

/// `row_number() OVER (PARTITION BY <columns> ORDER BY 1)`
pub(crate) fn row_number_partitioned_expr(partition_columns: &[String]) -> Expr {
    Expr::Function(function_call(
        "row_number",
        Vec::new(),
        Some(WindowType::WindowSpec(WindowSpec {
            window_name: None,
            partition_by: partition_columns
                .iter()
                .map(|column| expr_ident(column))
                .collect(),
            order_by: vec![OrderByExpr {
                expr: expr_int(1),
                options: OrderByOptions::default(),
                with_fill: None,
            }],
            window_frame: None,
        })),
    ))
}

fn function_call(name: &str, args: Vec<Expr>, over: Option<WindowType>) -> Function {
    Function {
        name: ObjectName(vec![ObjectNamePart::Identifier(Ident::new(name))]),
        uses_odbc_syntax: false,
        parameters: FunctionArguments::None,
        args: FunctionArguments::List(FunctionArgumentList {
            duplicate_treatment: None,
            args: args
                .into_iter()
                .map(|arg| FunctionArg::Unnamed(FunctionArgExpr::Expr(arg)))
                .collect(),
            clauses: Vec::new(),
        }),
        filter: None,
        null_treatment: None,
        over,
        within_group: Vec::new(),
    }
}
