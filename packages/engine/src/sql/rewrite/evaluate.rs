use sqlparser::ast::{
    BinaryOperator, Expr, FunctionArg, FunctionArgExpr, FunctionArguments, ValueWithSpan,
};
use thiserror::Error;

use crate::sql::ast::{column_reference_name, object_name_matches, string_value};
use crate::sql::rewrite::bindings::Bindings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("column `{0}` is not bound to a string literal")]
    UnboundColumn(String),
    #[error("unsupported expression `{0}`")]
    UnsupportedExpression(String),
    #[error("column `{0}` is not projected")]
    MissingColumn(String),
    #[error("column `{column}` may take several values [{}]", .candidates.join(", "))]
    AmbiguousColumn {
        column: String,
        candidates: Vec<String>,
    },
}

/// Folds a string-valued expression to a constant using `bindings` for column
/// references. Concatenation is applied left to right.
pub(crate) fn evaluate_string_expr(expr: &Expr, bindings: &Bindings) -> Result<String, EvalError> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => {
            string_value(value).ok_or_else(|| EvalError::UnsupportedExpression(expr.to_string()))
        }
        Expr::Identifier(_) | Expr::CompoundIdentifier(_) => {
            let column = column_reference_name(expr).unwrap_or_default();
            bindings
                .get(column)
                .map(str::to_string)
                .ok_or_else(|| EvalError::UnboundColumn(column.to_string()))
        }
        Expr::Nested(inner) | Expr::Cast { expr: inner, .. } => evaluate_string_expr(inner, bindings),
        Expr::BinaryOp {
            left,
            op: BinaryOperator::StringConcat | BinaryOperator::Plus,
            right,
        } => {
            let mut value = evaluate_string_expr(left, bindings)?;
            value.push_str(&evaluate_string_expr(right, bindings)?);
            Ok(value)
        }
        Expr::Function(function) if object_name_matches(&function.name, "concat") => {
            if function.over.is_some() {
                return Err(EvalError::UnsupportedExpression(expr.to_string()));
            }
            let FunctionArguments::List(list) = &function.args else {
                return Err(EvalError::UnsupportedExpression(expr.to_string()));
            };
            let mut value = String::new();
            for arg in &list.args {
                let FunctionArg::Unnamed(FunctionArgExpr::Expr(arg)) = arg else {
                    return Err(EvalError::UnsupportedExpression(expr.to_string()));
                };
                value.push_str(&evaluate_string_expr(arg, bindings)?);
            }
            Ok(value)
        }
        _ => Err(EvalError::UnsupportedExpression(expr.to_string())),
    }
}
