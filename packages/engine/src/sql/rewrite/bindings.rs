use std::collections::HashMap;

use sqlparser::ast::{BinaryOperator, Expr};

use crate::sql::ast::{column_reference_name, string_literal_value, unwrap_wrappers};

/// Column → string literal pinned by a WHERE clause. Lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    /// Keeps the first literal seen for a column.
    pub(crate) fn bind(&mut self, column: &str, value: &str) {
        self.values
            .entry(column.to_ascii_lowercase())
            .or_insert_with(|| value.to_string());
    }

    pub(crate) fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(&column.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

/// Collects every column constrained to a single string literal by an
/// equality or a one-element IN list under the top-level AND chain.
pub(crate) fn collect_bindings(selection: Option<&Expr>) -> Bindings {
    let mut bindings = Bindings::default();
    if let Some(expr) = selection {
        collect_bindings_from_expr(expr, &mut bindings);
    }
    bindings
}

fn collect_bindings_from_expr(expr: &Expr, bindings: &mut Bindings) {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            collect_bindings_from_expr(left, bindings);
            collect_bindings_from_expr(right, bindings);
        }
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => {
            if let (Some(column), Some(value)) = (
                column_reference_name(unwrap_wrappers(left)),
                string_literal_value(right),
            ) {
                bindings.bind(column, &value);
            } else if let (Some(column), Some(value)) = (
                column_reference_name(unwrap_wrappers(right)),
                string_literal_value(left),
            ) {
                bindings.bind(column, &value);
            }
        }
        Expr::InList {
            expr,
            list,
            negated: false,
        } if list.len() == 1 => {
            if let (Some(column), Some(value)) = (
                column_reference_name(unwrap_wrappers(expr)),
                string_literal_value(&list[0]),
            ) {
                bindings.bind(column, &value);
            }
        }
        Expr::Nested(inner) => collect_bindings_from_expr(inner, bindings),
        _ => {}
    }
}

/// Every literal `column` may take under `selection`, including multi-valued
/// IN lists and OR branches. `None` when the predicate does not pin the column.
pub(crate) fn literal_candidates(selection: Option<&Expr>, column: &str) -> Option<Vec<String>> {
    selection.and_then(|expr| literal_candidates_from_expr(expr, column))
}

fn literal_candidates_from_expr(expr: &Expr, column: &str) -> Option<Vec<String>> {
    let is_target_column = |expr: &Expr| {
        column_reference_name(unwrap_wrappers(expr))
            .is_some_and(|name| name.eq_ignore_ascii_case(column))
    };
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => {
            if is_target_column(left) {
                return string_literal_value(right).map(|value| vec![value]);
            }
            if is_target_column(right) {
                return string_literal_value(left).map(|value| vec![value]);
            }
            None
        }
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => match (
            literal_candidates_from_expr(left, column),
            literal_candidates_from_expr(right, column),
        ) {
            (Some(left), Some(right)) => {
                let intersection = intersect_strings(&left, &right);
                if intersection.is_empty() {
                    None
                } else {
                    Some(intersection)
                }
            }
            (Some(values), None) | (None, Some(values)) => Some(values),
            (None, None) => None,
        },
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Or,
            right,
        } => match (
            literal_candidates_from_expr(left, column),
            literal_candidates_from_expr(right, column),
        ) {
            (Some(left), Some(right)) => Some(union_strings(&left, &right)),
            _ => None,
        },
        Expr::InList {
            expr,
            list,
            negated: false,
        } => {
            if !is_target_column(expr) {
                return None;
            }
            let mut values = Vec::with_capacity(list.len());
            for item in list {
                values.push(string_literal_value(item)?);
            }
            if values.is_empty() {
                None
            } else {
                Some(dedup_strings(values))
            }
        }
        Expr::Nested(inner) => literal_candidates_from_expr(inner, column),
        _ => None,
    }
}

fn dedup_strings(values: Vec<String>) -> Vec<String> {
    let mut out = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn union_strings(left: &[String], right: &[String]) -> Vec<String> {
    let mut out = left.to_vec();
    for value in right {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

fn intersect_strings(left: &[String], right: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for value in left {
        if right.contains(value) && !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}
