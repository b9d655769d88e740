use std::collections::BTreeMap;

use log::debug;
use sqlparser::ast::{DataType, Expr, Ident, Query, Select, SelectItem};

use crate::sql::ast::{
    cast_expr, column_reference_name, parse_data_type, projected_name, rewrite_query_selects,
    unwrap_wrappers,
};
use crate::GraphloadError;

/// Casts resolved from one group's type map entry, keyed by lower-cased
/// output column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CoercionPlan {
    casts: BTreeMap<String, DataType>,
}

impl CoercionPlan {
    pub(crate) fn new(
        group_key: &str,
        columns: Option<&BTreeMap<String, String>>,
    ) -> Result<Self, GraphloadError> {
        let mut casts = BTreeMap::new();
        for (column, type_name) in columns.into_iter().flatten() {
            let data_type =
                parse_data_type(type_name).map_err(|error| GraphloadError::InvalidTypeMap {
                    group_key: group_key.to_string(),
                    column: column.clone(),
                    type_name: type_name.clone(),
                    message: error.to_string(),
                })?;
            casts.insert(column.to_ascii_lowercase(), data_type);
        }
        Ok(Self { casts })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.casts.is_empty()
    }

    /// Casts every mapped column of every top-level SELECT of `query`.
    /// Returns the number of projection items rewritten.
    pub(crate) fn apply(&self, query: &mut Query) -> Result<usize, GraphloadError> {
        if self.is_empty() {
            return Ok(0);
        }
        let mut coerced = 0;
        rewrite_query_selects(query, &mut |select| {
            coerced += self.apply_to_select(select);
            Ok(())
        })?;
        debug!("coerced {coerced} projection item(s)");
        Ok(coerced)
    }

    pub(crate) fn apply_to_select(&self, select: &mut Select) -> usize {
        let mut coerced = 0;
        for item in &mut select.projection {
            let Some(name) = coerced_name(item) else {
                continue;
            };
            let Some(data_type) = self.casts.get(&name.to_ascii_lowercase()) else {
                continue;
            };
            let expr = match item {
                SelectItem::ExprWithAlias { expr, .. } | SelectItem::UnnamedExpr(expr) => {
                    strip_casts(expr.clone())
                }
                _ => continue,
            };
            *item = SelectItem::ExprWithAlias {
                expr: cast_expr(expr, data_type.clone()),
                alias: Ident::new(name),
            };
            coerced += 1;
        }
        coerced
    }
}

/// Output name of a projection item, looking through casts of a bare column.
fn coerced_name(item: &SelectItem) -> Option<String> {
    projected_name(item).or_else(|| match item {
        SelectItem::UnnamedExpr(expr) => {
            column_reference_name(unwrap_wrappers(expr)).map(str::to_string)
        }
        _ => None,
    })
}

/// Peels existing casts, including parenthesized ones.
fn strip_casts(mut expr: Expr) -> Expr {
    loop {
        match expr {
            Expr::Cast { expr: inner, .. } | Expr::Nested(inner) => expr = *inner,
            other => return other,
        }
    }
}
