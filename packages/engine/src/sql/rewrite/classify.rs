use std::fmt;

use sqlparser::ast::{DataType, Expr, Ident, Select, SelectItem};

use crate::sql::ast::{
    alias_or_column_name, cast_expr, derive_alias_from_expr, expr_string, fresh_alias,
    function_expr, projected_name, select_alias,
};
use crate::GraphloadError;

const EDGE_IDENTITY_COLUMNS: &[&str] = &["outv_pk_prop", "bg__id", "outv_label", "bg__bg__label"];
const POINT_IDENTITY_COLUMNS: &[&str] = &["id", "label"];
const EDGE_LABEL_COLUMN: &str = "label";

// Legacy columns with no output meaning.
const EDGE_DROPPED_COLUMNS: &[&str] = &["value", "ts_us"];
const POINT_DROPPED_COLUMNS: &[&str] = &["point_value"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum StatementKind {
    Edge,
    Point,
}

impl StatementKind {
    pub(crate) fn identity_columns(self) -> Vec<String> {
        let columns = match self {
            Self::Edge => EDGE_IDENTITY_COLUMNS,
            Self::Point => POINT_IDENTITY_COLUMNS,
        };
        columns.iter().map(|column| column.to_string()).collect()
    }

    /// Projection column whose value decides the output group.
    pub(crate) fn group_column(self) -> &'static str {
        match self {
            Self::Edge => "edge_type",
            Self::Point => "point_type",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edge => write!(f, "edge"),
            Self::Point => write!(f, "point"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClassifiedSelect {
    pub(crate) kind: StatementKind,
    /// Expression projected as `edge_type` / `point_type`, before relabeling.
    pub(crate) group_expr: Option<Expr>,
}

/// Rewrites the projection of `select` into the edge or point layout.
pub(crate) fn rewrite_select(select: &mut Select) -> Result<ClassifiedSelect, GraphloadError> {
    if let Some(classified) = rewrite_edge_select(select)? {
        return Ok(classified);
    }
    if let Some(classified) = rewrite_point_select(select)? {
        return Ok(classified);
    }
    Err(GraphloadError::UnrecognizedStatement)
}

fn rewrite_edge_select(select: &mut Select) -> Result<Option<ClassifiedSelect>, GraphloadError> {
    let mut point1_id = None;
    let mut point2_id = None;
    let mut point1_type = None;
    let mut point2_type = None;
    let mut remaining = Vec::new();
    for item in select.projection.iter().cloned() {
        match alias_or_column_name(&item).as_deref() {
            Some("point1_id") => point1_id = item_expr(item),
            Some("point2_id") => point2_id = item_expr(item),
            Some("point1_type") => point1_type = item_expr(item),
            Some("point2_type") => point2_type = item_expr(item),
            Some(name) if EDGE_DROPPED_COLUMNS.contains(&name) => {}
            _ => remaining.push(item),
        }
    }
    let (point1_id, point2_id, point1_type, point2_type) =
        match (point1_id, point2_id, point1_type, point2_type) {
            (None, None, None, None) => return Ok(None),
            (Some(point1_id), Some(point2_id), Some(point1_type), Some(point2_type)) => {
                (point1_id, point2_id, point1_type, point2_type)
            }
            (point1_id, point2_id, point1_type, point2_type) => {
                return Err(GraphloadError::MissingEdgeColumns {
                    point1_id: point1_id.is_some(),
                    point2_id: point2_id.is_some(),
                    point1_type: point1_type.is_some(),
                    point2_type: point2_type.is_some(),
                })
            }
        };

    let mut projection = vec![
        select_alias(
            function_expr(
                "named_struct",
                vec![expr_string("id"), cast_expr(point1_id, DataType::String(None))],
            ),
            "outv_pk_prop",
        ),
        select_alias(cast_expr(point2_id, DataType::String(None)), "bg__id"),
        select_alias(point1_type, "outv_label"),
        select_alias(point2_type, "bg__bg__label"),
    ];

    let mut group_expr = None;
    let mut label_position = None;
    for item in remaining {
        if alias_or_column_name(&item).as_deref() == Some("edge_type") {
            group_expr = item_expr(item.clone());
            label_position = Some(projection.len());
            projection.push(with_alias(item, EDGE_LABEL_COLUMN));
            continue;
        }
        projection.push(with_derived_alias(item));
    }
    if let Some(label_position) = label_position {
        yield_label_column(&mut projection, label_position);
    }

    select.projection = projection;
    Ok(Some(ClassifiedSelect {
        kind: StatementKind::Edge,
        group_expr,
    }))
}

fn rewrite_point_select(select: &mut Select) -> Result<Option<ClassifiedSelect>, GraphloadError> {
    let mut point_id = None;
    let mut point_type = None;
    let mut remaining = Vec::new();
    for item in select.projection.iter().cloned() {
        match alias_or_column_name(&item).as_deref() {
            Some("point_id") => point_id = item_expr(item),
            Some("point_type") => point_type = item_expr(item),
            Some(name) if POINT_DROPPED_COLUMNS.contains(&name) => {}
            _ => remaining.push(item),
        }
    }
    let (point_id, point_type) = match (point_id, point_type) {
        (None, None) => return Ok(None),
        (Some(point_id), Some(point_type)) => (point_id, point_type),
        (point_id, point_type) => {
            return Err(GraphloadError::MissingPointColumns {
                point_id: point_id.is_some(),
                point_type: point_type.is_some(),
            })
        }
    };

    let mut projection = vec![
        select_alias(point_type.clone(), "label"),
        select_alias(cast_expr(point_id, DataType::String(None)), "id"),
    ];
    projection.extend(remaining);

    select.projection = projection;
    Ok(Some(ClassifiedSelect {
        kind: StatementKind::Point,
        group_expr: Some(point_type),
    }))
}

/// The renamed `edge_type` owns the `label` output; other items named
/// `label` move to `label_<n>`.
fn yield_label_column(projection: &mut [SelectItem], label_position: usize) {
    let output_name = |item: &SelectItem| projected_name(item).map(|name| name.to_ascii_lowercase());
    let mut names: Vec<String> = projection.iter().filter_map(output_name).collect();
    for (position, item) in projection.iter_mut().enumerate() {
        if position == label_position || output_name(item).as_deref() != Some(EDGE_LABEL_COLUMN) {
            continue;
        }
        let alias = fresh_alias(EDGE_LABEL_COLUMN, |candidate| {
            names.iter().any(|name| name.eq_ignore_ascii_case(candidate))
        });
        *item = with_alias(item.clone(), &alias);
        names.push(alias);
    }
}

fn item_expr(item: SelectItem) -> Option<Expr> {
    match item {
        SelectItem::ExprWithAlias { expr, .. } | SelectItem::UnnamedExpr(expr) => Some(expr),
        _ => None,
    }
}

fn with_alias(item: SelectItem, alias: &str) -> SelectItem {
    match item {
        SelectItem::ExprWithAlias { expr, .. } | SelectItem::UnnamedExpr(expr) => {
            select_alias(expr, alias)
        }
        other => other,
    }
}

fn with_derived_alias(item: SelectItem) -> SelectItem {
    match item {
        SelectItem::UnnamedExpr(expr) => match derive_alias_from_expr(&expr) {
            Some(alias) => SelectItem::ExprWithAlias {
                expr,
                alias: Ident::new(alias),
            },
            None => SelectItem::UnnamedExpr(expr),
        },
        other => other,
    }
}
