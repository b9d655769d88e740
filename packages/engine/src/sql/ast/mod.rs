mod builders;
mod utils;

pub(crate) use builders::{
    cast_expr, derived_table, eq_expr, expr_ident, expr_int, expr_string, function_expr,
    query_from_body, row_number_partitioned_expr, select_alias, select_query_from_parts,
    union_all,
};
pub(crate) use utils::{
    alias_or_column_name, column_reference_name, derive_alias_from_expr, first_select,
    fresh_alias, object_name_matches, parse_data_type, parse_sql_statements, projected_name,
    render_query, rewrite_query_selects, string_literal_value, string_value, unwrap_wrappers,
};
