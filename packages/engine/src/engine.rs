use std::collections::BTreeMap;

use log::debug;
use sqlparser::ast::Query;

use crate::sql::ast::{parse_sql_statements, render_query};
use crate::sql::rewrite::{
    consolidate_group, rewrite_statement, rewrite_statement_columns, CoercionPlan, GroupSet,
};
use crate::{GraphloadError, GroupOutput, RewriteConfig, TypeMap};

/// Rewrites a batch of extraction statements into one deduplicated load
/// statement per group key.
///
/// Any failure aborts the batch. Input with no statements yields an empty map.
pub fn rewrite_batch(
    sql: &str,
    type_map: &TypeMap,
    config: &RewriteConfig,
) -> Result<BTreeMap<String, GroupOutput>, GraphloadError> {
    let statements = parse_sql_statements(sql)?;
    debug!("parsed {} statement(s)", statements.len());

    let mut groups = GroupSet::default();
    for (index, statement) in statements.into_iter().enumerate() {
        let result = rewrite_statement(statement)?;
        debug!(
            "statement {index}: {} for group `{}`",
            result.kind, result.group_key
        );
        groups.insert(result)?;
    }
    debug!("grouped statements into {} group(s)", groups.len());

    let mut outputs = BTreeMap::new();
    for (group_key, mut members) in groups.into_groups() {
        let plan = CoercionPlan::new(&group_key, type_map.columns(&group_key))?;
        for member in &mut members {
            plan.apply(&mut member.statement)?;
        }
        let consolidated = consolidate_group(&group_key, members)?;
        let sql = render_output(&consolidated, config.pretty);
        outputs.insert(group_key, GroupOutput::new(sql));
    }
    Ok(outputs)
}

/// Column rewriting of each statement on its own, joined with `";\n"`.
pub fn rewrite_statements(sql: &str, pretty: bool) -> Result<String, GraphloadError> {
    let mut rendered = Vec::new();
    for statement in parse_sql_statements(sql)? {
        let query = rewrite_statement_columns(statement)?;
        rendered.push(render_query(&query, pretty));
    }
    Ok(rendered.join(";\n"))
}

// Downstream loaders expect double-quoted string literals.
fn render_output(query: &Query, pretty: bool) -> String {
    let mut sql = render_query(query, pretty).replace('\'', "\"");
    sql.push(';');
    sql
}
