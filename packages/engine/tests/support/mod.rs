#![allow(dead_code)]

use std::collections::BTreeMap;

use graphload_engine::{rewrite_batch, GraphloadError, GroupOutput, RewriteConfig, TypeMap};

pub const GRAPH_TABLE: &str = "dm_temai.shop_gandalf_v1_3_graph_structure_di";
pub const SIM_FEATURE_TABLE: &str = "dm_temai.sim_product_feature_aggregation_new_df";

pub const EDGE_IDENTITY_PREFIX: &str =
    "SELECT outv_pk_prop, bg__id, outv_label, bg__bg__label, label";
pub const EDGE_PARTITION: &str =
    "row_number() OVER (PARTITION BY outv_pk_prop, bg__id, outv_label, bg__bg__label ORDER BY 1)";
pub const POINT_PARTITION: &str = "row_number() OVER (PARTITION BY id, label ORDER BY 1)";

/// Edge extraction statement in the layout produced by the graph build jobs:
/// an outer DISTINCT over a subquery naming every conventional column.
/// With `reversed`, the source table's `src` feeds `point2_id`.
pub fn edge_sql(
    reversed: bool,
    point1_type: &str,
    point2_type: &str,
    edge_type: &str,
    source_edge_type: &str,
) -> String {
    let (src_alias, tgt_alias) = if reversed {
        ("point2_id", "point1_id")
    } else {
        ("point1_id", "point2_id")
    };
    format!(
        "SELECT  DISTINCT point1_id,
        point2_id,
        point1_type,
        point2_type,
        value,
        ts_us,
        edge_type,
        cast(order_rate_weight as float)
FROM    (
        SELECT  src AS {src_alias},
                tgt AS {tgt_alias},
                '{point1_type}' AS point1_type,
                '{point2_type}' AS point2_type,
                '' AS value,
                (UNIX_TIMESTAMP() * 1000000) AS ts_us,
                '{edge_type}' AS edge_type,
                ratio_src AS order_rate_weight
        FROM    {GRAPH_TABLE}
        WHERE   date = max_pt('{GRAPH_TABLE}')
        AND     edge_type = '{source_edge_type}'
        ) a"
    )
}

pub fn shop_sim_sql() -> String {
    edge_sql(false, "shop", "sim", "shop_sim", "shop_sell_sim_1d")
}

pub fn sim_author_sql() -> String {
    edge_sql(true, "sim", "author", "sim_author", "author_sell_sim_1d")
}

/// The four statements of a typical edge batch, `;`-separated.
pub fn edge_batch_sql() -> String {
    [
        edge_sql(false, "shop", "sim", "shop_sim", "shop_sell_sim_1d"),
        edge_sql(true, "sim", "shop", "sim_shop", "shop_sell_sim_1d"),
        edge_sql(false, "author", "sim", "author_sim", "author_sell_sim_1d"),
        edge_sql(true, "sim", "author", "sim_author", "author_sell_sim_1d"),
    ]
    .join(";\n\n")
        + ";"
}

pub fn sim_point_sql() -> String {
    format!(
        "SELECT
  sim_id as point_id,
  'sim' as point_type,
  sim_id as point_value,
  prod_cnt,
  second_cid_new,
  shop_cnt,
  ecqc_refuse_ratio,
  cast(ecqc_refuse_task_cnt as double),
  tcs_refuse_ratio,
  prod_set
FROM
  {SIM_FEATURE_TABLE}
WHERE
  date = max_pt('{SIM_FEATURE_TABLE}')"
    )
}

pub fn rewrite(sql: &str) -> Result<BTreeMap<String, GroupOutput>, GraphloadError> {
    rewrite_batch(sql, &TypeMap::new(), &RewriteConfig::default())
}

pub fn rewrite_with_types(
    sql: &str,
    type_map: &TypeMap,
) -> Result<BTreeMap<String, GroupOutput>, GraphloadError> {
    rewrite_batch(sql, type_map, &RewriteConfig::default())
}

pub fn group_sql<'a>(outputs: &'a BTreeMap<String, GroupOutput>, group_key: &str) -> &'a str {
    outputs
        .get(group_key)
        .map(|output| output.sql.as_str())
        .unwrap_or_else(|| panic!("missing group `{group_key}` in {:?}", outputs.keys()))
}
