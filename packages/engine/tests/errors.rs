mod support;

use graphload_engine::{
    rewrite_statements, ErrorKind, EvalError, GraphloadError, RewriteConfig, TypeMap,
};
use support::{rewrite, rewrite_with_types, shop_sim_sql, sim_point_sql};

#[test]
fn malformed_sql_is_a_parse_error() {
    let error = rewrite("SELECT (point_id FROM t").expect_err("parse error");
    assert_eq!(error.kind(), ErrorKind::Parse);
    assert_eq!(error.code(), "GRAPHLOAD_ERROR_PARSE");
}

#[test]
fn non_query_statements_are_rejected() {
    let error = rewrite("CREATE TABLE t (id INT)").expect_err("ddl");
    assert!(matches!(error, GraphloadError::UnsupportedStatement { .. }));
    assert_eq!(error.kind(), ErrorKind::Classification);
    assert!(error.to_string().starts_with("unexpected statement type"));
}

#[test]
fn statement_without_conventional_columns_is_rejected() {
    let error = rewrite("SELECT a, b FROM t").expect_err("unrecognized");
    assert_eq!(
        error.to_string(),
        "statement does not contain recognizable point or edge columns"
    );
    assert_eq!(
        rewrite_statements("SELECT a FROM t", false),
        Err(GraphloadError::UnrecognizedStatement)
    );
}

#[test]
fn partial_edge_columns_name_what_is_present() {
    let error = rewrite("SELECT a AS point1_id, b AS point2_id, 'x' AS point2_type FROM t")
        .expect_err("partial edge");
    assert_eq!(
        error.to_string(),
        "missing required edge columns: point1_id=true point2_id=true point1_type=false point2_type=true"
    );
}

#[test]
fn partial_point_columns_are_rejected() {
    let error = rewrite("SELECT sim_id AS point_id, cnt FROM t").expect_err("partial point");
    assert_eq!(
        error,
        GraphloadError::MissingPointColumns {
            point_id: true,
            point_type: false,
        }
    );
}

#[test]
fn unbound_type_expression_is_a_resolution_error() {
    let error = rewrite("SELECT sim_id AS point_id, upper(kind) AS point_type FROM t WHERE kind = 'sim'")
        .expect_err("unsupported expression");
    assert_eq!(error.kind(), ErrorKind::Resolution);
    assert_eq!(
        error,
        GraphloadError::UnresolvedGroupType {
            expression: "upper(kind)".to_string(),
            reason: EvalError::UnsupportedExpression("upper(kind)".to_string()),
        }
    );
}

#[test]
fn multi_valued_in_list_names_candidates() {
    let error = rewrite("SELECT sim_id AS point_id, kind AS point_type FROM t WHERE kind IN ('sim', 'shop')")
        .expect_err("ambiguous type");
    assert_eq!(
        error.to_string(),
        "cannot resolve group type from `kind`: column `kind` may take several values [sim, shop]"
    );
}

#[test]
fn union_branches_with_different_keys_are_rejected() {
    let error = rewrite(
        "SELECT id AS point_id, 'sim' AS point_type FROM a \
         UNION ALL SELECT id AS point_id, 'shop' AS point_type FROM b",
    )
    .expect_err("mixed branches");
    assert!(matches!(error, GraphloadError::MixedStatementBranches { .. }));
}

#[test]
fn points_and_edges_cannot_share_a_key() {
    let batch = format!(
        "{};\nSELECT sim_id AS point_id, 'shop_sim' AS point_type FROM t",
        shop_sim_sql()
    );
    let error = rewrite(&batch).expect_err("identity mismatch");
    assert_eq!(error.kind(), ErrorKind::Consistency);
    assert!(matches!(
        error,
        GraphloadError::IdentityColumnMismatch { ref group_key, .. } if group_key == "shop_sim"
    ));
}

#[test]
fn one_bad_statement_aborts_the_batch() {
    let batch = format!("{};\nSELECT a FROM t", sim_point_sql());
    assert_eq!(rewrite(&batch), Err(GraphloadError::UnrecognizedStatement));
}

#[test]
fn wildcard_projection_cannot_be_deduplicated() {
    let error = rewrite("SELECT sim_id AS point_id, 'sim' AS point_type, t.* FROM t")
        .expect_err("wildcard");
    assert!(matches!(error, GraphloadError::UnsupportedProjection { .. }));
}

#[test]
fn unparsable_type_is_a_configuration_error() {
    let mut type_map = TypeMap::new();
    type_map.insert("sim", "prod_cnt", "big int)");
    let error = rewrite_with_types(&sim_point_sql(), &type_map).expect_err("bad type");
    assert_eq!(error.kind(), ErrorKind::Configuration);
    assert!(matches!(error, GraphloadError::InvalidTypeMap { .. }));

    assert!(matches!(
        RewriteConfig::from_json_str(r#"{"pretty": "yes"}"#),
        Err(GraphloadError::InvalidConfig { .. })
    ));
}
