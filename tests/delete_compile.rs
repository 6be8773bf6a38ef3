use tidedb::catalog::{CollectionOptions, Namespace, TimeseriesOptions};
use tidedb::config::TideConfig;
use tidedb::delete::{DeleteCompiler, DeleteRequest, YieldPolicy};
use tidedb::query::collation::CollationSpec;
use tidedb::query::context::RuntimeConstants;
use tidedb::query::expr::{field, lit, Order};
use tidedb::query::QueryError;

fn ns() -> Namespace {
    Namespace::new("app", "events")
}

fn plain_collection() -> CollectionOptions {
    CollectionOptions::new(ns())
}

fn ts_collection() -> CollectionOptions {
    CollectionOptions::new(ns())
        .with_timeseries(TimeseriesOptions::new("ts").with_meta_field("sensor"))
}

#[test]
fn simple_id_delete_skips_canonicalization() {
    let request = DeleteRequest::new(ns()).where_(field("_id").eq(lit(5)));
    let collection = plain_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    compiler.parse().expect("parse");
    assert!(!compiler.has_canonical_query());
    assert_eq!(compiler.yield_policy(), YieldPolicy::YieldAuto);
    assert_eq!(
        compiler.expression_context().map(|ctx| ctx.nodes_counted()),
        Some(0)
    );
}

#[test]
fn general_predicate_produces_a_normalized_canonical_query() {
    let request = DeleteRequest::new(ns())
        .where_(field("level").eq(lit("warn")).and(field("age").gt(lit(30))))
        .multi();
    let collection = plain_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    compiler.parse().expect("parse");
    assert!(compiler.has_canonical_query());
    let query = compiler.release_canonical_query();
    assert_eq!(query.namespace(), &ns());
    // Operand order is deterministic regardless of how the request wrote it.
    assert_eq!(
        query.filter(),
        Some(&field("level").eq(lit("warn")).and(field("age").gt(lit(30))))
    );
    assert!(query.limit().is_none());
}

#[test]
fn canonical_query_is_released_exactly_once() {
    let request = DeleteRequest::new(ns()).where_(field("a").gte(lit(1)));
    let collection = plain_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    compiler.parse().expect("parse");
    assert!(compiler.has_canonical_query());
    let _query = compiler.release_canonical_query();
    assert!(!compiler.has_canonical_query());
}

#[test]
fn single_delete_with_sort_carries_limit_one() {
    let request = DeleteRequest::new(ns())
        .where_(field("age").gt(lit(30)))
        .sort_by("age", Order::Desc);
    let collection = plain_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    compiler.parse().expect("parse");
    let query = compiler.release_canonical_query();
    assert_eq!(query.limit(), Some(1));
    assert_eq!(query.sort(), &[("age".to_string(), Order::Desc)]);
}

#[test]
fn multi_delete_with_sort_has_no_limit() {
    let request = DeleteRequest::new(ns())
        .where_(field("age").gt(lit(30)))
        .sort_by("age", Order::Desc)
        .multi();
    let collection = plain_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    compiler.parse().expect("parse");
    let query = compiler.release_canonical_query();
    assert!(query.limit().is_none());
}

#[test]
fn sorted_single_delete_on_timeseries_is_rejected() {
    let request = DeleteRequest::new(ns())
        .where_(field("temp").gt(lit(100)))
        .sort_by("ts", Order::Asc);
    let collection = ts_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, true, &config);

    let err = compiler.parse().unwrap_err();
    assert!(matches!(err, QueryError::InvalidOptions { .. }));
    assert!(!compiler.has_canonical_query());
}

#[test]
fn timeseries_delete_filters_on_the_bucket_expression() {
    let request = DeleteRequest::new(ns()).where_(field("sensor").eq(lit("s-1"))).multi();
    let collection = ts_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, true, &config);

    compiler.parse().expect("parse");
    let exprs = compiler.timeseries_exprs().expect("split").clone();
    assert!(exprs.residual_expr.is_none());
    let query = compiler.release_canonical_query();
    // The canonical filter is the (normalized) bucket-level expression, not
    // the user predicate.
    let rendered = format!("{:?}", query.filter().expect("filter"));
    assert!(rendered.contains("control.closed"));
    assert!(rendered.contains("meta"));
}

#[test]
fn malformed_predicate_is_rejected_on_the_timeseries_path_too() {
    let request = DeleteRequest::new(ns()).where_(field("temp").in_(vec![])).multi();
    let collection = ts_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, true, &config);

    let err = compiler.parse().unwrap_err();
    assert!(matches!(err, QueryError::InvalidQuery { .. }));
    assert!(!compiler.has_canonical_query());
}

#[test]
fn eligibility_for_arbitrary_timeseries_deletes() {
    let collection = ts_collection();
    let config = TideConfig::default();

    let with_residual = DeleteRequest::new(ns()).where_(field("temp").gt(lit(100))).multi();
    let compiler = DeleteCompiler::new(&with_residual, &collection, true, &config);
    assert!(compiler.is_eligible_for_arbitrary_timeseries_delete());

    let exact_multi = DeleteRequest::new(ns()).where_(field("sensor").eq(lit("A"))).multi();
    let compiler = DeleteCompiler::new(&exact_multi, &collection, true, &config);
    assert!(!compiler.is_eligible_for_arbitrary_timeseries_delete());

    let exact_single = DeleteRequest::new(ns()).where_(field("sensor").eq(lit("A")));
    let compiler = DeleteCompiler::new(&exact_single, &collection, true, &config);
    assert!(compiler.is_eligible_for_arbitrary_timeseries_delete());

    let not_timeseries = DeleteRequest::new(ns()).where_(field("temp").gt(lit(100)));
    let plain = plain_collection();
    let compiler = DeleteCompiler::new(&not_timeseries, &plain, false, &config);
    assert!(!compiler.is_eligible_for_arbitrary_timeseries_delete());
}

#[test]
fn unknown_collation_surfaces_as_a_query_error() {
    let request = DeleteRequest::new(ns())
        .where_(field("a").eq(lit(1)))
        .collation(CollationSpec::new("zz_ZZ"));
    let collection = plain_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    let err = compiler.parse().unwrap_err();
    assert_eq!(
        err,
        QueryError::UnknownCollation {
            locale: "zz_ZZ".into()
        }
    );
}

#[test]
fn collation_mismatch_with_default_is_recorded_on_the_context() {
    let request = DeleteRequest::new(ns())
        .where_(field("name").eq(lit("ada")))
        .collation(CollationSpec::new("fr"));
    let collection = plain_collection().with_default_collation(CollationSpec::new("en"));
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    compiler.parse().expect("parse");
    let ctx = compiler.expression_context().expect("context");
    assert!(!ctx.collation_matches_default());
    assert!(ctx.collator().is_some());
}

#[test]
fn runtime_constants_and_let_bindings_flow_through() {
    let constants = RuntimeConstants {
        local_now_ms: 1_700_000_000_000,
        cluster_time: 42,
    };
    let mut bindings = tidedb::query::LetBindings::new();
    bindings.insert("threshold".into(), lit(100));

    let request = DeleteRequest::new(ns())
        .where_(field("temp").gt(lit(100)))
        .runtime_constants(constants)
        .let_bindings(bindings.clone())
        .multi();
    let collection = plain_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    compiler.parse().expect("parse");
    let query = compiler.release_canonical_query();
    assert_eq!(query.runtime_constants(), Some(&constants));
    assert_eq!(query.let_bindings(), Some(&bindings));
}

#[test]
fn explain_flag_is_preserved_on_the_canonical_query() {
    let request = DeleteRequest::new(ns()).where_(field("a").eq(lit(1))).explain();
    let collection = plain_collection();
    let config = TideConfig::default();
    let mut compiler = DeleteCompiler::new(&request, &collection, false, &config);

    compiler.parse().expect("parse");
    assert!(compiler.release_canonical_query().is_explain());
}

#[test]
fn identical_predicates_share_a_query_shape() {
    let collection = plain_collection();
    let config = TideConfig::default();

    let first = DeleteRequest::new(ns()).where_(field("temp").gt(lit(10))).multi();
    let mut compiler = DeleteCompiler::new(&first, &collection, false, &config);
    compiler.parse().expect("parse");
    let shape_a = compiler.release_canonical_query().shape().hash_hex().to_string();

    let second = DeleteRequest::new(ns()).where_(field("temp").gt(lit(9999))).multi();
    let mut compiler = DeleteCompiler::new(&second, &collection, false, &config);
    compiler.parse().expect("parse");
    let shape_b = compiler.release_canonical_query().shape().hash_hex().to_string();

    assert_eq!(shape_a, shape_b);
}
