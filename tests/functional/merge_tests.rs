//! End-to-end merges over the sample customer tables

use crate::common::{customer_config, v, TestFixture};
use tabmerge::ConflictStrategy;

#[test]
fn test_report_counts_for_prefer_a() {
    let fixture = TestFixture::with_customers().unwrap();
    let report = fixture.merge(&customer_config(ConflictStrategy::PreferA)).unwrap();
    let c = report.counts;

    assert_eq!(c.total_a, 4);
    assert_eq!(c.total_b, 4);
    assert_eq!(c.total_c, 5);
    assert_eq!(c.exact_match, 1);
    assert_eq!(c.only_in_a, 1);
    assert_eq!(c.only_in_b, 1);
    assert_eq!(c.conflict, 2);
    assert_eq!(c.null_auto_filled, 1);
    assert_eq!(c.conflict_use_a, 1);
    assert_eq!(c.conflict_use_b, 0);
    assert_eq!(fixture.count("customers_merged").unwrap(), 5);
}

#[test]
fn test_output_layout_drops_source_id_and_appends_provenance() {
    let fixture = TestFixture::with_customers().unwrap();
    fixture.merge(&customer_config(ConflictStrategy::PreferA)).unwrap();

    assert_eq!(
        fixture.column_names("customers_merged").unwrap(),
        vec!["id", "code", "name", "email", "city", "phone", "score", "source", "conflict", "diff_fields"]
    );
}

#[test]
fn test_output_row_order_is_a_then_b_only() {
    let fixture = TestFixture::with_customers().unwrap();
    fixture.merge(&customer_config(ConflictStrategy::PreferA)).unwrap();

    let codes: Vec<_> = fixture
        .output_rows("customers_merged")
        .unwrap()
        .into_iter()
        .map(|r| r["code"].clone())
        .collect();
    assert_eq!(codes, vec![v("C001"), v("C002"), v("C003"), v("C004"), v("C005")]);
}

#[test]
fn test_only_in_a_preserves_values() {
    let fixture = TestFixture::with_customers().unwrap();
    fixture.merge(&customer_config(ConflictStrategy::PreferA)).unwrap();

    let row = fixture.output_row("customers_merged", "code", "C004");
    assert_eq!(row["name"], v("Dave"));
    assert_eq!(row["phone"], None);
    assert_eq!(row["score"], v("40"));
    assert_eq!(row["source"], v("A"));
    assert_eq!(row["conflict"], v("0"));
    assert_eq!(row["diff_fields"], None);
}

#[test]
fn test_only_in_b_projects_shared_fields() {
    let fixture = TestFixture::with_customers().unwrap();
    let mut config = customer_config(ConflictStrategy::PreferA);
    config.ignore_fields_b = vec!["email".to_string()];
    fixture.merge(&config).unwrap();

    let row = fixture.output_row("customers_merged", "code", "C005");
    assert_eq!(row["name"], v("Eve"));
    assert_eq!(row["city"], v("Metz"));
    assert_eq!(row["score"], v("50"));
    // Ignored on B
    assert_eq!(row["email"], None);
    // Not in B's schema
    assert_eq!(row["phone"], None);
    assert_eq!(row["source"], v("B"));
    assert_eq!(row["conflict"], v("0"));
    assert_eq!(row["diff_fields"], None);
}

#[test]
fn test_exact_match_with_nulls_on_both_sides() {
    let fixture = TestFixture::with_customers().unwrap();
    fixture.merge(&customer_config(ConflictStrategy::PreferB)).unwrap();

    let row = fixture.output_row("customers_merged", "code", "C001");
    assert_eq!(row["source"], v("A"));
    assert_eq!(row["conflict"], v("0"));
    assert_eq!(row["diff_fields"], None);
    assert_eq!(row["phone"], None);
}

#[test]
fn test_null_in_a_is_auto_filled_from_b() {
    let fixture = TestFixture::with_customers().unwrap();
    fixture.merge(&customer_config(ConflictStrategy::PreferA)).unwrap();

    let row = fixture.output_row("customers_merged", "code", "C002");
    assert_eq!(row["email"], v("bob@example.com"));
    assert_eq!(row["source"], v("MERGE_A"));
    assert_eq!(row["conflict"], v("1"));
    assert_eq!(row["diff_fields"], v("email"));
    // Not in B's schema, so untouched
    assert_eq!(row["phone"], v("555-0101"));
}

#[test]
fn test_prefer_b_takes_contested_but_keeps_auto_kept_a() {
    let fixture = TestFixture::with_customers().unwrap();
    let report = fixture.merge(&customer_config(ConflictStrategy::PreferB)).unwrap();

    let row = fixture.output_row("customers_merged", "code", "C003");
    assert_eq!(row["name"], v("Caroline"));
    // B's city is empty, A's value stays
    assert_eq!(row["city"], v("Nice"));
    assert_eq!(row["source"], v("MERGE_B"));
    assert_eq!(row["conflict"], v("1"));
    assert_eq!(row["diff_fields"], v("name,city"));
    assert_eq!(report.counts.conflict_use_b, 1);
    assert_eq!(report.counts.conflict_use_a, 0);
}

#[test]
fn test_prefer_a_keeps_contested() {
    let fixture = TestFixture::with_customers().unwrap();
    fixture.merge(&customer_config(ConflictStrategy::PreferA)).unwrap();

    let row = fixture.output_row("customers_merged", "code", "C003");
    assert_eq!(row["name"], v("Carol"));
    assert_eq!(row["source"], v("MERGE_A"));
    assert_eq!(row["diff_fields"], v("name,city"));
}

#[test]
fn test_ignored_a_field_is_written_but_not_compared() {
    let fixture = TestFixture::with_customers().unwrap();
    let mut config = customer_config(ConflictStrategy::PreferB);
    config.ignore_fields_a = vec!["name".to_string()];
    let report = fixture.merge(&config).unwrap();

    let row = fixture.output_row("customers_merged", "code", "C003");
    assert_eq!(row["name"], v("Carol"));
    assert_eq!(row["diff_fields"], v("city"));
    assert_eq!(row["source"], v("MERGE_A"));
    assert_eq!(report.counts.conflict_use_b, 0);
}

#[test]
fn test_duplicate_keys_in_b_keep_last_loaded_row() {
    let fixture = TestFixture::with_customers().unwrap();
    fixture
        .exec("INSERT INTO customers_b VALUES ('C001', 'Alicia', 'alice@example.com', 'Paris', 10, 'gold');")
        .unwrap();
    let report = fixture.merge(&customer_config(ConflictStrategy::PreferB)).unwrap();

    // The later C001 row replaced the identical one
    let row = fixture.output_row("customers_merged", "code", "C001");
    assert_eq!(row["name"], v("Alicia"));
    assert_eq!(row["source"], v("MERGE_B"));
    assert_eq!(report.counts.exact_match, 0);
    assert_eq!(report.counts.only_in_b, 1);
    assert_eq!(report.counts.total_b, 5);
}

#[test]
fn test_composite_keys() {
    let fixture = TestFixture::new().unwrap();
    fixture
        .exec(
            "CREATE TABLE stock_a (site VARCHAR, sku VARCHAR, qty INTEGER);
             CREATE TABLE stock_b (site VARCHAR, sku VARCHAR, qty INTEGER);
             INSERT INTO stock_a VALUES ('north', 'x1', 5), ('south', 'x1', 7);
             INSERT INTO stock_b VALUES ('north', 'x1', 5), ('south', 'x1', 9), ('east', 'x1', 1);",
        )
        .unwrap();

    let mut config = tabmerge::MergeConfig::new("stock_a", "stock_b", "stock_c", vec!["site".into(), "sku".into()]);
    config.strategy = ConflictStrategy::PreferB;
    let report = fixture.merge(&config).unwrap();

    assert_eq!(report.counts.exact_match, 1);
    assert_eq!(report.counts.conflict_use_b, 1);
    assert_eq!(report.counts.only_in_b, 1);
    let south = fixture.output_row("stock_c", "site", "south");
    assert_eq!(south["qty"], v("9"));
}

#[test]
fn test_batch_size_does_not_change_output() {
    let fixture = TestFixture::with_customers().unwrap();
    let mut config = customer_config(ConflictStrategy::PreferA);
    config.batch_size = Some(2);
    let small = fixture.merge(&config).unwrap();
    let small_rows = fixture.output_rows("customers_merged").unwrap();

    config.batch_size = Some(0);
    let default = fixture.merge(&config).unwrap();
    let default_rows = fixture.output_rows("customers_merged").unwrap();

    assert_eq!(small.counts, default.counts);
    assert_eq!(small_rows, default_rows);
}
