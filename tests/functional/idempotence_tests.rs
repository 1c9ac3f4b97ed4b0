//! Re-running a merge over unchanged inputs

use crate::common::{customer_config, TestFixture};
use tabmerge::ConflictStrategy;

#[test]
fn test_rerun_yields_same_counts_and_rows() {
    let fixture = TestFixture::with_customers().unwrap();
    let config = customer_config(ConflictStrategy::PreferB);

    let first = fixture.merge(&config).unwrap();
    let first_rows = fixture.output_rows("customers_merged").unwrap();

    let second = fixture.merge(&config).unwrap();
    let second_rows = fixture.output_rows("customers_merged").unwrap();

    assert_eq!(first.counts, second.counts);
    assert_eq!(first_rows, second_rows);
    // The output table is recreated, not appended to
    assert_eq!(fixture.count("customers_merged").unwrap(), 5);
}

#[test]
fn test_surrogate_ids_restart_on_rerun() {
    let fixture = TestFixture::with_customers().unwrap();
    let config = customer_config(ConflictStrategy::PreferA);
    fixture.merge(&config).unwrap();
    fixture.merge(&config).unwrap();

    let store = fixture.open().unwrap();
    let (min_id, max_id): (i64, i64) = store
        .connection()
        .query_row("SELECT MIN(id), MAX(id) FROM customers_merged", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!((min_id, max_id), (1, 5));
}

#[test]
fn test_report_json_round_trips() {
    let fixture = TestFixture::with_customers().unwrap();
    let report = fixture.merge(&customer_config(ConflictStrategy::PreferA)).unwrap();

    let json = tabmerge::output::JsonFormatter::format(&report).unwrap();
    let parsed: tabmerge::MergeReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);
}
