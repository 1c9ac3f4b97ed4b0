//! CLI command tests

use crate::common::{v, CliTestRunner};
use tabmerge::{MergeConfig, MergeError, MergeReport};

#[test]
fn test_merge_command_with_flags() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&[
        "merge",
        "--table-a",
        "customers_a",
        "--table-b",
        "customers_b",
        "--output",
        "customers_merged",
        "--key",
        "code",
        "--strategy",
        "prefer-b",
        "--no-progress",
    ]);

    let fixture = runner.fixture();
    assert_eq!(fixture.count("customers_merged").unwrap(), 5);
    let row = fixture.output_row("customers_merged", "code", "C003");
    assert_eq!(row["name"], v("Caroline"));
}

#[test]
fn test_merge_command_writes_report_file() {
    let runner = CliTestRunner::new().unwrap();
    let report_path = runner.fixture().root().join("report.json");
    let report_arg = report_path.to_string_lossy().to_string();

    runner.expect_success(&[
        "merge",
        "--table-a",
        "customers_a",
        "--table-b",
        "customers_b",
        "--output",
        "customers_merged",
        "--key",
        "code",
        "--json",
        "--report",
        &report_arg,
    ]);

    let content = std::fs::read_to_string(&report_path).unwrap();
    let report: MergeReport = serde_json::from_str(&content).unwrap();
    assert_eq!(report.counts.total_c, 5);
    assert_eq!(report.counts.conflict_use_a, 1);
}

#[test]
fn test_merge_command_from_config_file_with_override() {
    let runner = CliTestRunner::new().unwrap();
    let config_path = runner.fixture().root().join("merge.json");
    let mut config = MergeConfig::new("customers_a", "customers_b", "from_file", vec!["code".to_string()]);
    config.ignore_fields_b = vec!["city".to_string()];
    config.write_to(&config_path).unwrap();
    let config_arg = config_path.to_string_lossy().to_string();

    runner.expect_success(&["merge", "--config", &config_arg, "--output", "from_flag", "--no-progress"]);

    let fixture = runner.fixture();
    assert_eq!(fixture.count("from_flag").unwrap(), 5);
    // city ignored on B, so C005 has none
    let row = fixture.output_row("from_flag", "code", "C005");
    assert_eq!(row["city"], None);
}

#[test]
fn test_merge_command_requires_key() {
    let runner = CliTestRunner::new().unwrap();
    let err = runner.expect_failure(&[
        "merge",
        "--table-a",
        "customers_a",
        "--table-b",
        "customers_b",
        "--output",
        "customers_merged",
    ]);
    assert!(matches!(err, MergeError::Config { .. }));
}

#[test]
fn test_merge_command_rejects_output_equal_to_input() {
    let runner = CliTestRunner::new().unwrap();
    let err = runner.expect_failure(&[
        "merge",
        "--table-a",
        "customers_a",
        "--table-b",
        "customers_b",
        "--output",
        "customers_a",
        "--key",
        "code",
    ]);
    assert!(matches!(err, MergeError::Config { .. }));
    // Input table untouched
    assert_eq!(runner.fixture().count("customers_a").unwrap(), 4);
}

#[test]
fn test_unknown_strategy_is_rejected_by_parser() {
    let runner = CliTestRunner::new().unwrap();
    let err = runner.expect_failure(&[
        "merge",
        "--table-a",
        "customers_a",
        "--table-b",
        "customers_b",
        "--output",
        "c",
        "--key",
        "code",
        "--strategy",
        "coin-flip",
    ]);
    assert!(err.to_string().contains("coin-flip"));
}

#[test]
fn test_columns_command() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["columns", "customers_a"]);
    runner.expect_success(&["columns", "customers_b", "--json"]);

    let err = runner.expect_failure(&["columns", "no_such_table"]);
    assert!(matches!(err, MergeError::Schema { .. }));
}

#[test]
fn test_init_config_command() {
    let runner = CliTestRunner::new().unwrap();
    let path = runner.fixture().root().join("tabmerge.json");
    let path_arg = path.to_string_lossy().to_string();

    runner.expect_success(&["init-config", &path_arg]);
    let template = MergeConfig::from_file(&path).unwrap();
    assert_eq!(template.dsn, "{TABMERGE_DB}");
    assert_eq!(template.batch_size(), 500);

    let err = runner.expect_failure(&["init-config", &path_arg]);
    assert!(matches!(err, MergeError::Config { .. }));
    runner.expect_success(&["init-config", &path_arg, "--force"]);
}
