// Phase 1: 設定ファイル解析テスト (RED)

use std::io::Write;

use imageflow_bridge::config::load_settings_for_queries;
use imageflow_bridge::config::merged::MergedQuery;
use imageflow_bridge::config::query::{QueryFile, validate_endpoint};
use imageflow_bridge::config::settings::{Settings, parse_abi_version};

// ============================================================
// 1. ABIバージョンパーサ
// ============================================================

#[test]
fn test_parse_abi_version_basic() {
    let result = parse_abi_version("3.0").expect("should parse version pair");
    assert_eq!(result, (3, 0));
}

#[test]
fn test_parse_abi_version_whitespace() {
    let result = parse_abi_version("  3.1  ").expect("should ignore surrounding whitespace");
    assert_eq!(result, (3, 1));
}

#[test]
fn test_parse_abi_version_missing_dot() {
    let result = parse_abi_version("3");
    assert!(result.is_err(), "should fail without a minor component");
}

#[test]
fn test_parse_abi_version_non_numeric() {
    let result = parse_abi_version("three.zero");
    assert!(result.is_err(), "should fail on non-numeric input");
}

#[test]
fn test_parse_abi_version_negative() {
    let result = parse_abi_version("-1.0");
    assert!(result.is_err(), "should fail on negative major");
}

#[test]
fn test_parse_abi_version_empty_string() {
    let result = parse_abi_version("");
    assert!(result.is_err(), "should fail on empty string");
}

// ============================================================
// 2. Settings 構造体のデシリアライズ
// ============================================================

#[test]
fn test_settings_full_yaml() {
    let yaml = r#"
abi_version: "3.1"
pretty: false
expect_status: 404
halt_on_error: false
"#;
    let settings = Settings::from_yaml(yaml).expect("should parse full YAML");
    assert_eq!(settings.abi_version, "3.1");
    assert!(!settings.pretty);
    assert_eq!(settings.expect_status, 404);
    assert!(!settings.halt_on_error);
}

#[test]
fn test_settings_empty_yaml() {
    // 空YAML（"{}" はserde_ymlで空のマッピングを意味する）
    let settings = Settings::from_yaml("{}").expect("should use defaults for empty YAML");
    assert_eq!(settings.abi_version, "3.0");
    assert!(settings.pretty);
    assert_eq!(settings.expect_status, 200);
    assert!(settings.halt_on_error);
}

#[test]
fn test_settings_partial_yaml() {
    let yaml = r#"
pretty: false
"#;
    let settings = Settings::from_yaml(yaml).expect("should fill missing with defaults");
    assert!(!settings.pretty);
    // 残りはデフォルト値
    assert_eq!(settings.abi_version, "3.0");
    assert_eq!(settings.expect_status, 200);
    assert!(settings.halt_on_error);
}

#[test]
fn test_settings_abi_pair_default() {
    let settings = Settings::default();
    assert_eq!(settings.abi_pair().expect("default pair parses"), (3, 0));
}

#[test]
fn test_settings_abi_pair_invalid() {
    let settings = Settings::from_yaml("abi_version: \"latest\"").expect("parse");
    assert!(settings.abi_pair().is_err());
}

// ============================================================
// 3. Query 構造体のデシリアライズ
// ============================================================

#[test]
fn test_query_required_fields_only() {
    let yaml = r#"
queries:
  - endpoint: "v1/get_version_info"
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("should parse required fields");
    assert_eq!(query_file.queries.len(), 1);
    let query = &query_file.queries[0];
    assert_eq!(query.endpoint, "v1/get_version_info");
    assert!(query.body.is_none());
    assert!(query.body_file.is_none());
    assert!(query.expect_status.is_none());
    assert!(query.pretty.is_none());
}

#[test]
fn test_query_with_optional_fields() {
    let yaml = r#"
queries:
  - endpoint: "v1/brew_coffee"
    expect_status: 418
    pretty: false
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("should parse optional fields");
    let query = &query_file.queries[0];
    assert_eq!(query.expect_status, Some(418));
    assert_eq!(query.pretty, Some(false));
}

#[test]
fn test_query_missing_required_field() {
    // endpointが欠損
    let yaml = r#"
queries:
  - expect_status: 200
"#;
    let result: Result<QueryFile, _> = serde_yml::from_str(yaml);
    assert!(result.is_err(), "should fail when required field is missing");
}

#[test]
fn test_query_multiple_queries() {
    let yaml = r#"
queries:
  - endpoint: "v1/get_version_info"
  - endpoint: "v1/get_image_info"
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("should parse multiple queries");
    assert_eq!(query_file.queries.len(), 2);
    assert_eq!(query_file.queries[0].endpoint, "v1/get_version_info");
    assert_eq!(query_file.queries[1].endpoint, "v1/get_image_info");
}

// ============================================================
// 4. クエリ本文の解決
// ============================================================

#[test]
fn test_resolve_body_defaults_to_empty_object() {
    let yaml = r#"
queries:
  - endpoint: "v1/get_version_info"
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("parse");
    let body = query_file.queries[0]
        .resolve_body(std::path::Path::new("."))
        .expect("resolve");
    assert_eq!(body, "{}");
}

#[test]
fn test_resolve_body_inline_yaml_to_json() {
    let yaml = r#"
queries:
  - endpoint: "v1/get_image_info"
    body:
      io_id: 0
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("parse");
    let body = query_file.queries[0]
        .resolve_body(std::path::Path::new("."))
        .expect("resolve");
    let value: serde_json::Value = serde_json::from_str(&body).expect("body is JSON");
    assert_eq!(value["io_id"], 0);
}

#[test]
fn test_resolve_body_from_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let body_path = dir.path().join("body.json");
    let mut f = std::fs::File::create(&body_path).expect("create body.json");
    f.write_all(b"{\"io_id\": 2}").expect("write body");

    let yaml = r#"
queries:
  - endpoint: "v1/get_image_info"
    body_file: "body.json"
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("parse");
    let body = query_file.queries[0]
        .resolve_body(dir.path())
        .expect("resolve");
    let value: serde_json::Value = serde_json::from_str(&body).expect("body is JSON");
    assert_eq!(value["io_id"], 2);
}

#[test]
fn test_resolve_body_rejects_both_sources() {
    let yaml = r#"
queries:
  - endpoint: "v1/get_image_info"
    body: {}
    body_file: "body.json"
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("parse");
    let result = query_file.queries[0].resolve_body(std::path::Path::new("."));
    assert!(result.is_err(), "body and body_file together should fail");
}

#[test]
fn test_resolve_body_rejects_invalid_json_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let body_path = dir.path().join("body.json");
    let mut f = std::fs::File::create(&body_path).expect("create body.json");
    f.write_all(b"{not json").expect("write body");

    let yaml = r#"
queries:
  - endpoint: "v1/get_image_info"
    body_file: "body.json"
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("parse");
    let result = query_file.queries[0].resolve_body(dir.path());
    assert!(result.is_err(), "broken JSON file should be rejected");
}

// ============================================================
// 5. エンドポイント検証
// ============================================================

#[test]
fn test_validate_endpoint_accepts_path() {
    assert!(validate_endpoint("v1/get_version_info").is_ok());
}

#[test]
fn test_validate_endpoint_rejects_empty() {
    assert!(validate_endpoint("").is_err());
    assert!(validate_endpoint("   ").is_err());
}

#[test]
fn test_validate_endpoint_rejects_nul() {
    assert!(validate_endpoint("v1/get\0version").is_err());
}

#[test]
fn test_validate_endpoint_rejects_whitespace() {
    assert!(validate_endpoint("v1/get version").is_err());
}

// ============================================================
// 6. 設定マージロジック
// ============================================================

#[test]
fn test_merge_query_overrides_settings() {
    let settings = Settings::from_yaml("expect_status: 200").expect("parse settings");
    let yaml = r#"
queries:
  - endpoint: "v1/brew_coffee"
    expect_status: 418
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("parse query");
    let merged = MergedQuery::new(&settings, &query_file.queries[0]);
    assert_eq!(
        merged.expect_status, 418,
        "query expect_status should override settings"
    );
}

#[test]
fn test_merge_query_falls_back_to_settings() {
    let settings = Settings::from_yaml("pretty: false").expect("parse settings");
    let yaml = r#"
queries:
  - endpoint: "v1/get_version_info"
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("parse query");
    let merged = MergedQuery::new(&settings, &query_file.queries[0]);
    assert!(!merged.pretty, "should fall back to settings pretty");
    assert_eq!(merged.expect_status, 200);
}

#[test]
fn test_merge_no_settings_uses_defaults() {
    let settings = Settings::default();
    let yaml = r#"
queries:
  - endpoint: "v1/get_version_info"
"#;
    let query_file: QueryFile = serde_yml::from_str(yaml).expect("parse query");
    let merged = MergedQuery::new(&settings, &query_file.queries[0]);
    assert!(merged.pretty);
    assert_eq!(merged.expect_status, 200);
    assert!(merged.halt_on_error);
}

// ============================================================
// 7. settings.yaml自動検出
// ============================================================

#[test]
fn test_auto_detect_settings_yaml_exists() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let settings_path = dir.path().join("settings.yaml");
    let queries_path = dir.path().join("queries.yaml");

    let mut f = std::fs::File::create(&settings_path).expect("create settings.yaml");
    f.write_all(b"expect_status: 418\n").expect("write settings");

    // クエリファイルもダミーで作成（パスの解決に必要）
    std::fs::File::create(&queries_path).expect("create queries.yaml");

    let settings = load_settings_for_queries(&queries_path).expect("should load settings");
    assert_eq!(settings.expect_status, 418);
}

#[test]
fn test_auto_detect_settings_yaml_missing() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let queries_path = dir.path().join("queries.yaml");
    std::fs::File::create(&queries_path).expect("create queries.yaml");

    let settings = load_settings_for_queries(&queries_path).expect("should return defaults");
    assert_eq!(
        settings.expect_status, 200,
        "should use default when settings.yaml absent"
    );
}
