use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryFile {
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Query {
    pub endpoint: String,
    pub body: Option<serde_yml::Value>,
    pub body_file: Option<String>,
    pub expect_status: Option<i64>,
    pub pretty: Option<bool>,
}

impl Query {
    /// クエリ本文をJSON文字列として解決する。
    ///
    /// - `body`: クエリファイル内のインライン値をJSONに変換
    /// - `body_file`: `base_dir` からの相対パスでJSONファイルを読み込む
    /// - どちらも未指定なら空オブジェクト `{}`
    ///
    /// `body` と `body_file` の併用はエラー。
    pub fn resolve_body(&self, base_dir: &Path) -> crate::error::Result<String> {
        match (&self.body, &self.body_file) {
            (Some(_), Some(_)) => Err(crate::error::BridgeError::config(format!(
                "Query '{}' sets both body and body_file",
                self.endpoint
            ))),
            (Some(value), None) => Ok(serde_json::to_string(value)?),
            (None, Some(path)) => {
                let resolved = resolve_path(base_dir, path);
                let content = std::fs::read_to_string(&resolved)?;
                // Parse first so a broken file is reported as such, not as
                // an engine-side JSON error.
                let value: serde_json::Value = serde_json::from_str(&content)?;
                Ok(serde_json::to_string(&value)?)
            }
            (None, None) => Ok(String::from("{}")),
        }
    }
}

/// エンドポイントパスを検証する。
///
/// - 空文字列は不可
/// - 内部NULバイトは不可（C境界で文字列が切り詰められるため）
/// - 空白文字を含むパスは不可
pub fn validate_endpoint(s: &str) -> crate::error::Result<()> {
    if s.trim().is_empty() {
        return Err(crate::error::BridgeError::config(
            "Endpoint cannot be empty",
        ));
    }
    if s.contains('\0') {
        return Err(crate::error::BridgeError::config(format!(
            "Endpoint contains a NUL byte: {s:?}"
        )));
    }
    if s.chars().any(|c| c.is_whitespace()) {
        return Err(crate::error::BridgeError::config(format!(
            "Endpoint must not contain whitespace: '{s}'"
        )));
    }
    Ok(())
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
