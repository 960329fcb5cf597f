use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub abi_version: String,
    pub pretty: bool,
    pub expect_status: i64,
    pub halt_on_error: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            abi_version: String::from("3.0"),
            pretty: true,
            expect_status: 200,
            halt_on_error: true,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::BridgeError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// 設定されたABIバージョン文字列を (major, minor) ペアとして返す。
    pub fn abi_pair(&self) -> crate::error::Result<(u32, u32)> {
        parse_abi_version(&self.abi_version)
    }
}

/// ABIバージョン文字列をパースして (major, minor) ペアに変換する。
///
/// 形式:
/// - `"3.0"` (メジャー.マイナー、どちらも非負整数)
///
/// 前後の空白は無視される。
pub fn parse_abi_version(s: &str) -> crate::error::Result<(u32, u32)> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(crate::error::BridgeError::config(
            "ABI version cannot be empty",
        ));
    }

    let Some((major_str, minor_str)) = trimmed.split_once('.') else {
        return Err(crate::error::BridgeError::config(format!(
            "Invalid ABI version (expected 'major.minor'): '{trimmed}'"
        )));
    };

    let major: u32 = major_str.trim().parse().map_err(|_| {
        crate::error::BridgeError::config(format!("Invalid ABI major version: '{major_str}'"))
    })?;
    let minor: u32 = minor_str.trim().parse().map_err(|_| {
        crate::error::BridgeError::config(format!("Invalid ABI minor version: '{minor_str}'"))
    })?;

    Ok((major, minor))
}
