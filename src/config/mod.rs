pub mod merged;
pub mod query;
pub mod settings;

use settings::Settings;
use std::path::Path;

/// クエリファイルのパスからsettings.yamlを自動検出して読み込む。
///
/// クエリファイルと同じディレクトリに `settings.yaml` が存在すれば読み込み、
/// 存在しなければデフォルト設定を返す。
pub fn load_settings_for_queries(query_file_path: &Path) -> crate::error::Result<Settings> {
    let dir = query_file_path.parent().ok_or_else(|| {
        crate::error::BridgeError::config("Cannot determine query file directory")
    })?;

    let settings_path = dir.join("settings.yaml");

    if settings_path.exists() {
        Settings::from_file(&settings_path)
    } else {
        Ok(Settings::default())
    }
}
