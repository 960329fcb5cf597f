// Phase 4: typed messages for the version-info endpoint

use serde::{Deserialize, Serialize};

/// The empty JSON object `{}` taken by endpoints without parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyRequest {}

/// Payload answered by `v1/get_version_info` with status 200.
#[derive(Debug, Clone, Deserialize)]
pub struct GetVersionInfoResponse {
    pub version_info: VersionInfo,
}

/// Build and version metadata reported by the engine.
///
/// `long_version_string` is the only field every engine build populates;
/// the rest default to empty when an engine omits them, and unknown fields
/// are ignored so newer engines keep deserializing.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    pub long_version_string: String,
    #[serde(default)]
    pub last_git_commit: String,
    #[serde(default)]
    pub dirty_working_tree: bool,
    #[serde(default)]
    pub build_date: String,
    #[serde(default)]
    pub git_describe_always: String,
}
