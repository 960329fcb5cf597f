pub mod messages;

/// Endpoint paths recognized by the engine's JSON dispatcher.
///
/// Only the version-info endpoint has a typed message pair in this crate;
/// the others are listed so callers of the raw `send` surface do not have
/// to hard-code path strings.
pub mod endpoints {
    pub const GET_VERSION_INFO: &str = "v1/get_version_info";
    pub const GET_IMAGE_INFO: &str = "v1/get_image_info";
    pub const EXECUTE: &str = "v1/execute";
}
