pub mod config;
pub mod error;
#[cfg(feature = "engine")]
pub mod ffi;
pub mod json;

pub use error::{BridgeError, Result};
#[cfg(feature = "engine")]
pub use ffi::imageflow::{Context, JsonResponse, ResponseBody};
pub use json::messages::{GetVersionInfoResponse, VersionInfo};
