use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Context error: {0}")]
    ContextError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Status error: {0}")]
    StatusError(String),

    #[error("Usage error: {0}")]
    UsageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`BridgeError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl BridgeError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a context error (creation failure, version mismatch).
    context => ContextError,
    /// Create a request error (send failed, native error flag set).
    request => RequestError,
    /// Create a response error (response handle could not be read).
    response => ResponseError,
    /// Create a status error (well-formed response, unexpected status code).
    status => StatusError,
    /// Create a usage error (caller violated an argument contract).
    usage => UsageError,
    /// Create a configuration error.
    config => ConfigError,
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::JsonError(e.to_string())
    }
}

impl From<serde_yml::Error> for BridgeError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
