use super::query::Query;
use super::settings::Settings;

#[derive(Debug, Clone)]
pub struct MergedQuery {
    pub pretty: bool,
    pub expect_status: i64,
    pub halt_on_error: bool,
}

impl MergedQuery {
    /// QueryのOption値がSomeならQueryの値を、NoneならSettingsの値を使用する。
    pub fn new(settings: &Settings, query: &Query) -> Self {
        MergedQuery {
            pretty: query.pretty.unwrap_or(settings.pretty),
            expect_status: query.expect_status.unwrap_or(settings.expect_status),
            halt_on_error: settings.halt_on_error,
        }
    }
}
