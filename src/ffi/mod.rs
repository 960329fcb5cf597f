pub mod imageflow;
pub mod imageflow_sys;
