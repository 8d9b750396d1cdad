pub mod conflation;
pub mod knowledge;
pub mod log;
pub mod plan;
pub mod query;
pub mod solution;
pub mod time_serde;
