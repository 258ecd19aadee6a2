pub mod granularity;
pub mod parameter;
pub mod provider;
pub mod query;
pub mod station;
