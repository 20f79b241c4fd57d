pub mod availability_cache;
pub mod query_filter;
