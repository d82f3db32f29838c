pub mod admin_handlers;
pub mod ingest_handlers;
pub mod ops_handlers;
pub mod query_handlers;
