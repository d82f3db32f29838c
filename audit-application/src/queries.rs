pub mod report_queries;
pub mod status_queries;
pub mod summary_queries;
pub mod transfer_queries;
