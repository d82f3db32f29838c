pub mod settings;
pub mod sqlite_store;
pub mod summaries;
pub mod transfers;
pub mod watchlists;

pub use sqlite_store::*;
