// Domain entities

pub mod alert;
pub mod bank_ban;
pub mod maintenance;
pub mod monitoring_config;
pub mod report;
pub mod runtime_config;
pub mod tracked_item;
pub mod transfer_event;
pub mod transfer_summary;
pub mod watchlist;

pub use alert::*;
pub use bank_ban::*;
pub use maintenance::*;
pub use monitoring_config::*;
pub use report::*;
pub use runtime_config::*;
pub use tracked_item::*;
pub use transfer_event::*;
pub use transfer_summary::*;
pub use watchlist::*;
