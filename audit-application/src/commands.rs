pub mod bank_ban_commands;
pub mod config_commands;
pub mod ingest_commands;
pub mod maintenance_commands;
pub mod watchlist_commands;
