pub mod categories;
pub mod cli;
pub mod client;
pub mod config;
pub mod filter;
pub mod form;
pub mod format;
pub mod logging;
pub mod session;
pub mod store;
pub mod types;
