pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod feeds;
pub mod matching;
pub mod reconcile;
pub mod state;
pub mod store;
