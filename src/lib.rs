pub mod analysis;
pub mod config;
pub mod error;
pub mod inference;
pub mod lyrics;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod trending_store;
