pub mod auth;
pub mod cart;
pub mod client_store;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod search;
pub mod seasonal;
pub mod seed;
pub mod server;
pub mod share;
pub mod state;
pub mod storage;
