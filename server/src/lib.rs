pub extern crate actix_web;

mod broadcast;
pub mod config;
pub mod connection;
mod gateway;
pub mod handle;
pub mod handlers;
mod membership;
pub mod peer;
pub mod peer_registry;
pub mod server;
pub mod session;
pub mod session_state;

pub use broadcast::BroadcastDispatcher;
