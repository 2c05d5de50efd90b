pub mod config;
pub mod event;
pub mod forwarder;
pub mod models;
pub mod payload;
