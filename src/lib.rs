pub mod api;
pub mod backend;
pub mod codec;
pub mod config;
pub mod feed;
pub mod gateway;
pub mod observability;
pub mod proxy;
