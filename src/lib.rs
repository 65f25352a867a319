pub mod adapter;
pub mod config;
pub mod domain;
pub mod logging;
pub mod port;
pub mod service;
