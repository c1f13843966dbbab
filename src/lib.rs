pub mod app;
pub mod bench;
pub mod chart;
pub mod config;
pub mod store;
