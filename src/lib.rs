pub mod config;
pub mod domain;
pub mod infra;
pub mod service;
pub mod store;
pub mod util;
