pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use db::create_pool;
