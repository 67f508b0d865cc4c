pub mod ai;
pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
