pub mod db;
pub mod error;
pub mod server;
pub mod services;
pub mod version;
pub mod web;
