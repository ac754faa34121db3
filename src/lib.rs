pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod services;
pub mod transport;
pub mod web;


pub use config::Config;
pub use context::AppContext;
