pub mod api;
pub mod config;
pub mod csrf;
pub mod error;
pub mod markdown;
pub mod models;
pub mod pagination;
pub mod search;
pub mod tui;
pub mod web;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};
