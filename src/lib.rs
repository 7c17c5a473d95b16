//! tubefeed - a single feed of new uploads from every subscribed channel.
//!
//! Each cycle polls the public feed of every subscribed channel, resolves the
//! videos not seen before through the data API, stores them and appends them
//! to a bounded rolling window that is rendered as an Atom document.

pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;
pub mod store;
pub mod web;
pub mod youtube;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use db::Database;
pub use error::{RequestError, Result, TubefeedError};
