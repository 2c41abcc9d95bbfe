pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod models;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use graph::{Clock, SocialGraph, SystemClock};
