//! Warehouse assignment and delivery estimation for the farm marketplace
//!
//! - [`pipeline`]: batch assignment of uploaded inventory to warehouses
//! - [`logistics`]: single-shipment nearest-warehouse estimate
//! - [`api`]: REST surface over both

pub mod api;
pub mod artifacts;
pub mod config;
pub mod districts;
pub mod error;
pub mod geo;
pub mod logistics;
pub mod model;
pub mod models;
pub mod pests;
pub mod pipeline;
pub mod stats;

pub use error::{LogisticsError, Result};
