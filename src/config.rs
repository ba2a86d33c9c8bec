//! Command-line configuration shared by the binaries

use std::path::PathBuf;

use clap::Args;

use crate::logistics::LogisticsRates;

/// Tariff overrides for delivery estimates
#[derive(Args, Debug, Clone)]
pub struct RatesArgs {
    /// Currency units charged per km
    #[arg(long, default_value = "50")]
    pub distance_rate: f64,

    /// Currency units charged per kg
    #[arg(long, default_value = "10")]
    pub weight_rate: f64,

    /// Currency units charged per item
    #[arg(long, default_value = "5")]
    pub quantity_rate: f64,

    /// Average road speed in km/h
    #[arg(long, default_value = "40")]
    pub avg_speed: f64,
}

impl From<&RatesArgs> for LogisticsRates {
    fn from(args: &RatesArgs) -> Self {
        Self {
            distance_rate: args.distance_rate,
            weight_rate: args.weight_rate,
            quantity_rate: args.quantity_rate,
            avg_speed_kmh: args.avg_speed,
        }
    }
}

/// Locations of the trained warehouse artifacts
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Trained model bundle (scaler, centroids, warehouse list)
    #[arg(long, default_value = "data/warehouse_model.json")]
    pub model: PathBuf,

    /// District,Latitude,Longitude table used to join uploads
    #[arg(long, default_value = "data/fixed_warehouse.csv")]
    pub warehouses: PathBuf,
}

/// Initialize tracing from `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();
}
