//! Delivery quote for a single shipment
//!
//! Run: ./target/release/logistics_quote <district> --quantity 5 --weight 20

use anyhow::Result;
use clap::Parser;
use farm_logistics::config::{init_tracing, RatesArgs};
use farm_logistics::districts::DistrictRegistry;
use farm_logistics::logistics::{LogisticsEstimator, Shipment};

#[derive(Parser, Debug)]
#[command(name = "logistics_quote")]
#[command(about = "Estimate nearest warehouse, time and cost for one delivery")]
struct Args {
    /// Delivery district (unknown names fall back to Kathmandu)
    district: String,

    /// Number of items
    #[arg(long, default_value = "0")]
    quantity: f64,

    /// Total weight in kg
    #[arg(long, default_value = "0")]
    weight: f64,

    #[command(flatten)]
    rates: RatesArgs,

    /// Print the estimate as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let registry = DistrictRegistry::nepal();
    let estimator = LogisticsEstimator::new(&registry, (&args.rates).into());

    let estimate = estimator.estimate(&args.district, Shipment::new(args.quantity, args.weight)?)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    let origin = &estimate.route_details.origin;
    let destination = &estimate.route_details.destination;
    let costs = &estimate.cost_breakdown;

    println!();
    println!("  Delivery to:      {}", estimate.delivery_district);
    println!("  Ship from:        {}", estimate.nearest_warehouse);
    println!("  Route:            ({:.4}, {:.4}) → ({:.4}, {:.4})",
             origin.lat, origin.lng, destination.lat, destination.lng);
    println!("  Distance:         {:.2} km", estimate.estimated_distance);
    println!("  Travel time:      {:.2} h", estimate.estimated_time);
    println!("  {}", "─".repeat(40));
    println!("  Distance cost:    {:>12.2}", costs.distance_cost);
    println!("  Weight cost:      {:>12.2}", costs.weight_cost);
    println!("  Quantity cost:    {:>12.2}", costs.quantity_cost);
    println!("  Total:            {:>12.2}", costs.total_cost);
    println!();

    Ok(())
}
