//! Synthetic inventory generator
//!
//! Writes an inventory CSV in the upload format (a `District` column plus
//! business columns) for demos and load tests of the warehouse assignment
//! pipeline. A share of rows can carry unknown districts to exercise the
//! join-drop path.
//!
//! Usage:
//!   cargo run --release --bin generate_inventory -- [OPTIONS]
//!
//! Options:
//!   --rows <N>            Number of inventory rows (default: 1000)
//!   --unknown-rate <F>    Share of rows with an unresolvable district (default: 0.02)
//!   --seed <N>            Random seed for reproducibility (optional)
//!   --output <PATH>       Output CSV path (default: data/inventory.csv)

use chrono::{Duration, NaiveDate};
use clap::Parser;
use csv::WriterBuilder;
use farm_logistics::districts::NEPAL_DISTRICTS;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

/// Synthetic inventory generator
#[derive(Parser, Debug)]
#[command(name = "generate_inventory")]
#[command(about = "Generate a synthetic farm inventory CSV")]
struct Args {
    /// Number of rows to write
    #[arg(long, default_value = "1000")]
    rows: usize,

    /// Share of rows with a district no table knows (0.0 - 1.0)
    #[arg(long, default_value = "0.02")]
    unknown_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/inventory.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct InventoryRow {
    #[serde(rename = "Crop")]
    crop: &'static str,
    #[serde(rename = "District")]
    district: String,
    #[serde(rename = "Quantity")]
    quantity: f64,
    #[serde(rename = "Unit")]
    unit: &'static str,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Harvest Date")]
    harvest_date: String,
}

/// (crop, unit, kg per unit)
const CROPS: &[(&str, &str, f64)] = &[
    ("Jute", "bale", 180.0),
    ("Rice", "sack", 50.0),
    ("Wheat", "sack", 50.0),
    ("Maize", "sack", 40.0),
    ("Potato", "crate", 25.0),
    ("Tomato", "crate", 15.0),
];

/// Misspellings and names that exist in no registry
const UNKNOWN_DISTRICTS: &[&str] = &["Kathmandoo", "Pokhara Valley", "Terai", "N/A", ""];

fn generate_row(args: &Args, season_start: NaiveDate, rng: &mut impl Rng) -> InventoryRow {
    let (crop, unit, kg_per_unit) = *CROPS.choose(rng).unwrap_or(&CROPS[0]);

    let district = if rng.gen::<f64>() < args.unknown_rate {
        UNKNOWN_DISTRICTS.choose(rng).unwrap_or(&"").to_string()
    } else {
        NEPAL_DISTRICTS
            .choose(rng)
            .map(|(name, _, _)| name.to_string())
            .unwrap_or_default()
    };

    let quantity = rng.gen_range(1..=200) as f64;
    // ±15% around the nominal unit weight
    let weight = (quantity * kg_per_unit * rng.gen_range(0.85..=1.15) * 10.0).round() / 10.0;
    let harvest_date = season_start + Duration::days(rng.gen_range(0..120));

    InventoryRow {
        crop,
        district,
        quantity,
        unit,
        weight,
        harvest_date: harvest_date.format("%Y-%m-%d").to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if !(0.0..=1.0).contains(&args.unknown_rate) {
        return Err(format!("--unknown-rate must be within 0.0-1.0, got {}", args.unknown_rate).into());
    }

    println!("🌾 Synthetic Inventory Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Rows:             {}", args.rows);
    println!("Unknown rate:     {:.1}%", args.unknown_rate * 100.0);
    println!("Output:           {}", args.output.display());
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let season_start = NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("invalid season start")?;

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)?;

    let mut unknown = 0;
    for _ in 0..args.rows {
        let row = generate_row(&args, season_start, &mut rng);
        if !NEPAL_DISTRICTS.iter().any(|(name, _, _)| *name == row.district) {
            unknown += 1;
        }
        writer.serialize(&row)?;
    }
    writer.flush()?;

    println!("✅ Generation complete!");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Rows written:      {:>8}", args.rows);
    println!("Unknown districts: {:>8}", unknown);
    println!("Output file:       {}", args.output.display());

    Ok(())
}
