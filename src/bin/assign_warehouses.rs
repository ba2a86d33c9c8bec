//! Batch Warehouse Assignment
//! Runs an inventory CSV through the trained model and reports the
//! significant warehouses
//!
//! Run: ./target/release/assign_warehouses <inventory.csv> [--json]

use anyhow::{Context, Result};
use clap::Parser;
use farm_logistics::artifacts::WarehouseArtifacts;
use farm_logistics::config::{init_tracing, ArtifactArgs};
use farm_logistics::pipeline::{read_inventory, AssignmentPipeline, BatchAssignment};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "assign_warehouses")]
#[command(about = "Assign inventory rows to their optimal warehouses")]
struct Args {
    /// Inventory CSV with a District column
    inventory: PathBuf,

    #[command(flatten)]
    artifacts: ArtifactArgs,

    /// Print the result as JSON instead of a report
    #[arg(long)]
    json: bool,
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(70));
    println!("  {}", title);
    println!("{}\n", "═".repeat(70));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(60));
}

fn print_report(result: &BatchAssignment) {
    print_section_header("WAREHOUSE ASSIGNMENT");

    println!("  Rows read:     {:>8}", result.rows_in);
    println!("  Rows matched:  {:>8}", result.rows_matched);
    println!("  Rows dropped:  {:>8}  (district not in warehouse table)", result.rows_dropped);
    match result.threshold {
        Some(t) => println!("  Threshold:     {:>8.2}  assignments", t),
        None => println!("  Threshold:          n/a"),
    }

    print_subsection("Assignments per Warehouse");
    println!("  {:20} {:>10} {:>10}", "Warehouse", "Rows", "Share");
    println!("  {}", "─".repeat(42));
    let significant = result.significant_names();
    for (name, count) in &result.counts {
        let share = if result.rows_matched > 0 {
            *count as f64 / result.rows_matched as f64 * 100.0
        } else {
            0.0
        };
        let marker = if significant.contains(&name.as_str()) { "★" } else { " " };
        println!("{} {:20} {:>10} {:>9.1}%", marker, name, count, share);
    }

    print_subsection("Significant Warehouses");
    if result.warehouses.is_empty() {
        println!("  (none)");
    }
    for wh in &result.warehouses {
        println!("  {:20} {:>9.4}°N {:>9.4}°E", wh.district, wh.latitude, wh.longitude);
    }
    println!();
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let artifacts = WarehouseArtifacts::load(&args.artifacts.model, Some(args.artifacts.warehouses.as_path()))
        .context("loading warehouse artifacts")?;

    let file = File::open(&args.inventory)
        .with_context(|| format!("opening {}", args.inventory.display()))?;
    let records = read_inventory(BufReader::new(file))?;

    let pipeline = AssignmentPipeline::new(
        &artifacts.coordinates,
        &artifacts.candidates,
        &artifacts.model.scaler,
        &artifacts.model.model,
    );
    let result = pipeline.run(&records)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    Ok(())
}
