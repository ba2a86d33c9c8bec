//! REST API Server for warehouse assignment and delivery estimates
//!
//! Usage:
//!   ./target/release/api_server [options]
//!
//! Options:
//!   --port PORT            Port to listen on (default: 8080)
//!   --model PATH           Trained model bundle (default: data/warehouse_model.json)
//!   --warehouses PATH      District,Latitude,Longitude join table (default: data/fixed_warehouse.csv)
//!   --remedies PATH        pestname,remedy table (default: data/pest_remedy.csv)
//!   --classifier-url URL   Pest image classifier endpoint (optional)
//!
//! REST endpoints:
//!   GET  /api/v1/health                 - Health check
//!   GET  /api/v1/districts              - District pick-list
//!   GET  /api/v1/warehouses/candidates  - Candidate warehouses
//!   POST /api/v1/warehouses/assign      - Inventory CSV upload → significant warehouses
//!   POST /api/v1/logistics              - Nearest-warehouse delivery estimate
//!   GET  /api/v1/pests/:pest/remedy     - Remedy for a pest
//!   POST /api/v1/pests/classify         - Classify a pest image

use anyhow::Result;
use clap::Parser;
use farm_logistics::api::{create_rest_router, LogisticsService};
use farm_logistics::artifacts::WarehouseArtifacts;
use farm_logistics::config::{init_tracing, ArtifactArgs, RatesArgs};
use farm_logistics::districts::DistrictRegistry;
use farm_logistics::pests::{PestClassifierClient, RemedyBook};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "REST server for warehouse assignment and delivery estimates")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    #[command(flatten)]
    artifacts: ArtifactArgs,

    /// Pest remedy table
    #[arg(long, default_value = "data/pest_remedy.csv")]
    remedies: PathBuf,

    /// Pest image classifier endpoint
    #[arg(long)]
    classifier_url: Option<String>,

    #[command(flatten)]
    rates: RatesArgs,
}

fn print_banner(port: u16, model_loaded: bool) {
    println!("============================================================");
    println!("         FARM LOGISTICS API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!("  Model:    {}", if model_loaded { "loaded" } else { "NOT LOADED" });
    println!();
    println!("REST Endpoints:");
    println!("  GET  /api/v1/health                 Health check");
    println!("  GET  /api/v1/districts              Districts");
    println!("  GET  /api/v1/warehouses/candidates  Candidates");
    println!("  POST /api/v1/warehouses/assign      Assign upload");
    println!("  POST /api/v1/logistics              Delivery estimate");
    println!("  GET  /api/v1/pests/:pest/remedy     Pest remedy");
    println!("  POST /api/v1/pests/classify         Classify image");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let mut service = LogisticsService::new(DistrictRegistry::nepal(), (&args.rates).into());

    // Without artifacts the assign endpoints answer 500
    match WarehouseArtifacts::load(&args.artifacts.model, Some(args.artifacts.warehouses.as_path())) {
        Ok(artifacts) => service = service.with_artifacts(artifacts),
        Err(e) => tracing::error!("Warehouse model unavailable: {}", e),
    }

    match RemedyBook::load(&args.remedies) {
        Ok(book) => {
            tracing::info!("Loaded {} pest remedies", book.len());
            service = service.with_remedies(book);
        }
        Err(e) => tracing::warn!("Remedy table {} not loaded: {}", args.remedies.display(), e),
    }

    if let Some(url) = &args.classifier_url {
        service = service.with_classifier(PestClassifierClient::new(url.clone())?);
        tracing::info!("Pest classifier at {}", url);
    }

    print_banner(args.port, service.has_model());

    let app = create_rest_router(Arc::new(service));
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
