//! Fire-weather forecast plotter.
//!
//! Downloads the latest NDFD grids for a region and writes one JPEG per
//! forecast period and an animated GIF for each requested product.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use fire_products::{Plotter, PlotterConfig, Product, ProductRequest};
use firewx_common::time::parse_utc;
use firewx_common::{ReferenceSystem, RegionKey};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "firewx-plotter")]
#[command(about = "Plot NDFD fire-weather forecasts for a region")]
struct Args {
    /// Products to plot (e.g. min-rh, dry-and-windy), or "all"
    #[arg(required_unless_present = "list", num_args = 1..)]
    products: Vec<String>,

    /// Region: CONUS, a state or GACC code, a catalog name, or "west,south,east,north"
    #[arg(short, long, env = "FIREWX_REGION", default_value = "CONUS")]
    region: String,

    /// Boundary overlays (states_only, states_and_counties, gacc_and_psa, ...)
    #[arg(long, env = "FIREWX_REFERENCE_SYSTEM", default_value = "states_only")]
    reference_system: String,

    /// YAML configuration file
    #[arg(short, long, env = "FIREWX_CONFIG")]
    config: Option<PathBuf>,

    /// Output root (overrides configuration)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory of pre-downloaded ds.*.bin files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory of GeoJSON boundary layers
    #[arg(long)]
    boundaries_dir: Option<PathBuf>,

    /// Maximum forecast periods per product
    #[arg(long)]
    max_periods: Option<usize>,

    /// Treat this UTC time as now, e.g. 2024-07-04T12:00:00Z
    #[arg(long)]
    now: Option<String>,

    /// List products and regions, then exit
    #[arg(long)]
    list: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long, env = "FIREWX_LOG_JSON")]
    json_logs: bool,
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &Args) -> Result<PlotterConfig> {
    let mut config = match args.config {
        Some(ref path) => PlotterConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PlotterConfig::from_env(),
    };

    if let Some(ref dir) = args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(ref dir) = args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(ref dir) = args.boundaries_dir {
        config.boundaries_dir = dir.clone();
    }
    if let Some(n) = args.max_periods {
        config.max_periods = n;
    }

    config.validate()?;
    Ok(config)
}

fn parse_products(names: &[String]) -> Result<Vec<Product>> {
    if names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
        return Ok(Product::ALL.to_vec());
    }
    let mut products = Vec::with_capacity(names.len());
    for name in names {
        let product: Product = name.parse()?;
        if !products.contains(&product) {
            products.push(product);
        }
    }
    Ok(products)
}

fn list(plotter: &Plotter) {
    println!("Products:");
    for product in Product::ALL {
        println!("  {:<20} {}", product.key(), product.dir_name());
    }
    println!("Reference systems:");
    for rs in ReferenceSystem::ALL {
        println!("  {}", rs.dir_name());
    }
    let mut keys: Vec<_> = plotter.catalog().keys().collect();
    keys.sort();
    println!("Regions:");
    for key in keys {
        if let Some(settings) = plotter.catalog().get(key) {
            println!("  {:<8} {}", key, settings.name);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let config = load_config(&args)?;
    let plotter = Plotter::new(config)?;

    if args.list {
        list(&plotter);
        return Ok(());
    }

    let products = parse_products(&args.products)?;
    let region: RegionKey = args.region.parse()?;
    let reference_system: ReferenceSystem = args.reference_system.parse()?;
    let now = args.now.as_deref().map(parse_utc).transpose()?;

    info!(
        region = %region.slug(),
        reference_system = reference_system.dir_name(),
        products = products.len(),
        "Starting fire-weather plots"
    );

    let mut failed = 0;
    for product in &products {
        let mut request = ProductRequest::new(*product, region.clone()).with_reference_system(reference_system);
        request.now = now;

        match plotter.run(request).await {
            Ok(output) => info!(
                product = %product,
                frames = output.frames.len(),
                gif = %output.gif.display(),
                "Plotted"
            ),
            Err(e) => {
                error!(product = %product, error = %e, "Product failed");
                failed += 1;
            }
        }
    }

    if failed == products.len() {
        bail!("all {} products failed", failed);
    }
    if failed > 0 {
        warn!(failed, total = products.len(), "Some products failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products_all_and_dedup() {
        assert_eq!(parse_products(&["all".to_string()]).unwrap().len(), 15);
        let p = parse_products(&["min-rh".to_string(), "MIN_RH".to_string(), "max-t".to_string()]).unwrap();
        assert_eq!(p, vec![Product::MinRh, Product::MaxT]);
        assert!(parse_products(&["smoke".to_string()]).is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "firewx-plotter",
            "dry-and-gusty",
            "--region",
            "CA",
            "--now",
            "2024-07-04T12:00:00Z",
        ])
        .unwrap();
        assert_eq!(args.products, vec!["dry-and-gusty"]);
        assert_eq!(args.region, "CA");
        assert!(args.now.is_some());
    }
}
