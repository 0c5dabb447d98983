// src/main.rs — LUMIÈRE entry point

use clap::Parser;
use std::sync::Arc;

use lumiere::catalog::{Catalog, ProductQuery};
use lumiere::cli::{Cli, Commands};
use lumiere::infra::config::Config;
use lumiere::infra::errors::LumiereError;
use lumiere::infra::logger;
use lumiere::provider::google::GoogleProvider;
use lumiere::stylist::{SessionSettings, StylistHost};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };
    if let Some(model) = cli.model {
        config.model.model = model;
    }

    // RUST_LOG still wins over both
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logger::init_logging(level);

    let catalog = Catalog::load(config.catalog.path.as_deref())?;

    match cli.command {
        Commands::Products {
            search,
            category,
            size,
            color,
            price,
            sort,
        } => {
            let query = ProductQuery {
                search,
                category,
                size,
                color,
                price,
                sort,
            };
            lumiere::cli::products::run_products(&catalog, &query)
        }
        Commands::Stylist { product } => {
            if config.model.provider != "google" {
                return Err(LumiereError::Config(format!(
                    "unsupported model provider '{}' (only 'google' is available)",
                    config.model.provider
                ))
                .into());
            }
            let api_key = Config::api_key().ok_or(LumiereError::NoApiKey)?;
            let provider = Arc::new(GoogleProvider::new(api_key));

            let settings = SessionSettings::from_config(&config);
            let mut host = StylistHost::new(provider, catalog, settings)
                .with_observer(lumiere::cli::progress::terminal_renderer());

            lumiere::cli::stylist::run_stylist(&mut host, &config.model.model, product).await
        }
    }
}
