// src/cli/mod.rs — CLI definition (clap derive)

pub mod products;
pub mod progress;
pub mod stylist;

use clap::{Parser, Subcommand};

use crate::catalog::{PriceRange, SortKey};

#[derive(Parser)]
#[command(name = "lumiere", about = "LUMIÈRE storefront and AI stylist", version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Model to use for the stylist (overrides config)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse the collection
    Products {
        /// Free-text search over name, description, category, colors and material
        #[arg(short, long)]
        search: Option<String>,
        /// Category name (ignored while a search is active)
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// all, 0-50, 50-100 or 100+
        #[arg(long, default_value = "all")]
        price: PriceRange,
        /// newest, price-asc or price-desc
        #[arg(long, default_value = "newest")]
        sort: SortKey,
    },
    /// Chat with the AI stylist
    Stylist {
        /// Product id to style (omit for general advice)
        #[arg(short, long)]
        product: Option<u32>,
    },
}
