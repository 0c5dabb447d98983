// src/cli/products.rs — `lumiere products`: filtered catalog listing

use crate::catalog::filter::{available_colors, available_sizes};
use crate::catalog::{filter_products, Catalog, Product, ProductQuery};

pub fn run_products(catalog: &Catalog, query: &ProductQuery) -> anyhow::Result<()> {
    let products = filter_products(catalog, query);

    if products.is_empty() {
        eprintln!("No products match those filters.");
    } else {
        for p in &products {
            println!("{}", format_row(p));
        }
    }

    // Facets reflect the current category/search, not the size/color picks
    let search = query.search.as_deref();
    let category = query.category.as_deref();
    eprintln!(
        "\n{} item(s) | sizes: {} | colors: {}",
        products.len(),
        available_sizes(catalog, category, search).join(", "),
        available_colors(catalog, category, search).join(", "),
    );
    Ok(())
}

fn format_row(p: &Product) -> String {
    let badge = if p.is_new { " [new]" } else { "" };
    format!(
        "{:>3}  {:<28} {:<10} ${:>7.2}{}",
        p.id, p.name, p.category, p.price, badge
    )
}
