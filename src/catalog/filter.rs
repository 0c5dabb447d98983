// src/catalog/filter.rs — Search, facet filters and sorting over the catalog

use std::collections::BTreeSet;
use std::str::FromStr;

use super::{Catalog, Product};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceRange {
    #[default]
    All,
    /// price <= 50
    UpTo50,
    /// 50 < price <= 100
    From50To100,
    /// price > 100
    Over100,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        match self {
            PriceRange::All => true,
            PriceRange::UpTo50 => price <= 50.0,
            PriceRange::From50To100 => price > 50.0 && price <= 100.0,
            PriceRange::Over100 => price > 100.0,
        }
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(PriceRange::All),
            "0-50" => Ok(PriceRange::UpTo50),
            "50-100" => Ok(PriceRange::From50To100),
            "100+" => Ok(PriceRange::Over100),
            other => Err(format!(
                "unknown price range '{}' (expected all, 0-50, 50-100, 100+)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// New arrivals first; catalog order otherwise.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            other => Err(format!(
                "unknown sort key '{}' (expected newest, price-asc, price-desc)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: PriceRange,
    pub sort: SortKey,
}

impl ProductQuery {
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

fn matches_search(product: &Product, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);
    hit(&product.name)
        || product.description.as_deref().is_some_and(hit)
        || hit(&product.category)
        || product.colors.iter().any(|c| hit(c.as_str()))
        || product.material.as_deref().is_some_and(hit)
}

/// Apply search, category, size, color and price filters, then sort.
///
/// An active search replaces the category filter. Sorting is stable, so
/// equal keys keep catalog order.
pub fn filter_products<'a>(catalog: &'a Catalog, query: &ProductQuery) -> Vec<&'a Product> {
    let search = query.search_term();

    let mut products: Vec<&Product> = catalog
        .products
        .iter()
        .filter(|p| match &search {
            Some(needle) => matches_search(p, needle),
            None => query.category.as_ref().map_or(true, |c| &p.category == c),
        })
        .filter(|p| query.size.as_ref().map_or(true, |s| p.sizes.contains(s)))
        .filter(|p| query.color.as_ref().map_or(true, |c| p.colors.contains(c)))
        .filter(|p| query.price.contains(p.price))
        .collect();

    match query.sort {
        SortKey::Newest => products.sort_by_key(|p| !p.is_new),
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }

    products
}

/// Products a facet list is derived from: search hits on name/description,
/// else the category, else everything.
fn facet_scope<'a>(
    catalog: &'a Catalog,
    category: Option<&str>,
    search: Option<&str>,
) -> Vec<&'a Product> {
    let search = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    catalog
        .products
        .iter()
        .filter(|p| match (&search, category) {
            (Some(needle), _) => {
                p.name.to_lowercase().contains(needle.as_str())
                    || p
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(needle.as_str()))
            }
            (None, Some(c)) => p.category == c,
            (None, None) => true,
        })
        .collect()
}

/// Sorted, de-duplicated sizes available in the current scope.
pub fn available_sizes(catalog: &Catalog, category: Option<&str>, search: Option<&str>) -> Vec<String> {
    facet_scope(catalog, category, search)
        .into_iter()
        .flat_map(|p| p.sizes.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, de-duplicated colors available in the current scope.
pub fn available_colors(catalog: &Catalog, category: Option<&str>, search: Option<&str>) -> Vec<String> {
    facet_scope(catalog, category, search)
        .into_iter()
        .flat_map(|p| p.colors.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
