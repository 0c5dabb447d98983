// src/catalog/mod.rs — Product catalog store

pub mod filter;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::errors::LumiereError;

pub use filter::{filter_products, PriceRange, ProductQuery, SortKey};

const BUNDLED_CATALOG: &str = include_str!("../../assets/catalog.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    pub description: Option<String>,
    pub material: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: String,
}

/// Read-only snapshot of the store's categories and products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Catalog {
    /// The collection shipped with the binary.
    pub fn bundled() -> Result<Self, LumiereError> {
        Self::parse(BUNDLED_CATALOG)
    }

    pub fn load_from(path: &Path) -> Result<Self, LumiereError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// External catalog when a path is configured, bundled otherwise.
    pub fn load(path: Option<&str>) -> Result<Self, LumiereError> {
        match path {
            Some(p) => Self::load_from(Path::new(p)),
            None => Self::bundled(),
        }
    }

    fn parse(content: &str) -> Result<Self, LumiereError> {
        toml::from_str(content).map_err(|e| LumiereError::Config(format!("catalog: {}", e)))
    }

    pub fn find(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn get(&self, id: u32) -> Result<&Product, LumiereError> {
        self.find(id).ok_or(LumiereError::ProductNotFound { id })
    }
}
