// src/account.rs — Demo shopper profile and order history

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::infra::errors::LumiereError;

const DEMO_ACCOUNT: &str = include_str!("../assets/account.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub default_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: u32,
    pub size: String,
    pub color: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

/// A past order. `total` is what was charged, not recomputed from the lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub date: String,
    pub status: OrderStatus,
    pub total: f64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Static account data; there is no backend behind the sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub user: UserProfile,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Account {
    /// The demo shopper shipped with the binary.
    pub fn demo() -> Result<Self, LumiereError> {
        toml::from_str(DEMO_ACCOUNT).map_err(|e| LumiereError::Config(format!("account: {}", e)))
    }

    /// Orders that are not yet delivered or cancelled.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .filter(|o| matches!(o.status, OrderStatus::Processing | OrderStatus::Shipped))
    }

    /// Item names for an order, falling back to the id for products the
    /// catalog no longer carries.
    pub fn item_names(order: &Order, catalog: &Catalog) -> Vec<String> {
        order
            .items
            .iter()
            .map(|item| match catalog.find(item.product_id) {
                Some(p) => p.name.clone(),
                None => format!("#{}", item.product_id),
            })
            .collect()
    }
}
