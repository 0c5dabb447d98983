// src/cart.rs — In-memory cart ledger keyed by (product, size, color)

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

const FREE_SHIPPING_OVER: f64 = 150.0;
const FLAT_SHIPPING: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartKey {
    pub product_id: u32,
    pub size: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub key: CartKey,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Lines are kept in the order they were first added.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` of a product. Missing size/color fall back to the
    /// product's first option. Returns the key the quantity landed on.
    pub fn add(
        &mut self,
        product: &Product,
        size: Option<&str>,
        color: Option<&str>,
        quantity: u32,
    ) -> CartKey {
        let key = CartKey {
            product_id: product.id,
            size: size
                .map(str::to_string)
                .or_else(|| product.sizes.first().cloned())
                .unwrap_or_default(),
            color: color
                .map(str::to_string)
                .or_else(|| product.colors.first().cloned())
                .unwrap_or_default(),
        };

        match self.lines.iter_mut().find(|l| l.key == key) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                key: key.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            }),
        }
        key
    }

    /// Apply a quantity delta. A change that would leave zero or fewer items
    /// is ignored; use [`Cart::remove`] to drop a line.
    pub fn update_quantity(&mut self, key: &CartKey, delta: i64) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| &l.key == key) else {
            return false;
        };
        let next = i64::from(line.quantity).saturating_add(delta);
        match u32::try_from(next) {
            Ok(quantity) if quantity > 0 => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, key: &CartKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.key != key);
        self.lines.len() != before
    }

    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |n, l| n.saturating_add(l.quantity))
    }

    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn shipping(&self) -> f64 {
        if self.subtotal() > FREE_SHIPPING_OVER {
            0.0
        } else {
            FLAT_SHIPPING
        }
    }

    pub fn total(&self) -> f64 {
        self.subtotal() + self.shipping()
    }
}
