// src/stylist/context.rs — System prompt and greeting text built from the catalog
//
// Everything here is a pure function of its inputs: the same catalog and
// contextual product always produce byte-identical prompts.

use crate::catalog::{Catalog, Product};

pub const INIT_APOLOGY: &str = "I apologize, but I am currently unable to connect to the \
styling service. Please try again later.";

pub const SEND_APOLOGY: &str =
    "I apologize, I encountered a momentary issue processing your request.";

/// One line per product: name, price, category, colors, description.
pub fn catalog_context(catalog: &Catalog) -> String {
    catalog
        .products
        .iter()
        .map(|p| {
            format!(
                "- {} (${}): {}, {}, {}",
                p.name,
                p.price,
                p.category,
                p.colors.join("/"),
                p.description.as_deref().unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the system instruction for one stylist session.
pub fn build_system_prompt(brand: &str, catalog: &Catalog, product: Option<&Product>) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(&format!("You are a high-end fashion stylist for {}.\n\n", brand));

    prompt.push_str("Your Capabilities:\n");
    prompt.push_str("1. Analyze images uploaded by users (dresses, outfits, accessories).\n");
    prompt.push_str("2. Match user images or descriptions to our collection.\n");
    prompt.push_str("3. Provide styling advice, color pairings, and occasion tips.\n\n");

    prompt.push_str("Our Collection (Use this to make recommendations):\n");
    prompt.push_str(&catalog_context(catalog));
    prompt.push_str("\n\n");

    if let Some(p) = product {
        prompt.push_str("Currently Styling:\n");
        prompt.push_str(&product_summary(p));
        prompt.push_str("\n\n");
    }

    prompt.push_str("Tone: Elegant, sophisticated, helpful, and concise.\n");
    prompt.push_str(
        "If the user uploads an image, analyze its style/color and suggest matching \
         items from our collection or general styling advice.",
    );

    prompt
}

fn product_summary(p: &Product) -> String {
    let mut s = format!(
        "{} ({}, ${}). Color options: {}. Description: {}.",
        p.name,
        p.category,
        p.price,
        p.colors.join(", "),
        p.description.as_deref().unwrap_or_default().trim_end_matches('.'),
    );
    if let Some(material) = &p.material {
        s.push_str(&format!(" Material: {}.", material));
    }
    s
}

/// Opening request sent when the session has a contextual product.
pub fn greeting_prompt(product: &Product) -> String {
    format!(
        "The user is looking at: {} Start by offering advice for this specific item.",
        product_summary(product)
    )
}

/// Used when the greeting request succeeds but the model says nothing.
pub fn fallback_greeting(product: &Product) -> String {
    format!(
        "Excellent choice. The {} is a versatile piece. How would you like to style it today?",
        product.name
    )
}

/// Canned opening when there is no contextual product.
pub fn welcome_greeting(brand: &str) -> String {
    format!(
        "Welcome to {} Personal Styling. Upload an outfit inspiration or ask me for advice. \
         How may I assist you?",
        brand
    )
}
