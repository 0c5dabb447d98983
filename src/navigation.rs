// src/navigation.rs — Storefront view router with the mock sign-in guard

use tracing::debug;

/// The storefront page currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    Collection,
    /// Category listing by name (Women, Men, Accessories).
    Category(String),
    Search(String),
    Product(u32),
    /// The stylist, optionally with the product being styled.
    Stylist(Option<u32>),
    Cart,
    Profile,
    SignIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkout {
    /// Not signed in; the router moved to the sign-in page.
    SignInRequired,
    /// Payment is not offered.
    Unavailable,
}

/// Tracks the current view and whether the shopper is signed in. The styled
/// product, open product and search query live in the view itself, so
/// moving to any other page drops them.
///
/// Sign-in is a mock: any submission succeeds and no credentials are kept.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: View,
    authenticated: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: View::Home,
            authenticated: false,
        }
    }

    pub fn current(&self) -> &View {
        &self.current
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Go to `view`. The profile is guarded: while signed out the router
    /// lands on the sign-in page instead.
    pub fn navigate(&mut self, view: View) -> &View {
        let target = match view {
            View::Profile if !self.authenticated => View::SignIn,
            other => other,
        };
        debug!(from = ?self.current, to = ?target, "navigate");
        self.current = target;
        &self.current
    }

    pub fn search(&mut self, query: impl Into<String>) -> &View {
        self.navigate(View::Search(query.into()))
    }

    pub fn view_product(&mut self, product_id: u32) -> &View {
        self.navigate(View::Product(product_id))
    }

    pub fn style_product(&mut self, product_id: Option<u32>) -> &View {
        self.navigate(View::Stylist(product_id))
    }

    /// The product the stylist is styling, if the stylist is showing.
    pub fn styling(&self) -> Option<u32> {
        match self.current {
            View::Stylist(id) => id,
            _ => None,
        }
    }

    /// Mock sign-in: always succeeds and opens the profile.
    pub fn sign_in(&mut self) -> &View {
        self.authenticated = true;
        self.navigate(View::Profile)
    }

    /// Sign out and return home.
    pub fn sign_out(&mut self) -> &View {
        self.authenticated = false;
        self.navigate(View::Home)
    }

    /// Start checkout. Signed-out shoppers are sent to sign in first.
    pub fn checkout(&mut self) -> Checkout {
        if !self.authenticated {
            self.navigate(View::SignIn);
            return Checkout::SignInRequired;
        }
        Checkout::Unavailable
    }
}
