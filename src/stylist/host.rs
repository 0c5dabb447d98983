// src/stylist/host.rs — Owns at most one live stylist session for the navigation layer

use std::sync::Arc;
use tracing::info;

use super::session::{SessionObserver, SessionSettings, StylistSession};
use crate::catalog::{Catalog, Product};
use crate::infra::errors::LumiereError;
use crate::provider::ModelProvider;

/// Entry point used when the user opens or leaves the stylist view.
///
/// A session is tied to its contextual product: entering with a different
/// product (or none, after a product) discards the old transcript.
pub struct StylistHost {
    provider: Arc<dyn ModelProvider>,
    catalog: Catalog,
    settings: SessionSettings,
    observer: Option<SessionObserver>,
    session: Option<StylistSession>,
}

impl StylistHost {
    pub fn new(provider: Arc<dyn ModelProvider>, catalog: Catalog, settings: SessionSettings) -> Self {
        Self {
            provider,
            catalog,
            settings,
            observer: None,
            session: None,
        }
    }

    /// Observer attached to every session this host creates.
    pub fn with_observer(mut self, observer: SessionObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> Option<&StylistSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut StylistSession> {
        self.session.as_mut()
    }

    /// Enter the stylist view. Re-entering with the same contextual product
    /// keeps the live session; anything else starts a fresh, opened one.
    pub async fn enter_stylist(&mut self, product: Option<Product>) -> &mut StylistSession {
        let wanted = product.as_ref().map(|p| p.id);
        let session = match self.session.take() {
            Some(existing) if existing.product().map(|p| p.id) == wanted => existing,
            previous => {
                if previous.is_some() {
                    info!("contextual product changed, starting a fresh stylist session");
                }
                drop(previous);
                let mut fresh = StylistSession::new(
                    self.provider.clone(),
                    &self.catalog,
                    product,
                    self.settings.clone(),
                );
                if let Some(observer) = &self.observer {
                    fresh = fresh.with_observer(observer.clone());
                }
                fresh.open().await;
                fresh
            }
        };
        self.session.insert(session)
    }

    /// Like [`StylistHost::enter_stylist`], looking the product up by id.
    pub async fn enter_with_product_id(
        &mut self,
        product_id: Option<u32>,
    ) -> Result<&mut StylistSession, LumiereError> {
        let product = match product_id {
            Some(id) => Some(self.catalog.get(id)?.clone()),
            None => None,
        };
        Ok(self.enter_stylist(product).await)
    }

    /// Leave the stylist view, discarding the session and its transcript.
    pub fn leave_stylist(&mut self) {
        if self.session.take().is_some() {
            info!("stylist session torn down");
        }
    }
}
