use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::catalog::{CatalogProvider, Category, RestCatalogProvider, StaticCatalog};

use super::events::AppEvent;

/// Centralized handle to the backend collaborators.
///
/// Created once at startup, then passed by ref to views that need backend
/// access. The provider is shared behind an `Arc` so spawned fetch tasks
/// can hold it.
pub struct Services {
    pub catalog: Arc<dyn CatalogProvider>,
    /// Category list, loaded once at startup.
    pub categories: Vec<Category>,
    /// Currency code for the invoice being drafted.
    pub currency: String,
    /// Default tax percentage for new invoices.
    pub tax_rate: Decimal,
    /// Width below which overlays render as a bottom drawer.
    pub narrow_below: u16,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    /// Initialize services from config.
    ///
    /// A malformed backend config is fatal. A failed category load is not:
    /// the picker still works with only the "All Categories" facet.
    pub async fn init(
        config: &AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let catalog: Arc<dyn CatalogProvider> = match config.backend.url.as_deref() {
            Some(url) if !url.trim().is_empty() => {
                let provider = RestCatalogProvider::from_config(&config.backend)?;
                log::info!("Catalog backend: {url}");
                Arc::new(provider)
            }
            _ => {
                log::info!("No backend configured, using demo catalog");
                Arc::new(StaticCatalog::demo())
            }
        };

        let categories = load_categories(catalog.as_ref()).await;

        Ok(Self {
            catalog,
            categories,
            currency: config.invoice.currency.clone(),
            tax_rate: config.invoice.tax_rate,
            narrow_below: config.tui.narrow_below,
            event_tx,
        })
    }

    /// Build services around an explicit provider (tests, headless runs).
    pub async fn with_provider(
        catalog: Arc<dyn CatalogProvider>,
        currency: impl Into<String>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let categories = load_categories(catalog.as_ref()).await;
        Self {
            catalog,
            categories,
            currency: currency.into(),
            tax_rate: Decimal::ZERO,
            narrow_below: crate::tui::layout::DEFAULT_NARROW_BELOW,
            event_tx,
        }
    }
}

async fn load_categories(catalog: &dyn CatalogProvider) -> Vec<Category> {
    match catalog.get_categories().await {
        Ok(categories) => {
            log::info!("Loaded {} categories from {}", categories.len(), catalog.name());
            categories
        }
        Err(e) => {
            log::warn!("Failed to load categories: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::provider::MockCatalogProvider;
    use crate::core::catalog::CatalogError;

    #[tokio::test]
    async fn test_init_without_backend_uses_demo_catalog() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let services = Services::init(&AppConfig::default(), tx).await.unwrap();
        assert_eq!(services.catalog.name(), "static");
        assert_eq!(services.categories.len(), 3);
        assert_eq!(services.currency, "USD");
    }

    #[tokio::test]
    async fn test_category_failure_is_not_fatal() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_get_categories()
            .returning(|| Err(CatalogError::Unavailable("down".into())));

        let (tx, _rx) = mpsc::unbounded_channel();
        let services = Services::with_provider(Arc::new(provider), "EUR", tx).await;
        assert!(services.categories.is_empty());
        assert_eq!(services.currency, "EUR");
    }
}
