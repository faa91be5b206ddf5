//! Catalog provider contract and the in-memory implementation used for
//! demo mode and tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::{CatalogError, CatalogItem, Category, ItemDraft, ItemType, Result};

/// Data access for catalog items and categories.
///
/// `get_items` returns the whole collection: no pagination, no partial
/// results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    async fn get_items(&self) -> Result<Vec<CatalogItem>>;

    async fn get_categories(&self) -> Result<Vec<Category>>;

    async fn create_item(&self, draft: ItemDraft) -> Result<CatalogItem>;

    /// Replace the editable fields of item `id`.
    async fn update_item(&self, id: &str, draft: ItemDraft) -> Result<CatalogItem>;

    async fn create_category(&self, name: &str) -> Result<Category>;
}

/// Trim a new category name and reject blanks.
pub(crate) fn category_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation("category name is required".into()));
    }
    Ok(name.to_string())
}

/// In-memory catalog. Items keep insertion order.
pub struct StaticCatalog {
    items: RwLock<Vec<CatalogItem>>,
    categories: RwLock<Vec<Category>>,
    offline: RwLock<bool>,
}

impl StaticCatalog {
    pub fn new(items: Vec<CatalogItem>, categories: Vec<Category>) -> Self {
        Self {
            items: RwLock::new(items),
            categories: RwLock::new(categories),
            offline: RwLock::new(false),
        }
    }

    /// Small sample catalog for running without a backend.
    pub fn demo() -> Self {
        let labour = Category::new("cat-labour", "Labour");
        let parts = Category::new("cat-parts", "Parts");
        let software = Category::new("cat-software", "Software");

        let items = vec![
            CatalogItem::new("item-consulting", "Consulting Hour", ItemType::Service)
                .with_description("On-site or remote advisory, billed hourly")
                .with_category(labour.clone())
                .with_sale_price(Decimal::new(12000, 2)),
            CatalogItem::new("item-install", "Installation", ItemType::Service)
                .with_description("Fitting and commissioning of supplied hardware")
                .with_category(labour.clone())
                .with_sale_price(Decimal::new(25000, 2)),
            CatalogItem::new("item-callout", "Call-out Fee", ItemType::Service)
                .with_category(labour.clone()),
            CatalogItem::new("item-widget", "Widget", ItemType::Product)
                .with_description("Standard steel widget, 40mm")
                .with_category(parts.clone())
                .with_sale_price(Decimal::new(1999, 2)),
            CatalogItem::new("item-gasket", "Gasket", ItemType::Product)
                .with_description("Rubber seal for widget housings")
                .with_category(parts.clone())
                .with_sale_price(Decimal::new(350, 2)),
            CatalogItem::new("item-cable", "Cable, 5m", ItemType::Product)
                .with_category(parts.clone())
                .with_sale_price(Decimal::new(1250, 2)),
            CatalogItem::new("item-license", "Annual License", ItemType::Service)
                .with_description("Twelve months of software updates and support")
                .with_category(software.clone())
                .with_sale_price(Decimal::new(149900, 2)),
            CatalogItem::new("item-sample", "Sample Pack", ItemType::Product)
                .with_description("Assorted offcuts, not for resale"),
        ];

        Self::new(items, vec![labour, parts, software])
    }

    /// Make every call fail until switched back; simulates an outage.
    pub async fn set_offline(&self, offline: bool) {
        *self.offline.write().await = offline;
    }

    async fn ensure_online(&self) -> Result<()> {
        if *self.offline.read().await {
            return Err(CatalogError::Unavailable("catalog is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn get_items(&self) -> Result<Vec<CatalogItem>> {
        self.ensure_online().await?;
        let categories = self.categories.read().await;
        let mut items = self.items.read().await.clone();
        for item in &mut items {
            item.resolve_category(&categories);
        }
        Ok(items)
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        self.ensure_online().await?;
        Ok(self.categories.read().await.clone())
    }

    async fn create_item(&self, draft: ItemDraft) -> Result<CatalogItem> {
        self.ensure_online().await?;
        let draft = draft.validate()?;
        let categories = self.categories.read().await;
        check_category(&draft, &categories)?;

        let mut item = CatalogItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            kind: draft.kind,
            category_id: draft.category_id,
            category: None,
            sale_price_enabled: draft.sale_price_enabled,
            sale_price: draft.sale_price,
        };
        item.resolve_category(&categories);
        self.items.write().await.push(item.clone());
        log::info!("Created catalog item {} ({})", item.name, item.id);
        Ok(item)
    }

    async fn update_item(&self, id: &str, draft: ItemDraft) -> Result<CatalogItem> {
        self.ensure_online().await?;
        let draft = draft.validate()?;
        let categories = self.categories.read().await;
        check_category(&draft, &categories)?;

        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        item.name = draft.name;
        item.description = draft.description;
        item.kind = draft.kind;
        item.category_id = draft.category_id;
        item.category = None;
        item.sale_price_enabled = draft.sale_price_enabled;
        item.sale_price = draft.sale_price;
        item.resolve_category(&categories);
        log::info!("Updated catalog item {} ({})", item.name, item.id);
        Ok(item.clone())
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        self.ensure_online().await?;
        let name = category_name(name)?;
        let mut categories = self.categories.write().await;
        if categories.iter().any(|c| c.name.eq_ignore_ascii_case(&name)) {
            return Err(CatalogError::Validation(format!(
                "category '{name}' already exists"
            )));
        }
        let category = Category::new(format!("cat-{}", uuid::Uuid::new_v4()), name);
        categories.push(category.clone());
        log::info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }
}

fn check_category(draft: &ItemDraft, categories: &[Category]) -> Result<()> {
    match &draft.category_id {
        Some(id) if !categories.iter().any(|c| &c.id == id) => {
            Err(CatalogError::Validation(format!("unknown category {id}")))
        }
        _ => Ok(()),
    }
}
