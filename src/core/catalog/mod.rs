//! Catalog data model: sellable items, their categories, and the payload
//! used to create new items.

pub mod cache;
pub mod error;
pub mod filter;
pub mod provider;
pub mod rest;

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use cache::CatalogCache;
pub use error::{CatalogError, Result};
pub use filter::{filter_items, CategoryFacet, FilterState, FilteredView, TypeFacet, ViewMode};
pub use provider::{CatalogProvider, StaticCatalog};
pub use rest::RestCatalogProvider;

/// Whether an item is a physical product or a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Product,
    Service,
}

impl ItemType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Service => "Service",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Product => "📦",
            Self::Service => "✨",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Product => Self::Service,
            Self::Service => Self::Product,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Product => "product",
            Self::Service => "service",
        })
    }
}

/// Item category, used both for display and as the category facet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A sellable product or service that can be added as an invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ItemType,
    #[serde(default)]
    pub category_id: Option<String>,
    /// Resolved category, embedded by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(rename = "enable_sale_info", default)]
    pub sale_price_enabled: bool,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            kind,
            category_id: None,
            category: None,
            sale_price_enabled: false,
            sale_price: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a category; sets both the id and the resolved display value.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category_id = Some(category.id.clone());
        self.category = Some(category);
        self
    }

    pub fn with_sale_price(mut self, price: Decimal) -> Self {
        self.sale_price_enabled = true;
        self.sale_price = Some(price);
        self
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// The price to show, only when sale info is enabled.
    pub fn display_price(&self) -> Option<Decimal> {
        if self.sale_price_enabled {
            self.sale_price
        } else {
            None
        }
    }

    /// Fill in `category` from `categories` when only the id is known.
    pub fn resolve_category(&mut self, categories: &[Category]) {
        if self.category.is_some() {
            return;
        }
        if let Some(id) = &self.category_id {
            self.category = categories.iter().find(|c| &c.id == id).cloned();
        }
    }
}

/// Payload for creating a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub category_id: Option<String>,
    #[serde(rename = "enable_sale_info")]
    pub sale_price_enabled: bool,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, kind: ItemType) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            category_id: None,
            sale_price_enabled: false,
            sale_price: None,
        }
    }

    /// Trim text fields and check required values.
    pub fn validate(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(CatalogError::Validation("name is required".into()));
        }
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(price) = self.sale_price {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(CatalogError::Validation(format!(
                    "sale price must be non-negative, got {price}"
                )));
            }
        }
        if self.sale_price_enabled && self.sale_price.is_none() {
            return Err(CatalogError::Validation(
                "sale price is required when sale info is enabled".into(),
            ));
        }
        Ok(self)
    }
}
