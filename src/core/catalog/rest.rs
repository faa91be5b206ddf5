//! Catalog provider backed by a hosted PostgREST (Supabase) project.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::provider::category_name;
use super::{CatalogError, CatalogItem, CatalogProvider, Category, ItemDraft, Result};
use crate::config::BackendConfig;

const ITEMS_PATH: &str = "rest/v1/items";
const CATEGORIES_PATH: &str = "rest/v1/item_categories";
/// Embeds the resolved category on every item row.
const ITEMS_SELECT: &str = "*,category:item_categories(id,name)";

/// REST catalog provider.
pub struct RestCatalogProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestCatalogProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CatalogError::Config("backend url is empty".into()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            client,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| CatalogError::Config("backend.url is not set".into()))?;
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| CatalogError::Config("backend.api_key is not set".into()))?;
        Self::new(url, key, Duration::from_secs(config.timeout_secs))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Map non-success statuses to `CatalogError::Api`.
    async fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(CatalogError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CatalogProvider for RestCatalogProvider {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn get_items(&self) -> Result<Vec<CatalogItem>> {
        let resp = self
            .authorized(self.client.get(self.url(ITEMS_PATH)))
            .query(&[("select", ITEMS_SELECT)])
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        let items: Vec<CatalogItem> = serde_json::from_str(&body)?;
        log::debug!("Fetched {} catalog items", items.len());
        Ok(items)
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        let resp = self
            .authorized(self.client.get(self.url(CATEGORIES_PATH)))
            .query(&[("select", "id,name"), ("order", "name.asc")])
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_item(&self, draft: ItemDraft) -> Result<CatalogItem> {
        let draft = draft.validate()?;
        let resp = self
            .authorized(self.client.post(self.url(ITEMS_PATH)))
            .query(&[("select", ITEMS_SELECT)])
            .header("Prefer", "return=representation")
            .json(&draft)
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        // PostgREST answers inserts with an array of the written rows
        let mut rows: Vec<CatalogItem> = serde_json::from_str(&body)?;
        if rows.is_empty() {
            return Err(CatalogError::Unavailable(
                "insert returned no rows".to_string(),
            ));
        }
        Ok(rows.remove(0))
    }

    async fn update_item(&self, id: &str, draft: ItemDraft) -> Result<CatalogItem> {
        let draft = draft.validate()?;
        let filter = format!("eq.{id}");
        let resp = self
            .authorized(self.client.patch(self.url(ITEMS_PATH)))
            .query(&[("id", filter.as_str()), ("select", ITEMS_SELECT)])
            .header("Prefer", "return=representation")
            .json(&draft)
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        // An update that matched nothing comes back as an empty array
        let mut rows: Vec<CatalogItem> = serde_json::from_str(&body)?;
        if rows.is_empty() {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        log::debug!("Updated catalog item {id}");
        Ok(rows.remove(0))
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        let name = category_name(name)?;
        let resp = self
            .authorized(self.client.post(self.url(CATEGORIES_PATH)))
            .query(&[("select", "id,name")])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        let mut rows: Vec<Category> = serde_json::from_str(&body)?;
        if rows.is_empty() {
            return Err(CatalogError::Unavailable(
                "insert returned no rows".to_string(),
            ));
        }
        Ok(rows.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider =
            RestCatalogProvider::new("https://x.supabase.co/", "key", Duration::from_secs(1)).unwrap();
        assert_eq!(provider.url(ITEMS_PATH), "https://x.supabase.co/rest/v1/items");
    }

    #[test]
    fn test_empty_url_is_config_error() {
        let err = RestCatalogProvider::new("", "key", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = BackendConfig {
            url: Some("https://x.supabase.co".into()),
            api_key: None,
            timeout_secs: 5,
        };
        assert!(matches!(
            RestCatalogProvider::from_config(&config),
            Err(CatalogError::Config(_))
        ));
    }
}
