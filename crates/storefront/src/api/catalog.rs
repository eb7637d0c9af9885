//! Catalog endpoints: listing, details, categories and the validity check.

use std::collections::HashSet;

use paperclip_core::{Product, ProductId, ProductPage, ProductQuery};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{ApiClient, ApiError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest<'a> {
    product_ids: &'a [ProductId],
}

/// Answer of the batched product validity check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductValidation {
    #[serde(default)]
    pub valid_ids: Vec<ProductId>,
    #[serde(default)]
    pub deleted_ids: Vec<ProductId>,
}

impl ApiClient {
    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get one page of the catalog.
    ///
    /// # Errors
    ///
    /// Returns a validation error (without making a request) for an
    /// inconsistent query, or an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        query.validate()?;

        let cache_key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let call = self.call_with_query(Method::GET, &["products"], &query.to_query_pairs())?;
        let page: ProductPage = self.fetch(call).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(page.clone()))
            .await;

        Ok(page)
    }

    /// Get a product by its server id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&["products", id.as_str()]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the category names used by the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<String> = self.get(&["products", "categories"]).await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Ask the server which of `ids` no longer exist.
    ///
    /// An empty input returns an empty set without a request. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn deleted_products(&self, ids: &[ProductId]) -> Result<HashSet<ProductId>, ApiError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let validation: ProductValidation = self
            .send_json(
                Method::POST,
                &["products", "validate"],
                &ValidateRequest { product_ids: ids },
            )
            .await?;

        debug!(
            valid = validation.valid_ids.len(),
            deleted = validation.deleted_ids.len(),
            "Product validity checked"
        );
        Ok(validation.deleted_ids.into_iter().collect())
    }
}
