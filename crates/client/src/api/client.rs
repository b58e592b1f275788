//! HTTP implementation of [`MarketplaceApi`].

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use souk_core::{Autocomplete, CACHE_EXPIRY, ProductId, Shop};
use tracing::{debug, error, instrument};
use url::Url;

use super::conversions::{
    convert_autocomplete, convert_product_detail, convert_products, convert_search_results,
    convert_shops,
};
use super::types::{
    NearbyQuery, ProductDetail, ProductPage, ProductQuery, PushRegistration, SearchPage,
    SearchRequest,
};
use super::wire::{
    Ack, ApiResponse, WireAutocomplete, WireProductDetail, WireProductList, WirePushToken,
    WireSearchResults, WireShopList,
};
use super::{ApiError, MarketplaceApi};
use crate::config::ApiConfig;

/// Longest slice of an error body kept in logs and errors.
const ERROR_BODY_LIMIT: usize = 200;

// =============================================================================
// HttpApiClient
// =============================================================================

/// Client for the marketplace REST backend.
///
/// Cheaply cloneable. Product details are cached for 5 minutes.
#[derive(Clone)]
pub struct HttpApiClient {
    inner: Arc<HttpApiClientInner>,
}

struct HttpApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    details: Cache<ProductId, ProductDetail>,
}

impl HttpApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let details = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_EXPIRY)
            .build();

        Ok(Self {
            inner: Arc::new(HttpApiClientInner {
                client,
                base_url: config.base_url.clone(),
                details,
            }),
        })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop the cached detail for one product.
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.inner.details.invalidate(id).await;
    }

    /// Drop every cached product detail.
    pub fn invalidate_all(&self) {
        self.inner.details.invalidate_all();
    }

    /// Resolve `path` under the base URL and append query parameters.
    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Check the status, parse the envelope and unwrap the payload.
    async fn read_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            error!(status = %status, body = %snippet, "Backend returned non-success status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: snippet,
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })?;

        envelope.into_result()
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(url = %url, "GET");
        let response = self.inner.client.get(url).send().await?;
        Self::read_response(response).await
    }
}

impl MarketplaceApi for HttpApiClient {
    #[instrument(skip(self), fields(page = query.page, category = ?query.category))]
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }

        let url = self.endpoint("products", &params)?;
        let list: WireProductList = self.get(url).await?;

        let products = convert_products(list.products);
        debug!(count = products.len(), "Fetched product page");

        Ok(ProductPage {
            total_pages: list.total_pages.unwrap_or(query.page),
            products,
        })
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product_detail(&self, id: &ProductId) -> Result<ProductDetail, ApiError> {
        if let Some(detail) = self.inner.details.get(id).await {
            debug!("Cache hit for product detail");
            return Ok(detail);
        }

        let mut url = self.endpoint("products/discover/product/", &[])?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(id.as_str());

        let wire: WireProductDetail = match self.get(url).await {
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(ApiError::NotFound(format!("Product not found: {id}")));
            }
            other => other?,
        };
        let detail = convert_product_detail(wire)?;

        self.inner.details.insert(id.clone(), detail.clone()).await;

        Ok(detail)
    }

    #[instrument(skip(self), fields(lat = query.origin.latitude, lng = query.origin.longitude))]
    async fn nearby_shops(&self, query: &NearbyQuery) -> Result<Vec<Shop>, ApiError> {
        let params = [
            ("latitude", query.origin.latitude.to_string()),
            ("longitude", query.origin.longitude.to_string()),
            ("radius", query.radius_km.to_string()),
        ];
        let url = self.endpoint("boutique/premium/discover/nearby", &params)?;
        let list: WireShopList = self.get(url).await?;

        Ok(convert_shops(list.shops))
    }

    #[instrument(skip(self), fields(query = %request.query, page = request.page))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ApiError> {
        let mut params = vec![
            ("q", request.query.clone()),
            ("page", request.page.to_string()),
            ("limit", request.limit.to_string()),
            ("sort_by", request.sort_by.as_param().to_string()),
        ];
        params.extend(request.filters.query_pairs());

        let url = self.endpoint("search/search", &params)?;
        let results: WireSearchResults = self.get(url).await?;

        Ok(convert_search_results(results, request.page))
    }

    #[instrument(skip(self))]
    async fn autocomplete(&self, query: &str) -> Result<Autocomplete, ApiError> {
        let url = self.endpoint("search/autocomplete", &[("q", query.to_string())])?;
        let wire: WireAutocomplete = self.get(url).await?;

        Ok(convert_autocomplete(wire))
    }

    #[instrument(skip(self, registration), fields(user_id = ?registration.user_id))]
    async fn register_push_token(&self, registration: &PushRegistration) -> Result<(), ApiError> {
        let url = self.endpoint("save-fcm-token", &[])?;
        let body = WirePushToken {
            user_id: registration.user_id.map(i64::from),
            fcm_token: registration.token.expose_secret(),
        };

        let response = self.inner.client.post(url).json(&body).send().await?;
        let _: Ack = Self::read_response(response).await?;

        debug!("Push token registered");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> HttpApiClient {
        HttpApiClient::new(&ApiConfig::new(base, Duration::from_secs(5)).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://api.example.com/v1");
        let url = api
            .endpoint("products", &[("page", "2".to_string()), ("limit", "10".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/products?page=2&limit=10");
    }

    #[test]
    fn test_endpoint_without_params_has_no_query() {
        let api = client("https://api.example.com/");
        let url = api.endpoint("save-fcm-token", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/save-fcm-token");
    }

    #[test]
    fn test_endpoint_encodes_query_values() {
        let api = client("https://api.example.com/");
        let url = api
            .endpoint("search/search", &[("q", "lamp & shade".to_string())])
            .unwrap();
        assert_eq!(url.query(), Some("q=lamp+%26+shade"));
    }
}
