//! Square REST v2 client.
//!
//! Every request carries the bearer token and a pinned `Square-Version`
//! header. List endpoints are followed cursor by cursor until exhausted.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dto::{
    CatalogObject, ListCatalogResponse, ListCustomersResponse, ListLocationsResponse, OrderQuery,
    SearchOrdersRequest, SearchOrdersResponse, SquareCustomer, SquareLocation, SquareOrder,
};
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::SquareCredentials;

/// API version the DTOs are written against.
pub const SQUARE_VERSION: &str = "2024-06-04";

const PAGE_LIMIT: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SquareClient {
    http: HttpClient,
    base_url: String,
    access_token: String,
}

impl SquareClient {
    #[must_use]
    pub fn new(credentials: &SquareCredentials) -> Self {
        Self::with_base_url(
            credentials.environment.base_url(),
            credentials.access_token.clone(),
        )
    }

    /// Client against an explicit base URL.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, access_token: String) -> Self {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.access_token)
            .header("Square-Version", SQUARE_VERSION)
            .header("Accept", "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                service: "square",
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn list_locations(&self) -> Result<Vec<SquareLocation>> {
        let response: ListLocationsResponse =
            self.send(self.http.get(self.url("/v2/locations"))).await?;
        debug!(count = response.locations.len(), "Fetched Square locations");
        Ok(response.locations)
    }

    /// Ping the API with a locations request bounded by `timeout`.
    pub async fn ping(&self, timeout: Duration) -> Result<()> {
        let request = self.http.get(self.url("/v2/locations")).timeout(timeout);
        let _: ListLocationsResponse = self.send(request).await?;
        Ok(())
    }

    pub async fn list_customers(&self) -> Result<Vec<SquareCustomer>> {
        let mut customers = Vec::new();
        let mut cursor: Option<String> = None;
        let limit = PAGE_LIMIT.to_string();

        loop {
            let mut query = vec![
                ("limit", limit.as_str()),
                ("sort_field", "DEFAULT"),
                ("sort_order", "DESC"),
            ];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("cursor", cursor));
            }
            let request = self.http.get(self.url("/v2/customers")).query(&query);
            let page: ListCustomersResponse = self.send(request).await?;
            debug!(count = page.customers.len(), "Fetched Square customer page");
            customers.extend(page.customers);

            match page.cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(customers),
            }
        }
    }

    /// Catalog objects of type `ITEM`, with their variations inline.
    pub async fn list_catalog_items(&self) -> Result<Vec<CatalogObject>> {
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("types", "ITEM")];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("cursor", cursor));
            }
            let request = self.http.get(self.url("/v2/catalog/list")).query(&query);
            let page: ListCatalogResponse = self.send(request).await?;
            debug!(count = page.objects.len(), "Fetched Square catalog page");
            objects.extend(page.objects);

            match page.cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(objects),
            }
        }
    }

    /// Completed and canceled orders closed between `start` and `end`.
    pub async fn search_orders(
        &self,
        location_ids: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SquareOrder>> {
        let mut orders = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = SearchOrdersRequest {
                location_ids,
                query: OrderQuery::closed_between(start, end),
                limit: PAGE_LIMIT,
                cursor: cursor.as_deref(),
            };
            let request = self.http.post(self.url("/v2/orders/search")).json(&body);
            let page: SearchOrdersResponse = self.send(request).await?;
            debug!(count = page.orders.len(), "Fetched Square order page");
            orders.extend(page.orders);

            match page.cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(orders),
            }
        }
    }
}
