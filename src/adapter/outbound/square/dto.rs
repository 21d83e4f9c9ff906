//! Square REST v2 wire types.
//!
//! Only the fields the warehouse uses are modelled; everything else in the
//! payloads is ignored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amount in the smallest currency unit.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Money {
    #[serde(default)]
    pub amount: i64,
}

impl Money {
    /// Amount in whole currency units (cents / 100).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.amount, 2)
    }
}

/// Dollar value of optional money; absent money is zero.
#[must_use]
pub fn dollars(money: Option<Money>) -> Decimal {
    money.map_or(Decimal::ZERO, Money::to_decimal)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub address_line_1: Option<String>,
    pub locality: Option<String>,
    pub administrative_district_level_1: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquareLocation {
    pub id: String,
    pub name: Option<String>,
    pub address: Option<Address>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListLocationsResponse {
    #[serde(default)]
    pub locations: Vec<SquareLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquareCustomer {
    pub id: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListCustomersResponse {
    #[serde(default)]
    pub customers: Vec<SquareCustomer>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogItem {
    pub name: Option<String>,
    #[serde(default)]
    pub variations: Vec<CatalogObject>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    /// Older catalog payloads carry a single category id instead.
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogItemVariation {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price_money: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    pub item_data: Option<CatalogItem>,
    pub item_variation_data: Option<CatalogItemVariation>,
}

#[derive(Debug, Deserialize)]
pub struct ListCatalogResponse {
    #[serde(default)]
    pub objects: Vec<CatalogObject>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquareLineItem {
    pub uid: Option<String>,
    pub catalog_object_id: Option<String>,
    pub quantity: Option<String>,
    pub base_price_money: Option<Money>,
    pub total_discount_money: Option<Money>,
    pub total_money: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquareTender {
    pub id: String,
    pub created_at: Option<String>,
    pub amount_money: Option<Money>,
    #[serde(rename = "type")]
    pub tender_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquareOrder {
    pub id: String,
    pub customer_id: Option<String>,
    pub location_id: Option<String>,
    pub created_at: String,
    pub state: Option<String>,
    pub total_money: Option<Money>,
    pub total_tax_money: Option<Money>,
    pub total_discount_money: Option<Money>,
    pub total_tip_money: Option<Money>,
    #[serde(default)]
    pub line_items: Vec<SquareLineItem>,
    #[serde(default)]
    pub tenders: Vec<SquareTender>,
}

#[derive(Debug, Deserialize)]
pub struct SearchOrdersResponse {
    #[serde(default)]
    pub orders: Vec<SquareOrder>,
    pub cursor: Option<String>,
}

/// `POST /v2/orders/search` body.
#[derive(Debug, Serialize)]
pub struct SearchOrdersRequest<'a> {
    pub location_ids: &'a [String],
    pub query: OrderQuery,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct OrderQuery {
    pub filter: OrderFilter,
    pub sort: OrderSort,
}

#[derive(Debug, Serialize)]
pub struct OrderFilter {
    pub date_time_filter: DateTimeFilter,
    pub state_filter: StateFilter,
}

#[derive(Debug, Serialize)]
pub struct DateTimeFilter {
    pub closed_at: TimeRange,
}

#[derive(Debug, Serialize)]
pub struct TimeRange {
    pub start_at: String,
    pub end_at: String,
}

#[derive(Debug, Serialize)]
pub struct StateFilter {
    pub states: [&'static str; 2],
}

#[derive(Debug, Serialize)]
pub struct OrderSort {
    pub sort_field: &'static str,
    pub sort_order: &'static str,
}

impl OrderQuery {
    /// Completed and canceled orders closed in `[start, end]`, newest first.
    #[must_use]
    pub fn closed_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            filter: OrderFilter {
                date_time_filter: DateTimeFilter {
                    closed_at: TimeRange {
                        start_at: start.to_rfc3339(),
                        end_at: end.to_rfc3339(),
                    },
                },
                state_filter: StateFilter {
                    states: ["COMPLETED", "CANCELED"],
                },
            },
            sort: OrderSort {
                sort_field: "CLOSED_AT",
                sort_order: "DESC",
            },
        }
    }
}
