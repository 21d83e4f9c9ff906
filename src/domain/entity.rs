//! Warehouse entities written by the sync adapters.
//!
//! Each entity carries its external identifier (or natural composite key),
//! which the repository uses as the upsert conflict target.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

/// Surrogate key assigned by the warehouse.
pub type RowId = i32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub square_location_id: String,
    pub location_name: String,
    pub location_type: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub square_customer_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    pub square_catalog_id: String,
    pub item_name: String,
    pub sku: String,
    pub selling_price: Decimal,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub square_order_id: String,
    pub customer_id: Option<RowId>,
    pub location_id: Option<RowId>,
    pub order_date: NaiveDateTime,
    pub order_status: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub tip_amount: Decimal,
    pub total_amount: Decimal,
    pub order_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub order_id: RowId,
    /// Line item identifier within the order.
    pub line_item_uid: String,
    pub item_id: Option<RowId>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub square_payment_id: String,
    pub order_id: RowId,
    pub payment_date: NaiveDateTime,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
    pub processing_fee: Decimal,
    pub square_fee: Decimal,
    pub net_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Tiktok,
}

impl Platform {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Tiktok => "tiktok",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialAccount {
    pub platform: Platform,
    pub account_handle: String,
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub account_id: RowId,
    pub platform_post_id: String,
    pub post_type: Option<String>,
    pub caption: Option<String>,
    pub post_url: Option<String>,
    pub posted_date: NaiveDateTime,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostMetric {
    pub post_id: RowId,
    pub metric_date: NaiveDate,
    pub likes: i32,
    pub comments: i32,
    pub shares: i32,
    pub engagement_rate: Decimal,
}

/// External identifiers the adapters resolve to surrogate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalRef<'a> {
    Location(&'a str),
    Customer(&'a str),
    CatalogItem(&'a str),
    Order(&'a str),
}
