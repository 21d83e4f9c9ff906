//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{
    customers, inventory_items, locations, order_items, orders, payments, social_media_accounts,
    social_media_metrics, social_media_posts,
};

/// Database row for a location (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = locations)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewLocationRow {
    pub square_location_id: String,
    pub location_name: String,
    pub location_type: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub is_active: bool,
    pub updated_at: String,
}

/// Database row for a customer (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = customers)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewCustomerRow {
    pub square_customer_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Database row for a catalog variation (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = inventory_items)]
pub struct NewInventoryItemRow {
    pub square_catalog_id: String,
    pub item_name: String,
    pub sku: String,
    pub selling_price: String,
    pub category: String,
    pub updated_at: String,
}

/// Database row for an order (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewOrderRow {
    pub square_order_id: String,
    pub customer_id: Option<i32>,
    pub location_id: Option<i32>,
    pub order_date: String,
    pub order_status: String,
    pub subtotal: String,
    pub tax_amount: String,
    pub discount_amount: String,
    pub tip_amount: String,
    pub total_amount: String,
    pub order_source: String,
    pub updated_at: String,
}

/// Database row for an order line (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = order_items)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewOrderItemRow {
    pub order_id: i32,
    pub line_item_uid: String,
    pub item_id: Option<i32>,
    pub quantity: i32,
    pub unit_price: String,
    pub discount_amount: String,
    pub total_price: String,
}

/// Database row for a payment (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = payments)]
pub struct NewPaymentRow {
    pub square_payment_id: String,
    pub order_id: i32,
    pub payment_date: String,
    pub amount: String,
    pub payment_method: String,
    pub payment_status: String,
    pub processing_fee: String,
    pub square_fee: String,
    pub net_amount: String,
    pub updated_at: String,
}

/// Database row for a social account (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = social_media_accounts)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewSocialAccountRow {
    pub platform: String,
    pub account_handle: String,
    pub account_name: Option<String>,
    pub updated_at: String,
}

/// Database row for a social post (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = social_media_posts)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewPostRow {
    pub account_id: i32,
    pub platform_post_id: String,
    pub post_type: Option<String>,
    pub caption: Option<String>,
    pub post_url: Option<String>,
    pub posted_date: String,
    pub hashtags: String,
    pub mentions: String,
    pub updated_at: String,
}

/// Database row for a daily post metric (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = social_media_metrics)]
pub struct NewPostMetricRow {
    pub post_id: i32,
    pub metric_date: String,
    pub likes: i32,
    pub comments: i32,
    pub shares: i32,
    pub engagement_rate: String,
    pub updated_at: String,
}

/// A completed order as seen by the customer aggregate refresh.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompletedOrderRow {
    pub customer_id: Option<i32>,
    pub order_date: String,
    pub total_amount: String,
}
