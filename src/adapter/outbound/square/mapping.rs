//! Square payloads to warehouse entities.

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use super::dto::{
    dollars, CatalogObject, SquareCustomer, SquareLineItem, SquareLocation, SquareOrder,
    SquareTender,
};
use crate::domain::entity::{Customer, InventoryItem, Location, Order, OrderItem, Payment, RowId};
use crate::error::{Error, Result};

pub const LOCATION_TYPE: &str = "square_location";
pub const ORDER_SOURCE: &str = "square_pos";
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Parse an RFC 3339 timestamp into naive UTC.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_utc())
        .map_err(|err| Error::Parse(format!("invalid timestamp '{raw}': {err}")))
}

#[must_use]
pub fn location(source: &SquareLocation) -> Location {
    let address = source.address.clone().unwrap_or_default();
    Location {
        square_location_id: source.id.clone(),
        location_name: source.name.clone().unwrap_or_default(),
        location_type: LOCATION_TYPE.into(),
        address: address.address_line_1,
        city: address.locality,
        state_province: address.administrative_district_level_1,
        country: address.country,
        postal_code: address.postal_code,
        is_active: source.status.as_deref() == Some("ACTIVE"),
    }
}

/// Unparseable creation dates are dropped rather than failing the customer.
#[must_use]
pub fn customer(source: &SquareCustomer) -> Customer {
    let created_at = source.created_at.as_deref().and_then(|raw| {
        parse_timestamp(raw)
            .map_err(|err| debug!(customer = %source.id, error = %err, "Ignoring creation date"))
            .ok()
    });
    Customer {
        square_customer_id: source.id.clone(),
        first_name: source.given_name.clone(),
        last_name: source.family_name.clone(),
        email: source.email_address.clone(),
        phone: source.phone_number.clone(),
        created_at,
    }
}

/// One inventory row per `ITEM_VARIATION` of an `ITEM` object.
#[must_use]
pub fn catalog_items(source: &CatalogObject) -> Vec<InventoryItem> {
    if source.object_type != "ITEM" {
        return Vec::new();
    }
    let Some(item) = source.item_data.as_ref() else {
        return Vec::new();
    };

    let category = item
        .categories
        .first()
        .map(|category| category.id.clone())
        .or_else(|| item.category_id.clone())
        .unwrap_or_else(|| DEFAULT_CATEGORY.into());

    item.variations
        .iter()
        .filter(|variation| variation.object_type == "ITEM_VARIATION")
        .filter_map(|variation| {
            let data = variation.item_variation_data.as_ref()?;
            let sku = data
                .sku
                .clone()
                .filter(|sku| !sku.is_empty())
                .unwrap_or_else(|| format!("auto_{}", variation.id));
            Some(InventoryItem {
                square_catalog_id: variation.id.clone(),
                item_name: item
                    .name
                    .clone()
                    .or_else(|| data.name.clone())
                    .unwrap_or_default(),
                sku,
                selling_price: dollars(data.price_money),
                category: category.clone(),
            })
        })
        .collect()
}

/// Map an order whose customer and location keys are already resolved.
pub fn order(
    source: &SquareOrder,
    customer_id: Option<RowId>,
    location_id: Option<RowId>,
) -> Result<Order> {
    let total_amount = dollars(source.total_money);
    let tax_amount = dollars(source.total_tax_money);
    let tip_amount = dollars(source.total_tip_money);

    Ok(Order {
        square_order_id: source.id.clone(),
        customer_id,
        location_id,
        order_date: parse_timestamp(&source.created_at)?,
        order_status: source
            .state
            .as_deref()
            .map_or_else(|| "unknown".to_string(), str::to_lowercase),
        subtotal: total_amount - tax_amount - tip_amount,
        tax_amount,
        discount_amount: dollars(source.total_discount_money),
        tip_amount,
        total_amount,
        order_source: ORDER_SOURCE.into(),
    })
}

/// Line items without a `uid` are keyed by their position in the order.
#[must_use]
pub fn order_item(
    order_id: RowId,
    position: usize,
    source: &SquareLineItem,
    item_id: Option<RowId>,
) -> OrderItem {
    OrderItem {
        order_id,
        line_item_uid: source
            .uid
            .clone()
            .unwrap_or_else(|| format!("line-{position}")),
        item_id,
        quantity: quantity(source.quantity.as_deref()),
        unit_price: dollars(source.base_price_money),
        discount_amount: dollars(source.total_discount_money),
        total_price: dollars(source.total_money),
    }
}

/// Square quantities are decimal strings; fractional units are truncated.
fn quantity(raw: Option<&str>) -> i32 {
    raw.and_then(|raw| {
        raw.parse::<i32>().ok().or_else(|| {
            raw.parse::<Decimal>()
                .ok()
                .and_then(|value| value.trunc().to_i32())
        })
    })
    .unwrap_or(1)
}

/// A tender becomes a completed payment with no fees recorded yet.
pub fn payment(order_id: RowId, source: &SquareTender, order_date: NaiveDateTime) -> Result<Payment> {
    let amount = dollars(source.amount_money);
    let payment_date = match source.created_at.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => order_date,
    };
    Ok(Payment {
        square_payment_id: source.id.clone(),
        order_id,
        payment_date,
        amount,
        payment_method: source
            .tender_type
            .as_deref()
            .map_or_else(|| "unknown".to_string(), str::to_lowercase),
        payment_status: "completed".into(),
        processing_fee: Decimal::ZERO,
        square_fee: Decimal::ZERO,
        net_amount: amount,
    })
}
