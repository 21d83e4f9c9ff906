//! Square sync adapter.
//!
//! Each step fetches everything it needs first, then writes it in a single
//! warehouse transaction, so a failed step leaves no partial rows behind.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};

use super::client::SquareClient;
use super::dto::{CatalogObject, SquareCustomer, SquareLocation, SquareOrder};
use super::mapping;
use crate::domain::entity::ExternalRef;
use crate::error::Result;
use crate::port::outbound::sync::{SyncAdapter, SyncResource};
use crate::port::outbound::warehouse::{in_transaction, Warehouse, WarehouseProvider};

/// Rows written by one order sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderCounts {
    pub orders: usize,
    pub order_items: usize,
    pub payments: usize,
}

pub fn apply_locations<W: Warehouse>(warehouse: &mut W, locations: &[SquareLocation]) -> Result<usize> {
    for location in locations {
        warehouse.upsert(&mapping::location(location))?;
    }
    Ok(locations.len())
}

pub fn apply_customers<W: Warehouse>(warehouse: &mut W, customers: &[SquareCustomer]) -> Result<usize> {
    for customer in customers {
        warehouse.upsert(&mapping::customer(customer))?;
    }
    Ok(customers.len())
}

/// Returns the number of variations written.
pub fn apply_catalog<W: Warehouse>(warehouse: &mut W, objects: &[CatalogObject]) -> Result<usize> {
    let mut written = 0;
    for item in objects.iter().flat_map(mapping::catalog_items) {
        warehouse.upsert(&item)?;
        written += 1;
    }
    Ok(written)
}

/// Write orders with their line items and tenders.
///
/// Customer, location and catalog references that are not in the warehouse
/// yet are stored as empty references.
pub fn apply_orders<W: Warehouse>(warehouse: &mut W, orders: &[SquareOrder]) -> Result<OrderCounts> {
    let mut counts = OrderCounts::default();

    for source in orders {
        let customer_id = match source.customer_id.as_deref() {
            Some(id) => warehouse.resolve(ExternalRef::Customer(id))?,
            None => None,
        };
        let location_id = match source.location_id.as_deref() {
            Some(id) => warehouse.resolve(ExternalRef::Location(id))?,
            None => None,
        };
        let order = mapping::order(source, customer_id, location_id)?;
        let order_id = warehouse.upsert(&order)?;
        counts.orders += 1;

        for (position, line_item) in source.line_items.iter().enumerate() {
            let item_id = match line_item.catalog_object_id.as_deref() {
                Some(id) => warehouse.resolve(ExternalRef::CatalogItem(id))?,
                None => None,
            };
            warehouse.upsert(&mapping::order_item(order_id, position, line_item, item_id))?;
            counts.order_items += 1;
        }

        for tender in &source.tenders {
            warehouse.upsert(&mapping::payment(order_id, tender, order.order_date)?)?;
            counts.payments += 1;
        }
    }

    Ok(counts)
}

/// Pulls Square locations, customers, catalog and orders into the warehouse.
pub struct SquareSync<P> {
    client: SquareClient,
    provider: P,
    days_back: u32,
}

impl<P> SquareSync<P>
where
    P: WarehouseProvider + Clone + 'static,
{
    /// `days_back` is the order window used by a full sync.
    pub fn new(client: SquareClient, provider: P, days_back: u32) -> Self {
        Self {
            client,
            provider,
            days_back,
        }
    }

    pub async fn sync_locations(&self) -> Result<usize> {
        let locations = self.client.list_locations().await?;
        in_transaction(&self.provider, move |w| apply_locations(w, &locations)).await
    }

    pub async fn sync_customers(&self) -> Result<usize> {
        let customers = self.client.list_customers().await?;
        in_transaction(&self.provider, move |w| apply_customers(w, &customers)).await
    }

    pub async fn sync_catalog(&self) -> Result<usize> {
        let objects = self.client.list_catalog_items().await?;
        in_transaction(&self.provider, move |w| apply_catalog(w, &objects)).await
    }

    pub async fn sync_orders(&self, days_back: u32) -> Result<OrderCounts> {
        let location_ids: Vec<String> = self
            .client
            .list_locations()
            .await?
            .into_iter()
            .map(|location| location.id)
            .collect();
        if location_ids.is_empty() {
            info!("No Square locations, skipping order search");
            return Ok(OrderCounts::default());
        }

        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(days_back));
        let orders = self.client.search_orders(&location_ids, start, end).await?;
        if orders.is_empty() {
            info!(days_back, "No orders found in the requested window");
        }
        in_transaction(&self.provider, move |w| apply_orders(w, &orders)).await
    }

    pub async fn refresh_aggregates(&self) -> Result<usize> {
        in_transaction(&self.provider, |w| w.refresh_customer_aggregates()).await
    }

    async fn run_full(&self) -> bool {
        info!("Starting full Square sync");
        let steps = [
            report("locations", self.sync_locations().await),
            report("customers", self.sync_customers().await),
            report("catalog", self.sync_catalog().await),
            report_orders(self.sync_orders(self.days_back).await),
        ];
        if !steps.iter().all(|ok| *ok) {
            error!("Square sync completed with errors, customer aggregates not refreshed");
            return false;
        }
        let refreshed = report("customer_aggregates", self.refresh_aggregates().await);
        if refreshed {
            info!("Full Square sync completed");
        }
        refreshed
    }
}

fn report(step: &'static str, result: Result<usize>) -> bool {
    match result {
        Ok(count) => {
            info!(step, count, "Square sync step finished");
            true
        }
        Err(err) => {
            error!(step, error = %err, "Square sync step failed");
            false
        }
    }
}

fn report_orders(result: Result<OrderCounts>) -> bool {
    match result {
        Ok(counts) => {
            info!(
                step = "orders",
                orders = counts.orders,
                order_items = counts.order_items,
                payments = counts.payments,
                "Square sync step finished"
            );
            true
        }
        Err(err) => {
            error!(step = "orders", error = %err, "Square sync step failed");
            false
        }
    }
}

#[async_trait]
impl<P> SyncAdapter for SquareSync<P>
where
    P: WarehouseProvider + Clone + 'static,
{
    fn name(&self) -> &'static str {
        "square"
    }

    async fn sync(&self, resource: SyncResource) -> bool {
        match resource {
            SyncResource::Full => self.run_full().await,
            SyncResource::Locations => report("locations", self.sync_locations().await),
            SyncResource::Customers => report("customers", self.sync_customers().await),
            SyncResource::Catalog => report("catalog", self.sync_catalog().await),
            SyncResource::Orders { days_back } => report_orders(self.sync_orders(days_back).await),
            SyncResource::Posts => {
                warn!(adapter = "square", "Square has no posts to sync");
                false
            }
        }
    }

    async fn ping(&self, timeout: Duration) -> bool {
        match self.client.ping(timeout).await {
            Ok(()) => true,
            Err(err) => {
                warn!(adapter = "square", error = %err, "Square API ping failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryWarehouse;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn seed_reference_data(warehouse: &mut MemoryWarehouse) {
        let locations: Vec<SquareLocation> =
            from_json(json!([{"id": "L1", "name": "Main Street", "status": "ACTIVE"}]));
        let customers: Vec<SquareCustomer> =
            from_json(json!([{"id": "C1", "given_name": "Ada", "email_address": "ada@example.com"}]));
        let catalog: Vec<CatalogObject> = from_json(json!([{
            "type": "ITEM",
            "id": "I1",
            "item_data": {
                "name": "Wool Coat",
                "variations": [{
                    "type": "ITEM_VARIATION",
                    "id": "V1",
                    "item_variation_data": {"sku": "WC-1", "price_money": {"amount": 12000}}
                }]
            }
        }]));

        apply_locations(warehouse, &locations).unwrap();
        apply_customers(warehouse, &customers).unwrap();
        assert_eq!(apply_catalog(warehouse, &catalog).unwrap(), 1);
    }

    fn orders() -> Vec<SquareOrder> {
        from_json(json!([{
            "id": "O1",
            "customer_id": "C1",
            "location_id": "L1",
            "created_at": "2024-06-01T12:00:00Z",
            "state": "COMPLETED",
            "total_money": {"amount": 13000},
            "total_tax_money": {"amount": 1000},
            "line_items": [
                {"uid": "a", "catalog_object_id": "V1", "quantity": "1",
                 "base_price_money": {"amount": 12000}, "total_money": {"amount": 12000}},
                {"uid": "b", "catalog_object_id": "GONE", "quantity": "1"}
            ],
            "tenders": [{"id": "T1", "type": "CARD", "amount_money": {"amount": 13000},
                         "created_at": "2024-06-01T12:01:00Z"}]
        }]))
    }

    #[test]
    fn orders_resolve_references() {
        let mut warehouse = MemoryWarehouse::new();
        seed_reference_data(&mut warehouse);

        let counts = apply_orders(&mut warehouse, &orders()).unwrap();
        assert_eq!(
            counts,
            OrderCounts {
                orders: 1,
                order_items: 2,
                payments: 1
            }
        );

        let state = warehouse.snapshot();
        let order = state.orders.get("O1").unwrap();
        assert_eq!(order.customer_id, state.customers.id("C1"));
        assert_eq!(order.location_id, state.locations.id("L1"));
        assert_eq!(order.subtotal, dec!(120.00));

        let items: Vec<_> = state.order_items.values().collect();
        assert_eq!(items[0].item_id, state.inventory_items.id("V1"));
        assert_eq!(items[1].item_id, None);
        assert_eq!(state.payments.get("T1").unwrap().amount, dec!(130.00));
    }

    #[test]
    fn resyncing_orders_does_not_duplicate_rows() {
        let mut warehouse = MemoryWarehouse::new();
        seed_reference_data(&mut warehouse);

        apply_orders(&mut warehouse, &orders()).unwrap();
        apply_orders(&mut warehouse, &orders()).unwrap();

        let state = warehouse.snapshot();
        assert_eq!(state.orders.len(), 1);
        assert_eq!(state.order_items.len(), 2);
        assert_eq!(state.payments.len(), 1);
    }

    #[test]
    fn order_with_unknown_customer_keeps_empty_reference() {
        let mut warehouse = MemoryWarehouse::new();
        apply_orders(&mut warehouse, &orders()).unwrap();
        let state = warehouse.snapshot();
        let order = state.orders.get("O1").unwrap();
        assert_eq!(order.customer_id, None);
        assert_eq!(order.location_id, None);
    }

    #[test]
    fn failed_write_rolls_back_the_whole_step() {
        let mut warehouse = MemoryWarehouse::new();
        seed_reference_data(&mut warehouse);
        warehouse.fail_writes_after(2);

        let result = warehouse.transaction(|w| apply_orders(w, &orders()));
        assert!(result.is_err());

        let state = warehouse.snapshot();
        assert!(state.orders.is_empty());
        assert!(state.order_items.is_empty());
    }

    #[tokio::test]
    async fn unreachable_square_reports_failure() {
        let client = SquareClient::with_base_url("http://127.0.0.1:9", "token".into());
        let sync = SquareSync::new(client, MemoryWarehouse::new(), 30);

        assert!(!sync.sync(SyncResource::Locations).await);
        assert!(!sync.sync(SyncResource::Posts).await);
        assert!(!sync.ping(Duration::from_millis(200)).await);
        assert_eq!(sync.name(), "square");
    }

    #[tokio::test]
    async fn full_sync_skips_aggregates_after_a_failed_step() {
        let client = SquareClient::with_base_url("http://127.0.0.1:9", "token".into());
        let warehouse = MemoryWarehouse::new();
        let sync = SquareSync::new(client, warehouse.clone(), 30);

        assert!(!sync.sync(SyncResource::Full).await);
        assert_eq!(warehouse.snapshot().aggregate_refreshes, 0);
    }
}
