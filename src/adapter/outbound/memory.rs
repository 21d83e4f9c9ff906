//! In-memory warehouse for testing.
//!
//! Mirrors the keying rules of the SQLite repository: every entity is stored
//! under its external identifier (or natural composite key) and keeps the
//! surrogate key it was first given. Clones share the same state, so the
//! warehouse is its own session provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::aggregate::{self, PurchaseSummary, COMPLETED};
use crate::domain::entity::{
    Customer, ExternalRef, InventoryItem, Location, Order, OrderItem, Payment, Post, PostMetric,
    RowId, SocialAccount,
};
use crate::error::{Error, Result};
use crate::port::outbound::warehouse::{Upsert, Warehouse, WarehouseProvider};

/// Rows of one entity, keyed by their natural key.
#[derive(Debug, Clone)]
pub struct Rows<K, E> {
    rows: BTreeMap<K, (RowId, E)>,
}

impl<K, E> Default for Rows<K, E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<K: Ord, E: Clone> Rows<K, E> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Surrogate key stored under `key`.
    pub fn id<Q>(&self, key: &Q) -> Option<RowId>
    where
        K: std::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.rows.get(key).map(|(id, _)| *id)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&E>
    where
        K: std::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.rows.get(key).map(|(_, entity)| entity)
    }

    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.rows.values().map(|(_, entity)| entity)
    }

    fn put(&mut self, key: K, entity: &E, next_id: &mut RowId) -> RowId {
        if let Some((id, stored)) = self.rows.get_mut(&key) {
            *stored = entity.clone();
            return *id;
        }
        *next_id += 1;
        self.rows.insert(key, (*next_id, entity.clone()));
        *next_id
    }
}

/// Everything the in-memory warehouse holds.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    next_id: RowId,
    /// Successful upserts left before writes start failing.
    writes_left: Option<usize>,
    pub locations: Rows<String, Location>,
    pub customers: Rows<String, Customer>,
    pub inventory_items: Rows<String, InventoryItem>,
    pub orders: Rows<String, Order>,
    pub order_items: Rows<(RowId, String), OrderItem>,
    pub payments: Rows<String, Payment>,
    pub social_accounts: Rows<(String, String), SocialAccount>,
    pub posts: Rows<String, Post>,
    pub post_metrics: Rows<(RowId, chrono::NaiveDate), PostMetric>,
    /// Aggregates from the last refresh, by customer key.
    pub customer_summaries: BTreeMap<RowId, PurchaseSummary>,
    pub aggregate_refreshes: usize,
    pub analytics_runs: usize,
}

impl MemoryState {
    fn charge_write(&mut self) -> Result<()> {
        match self.writes_left.as_mut() {
            Some(0) => Err(Error::Database("simulated write failure".into())),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Shared in-memory warehouse; clones see the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryWarehouse {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryWarehouse {
    /// Create a new empty memory warehouse.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> MemoryState {
        self.state.read().clone()
    }

    /// Let `count` more upserts succeed, then fail every write.
    pub fn fail_writes_after(&self, count: usize) {
        self.state.write().writes_left = Some(count);
    }

    fn write<T>(&self, apply: impl FnOnce(&mut MemoryState) -> Result<T>) -> Result<T> {
        let mut state = self.state.write();
        state.charge_write()?;
        apply(&mut state)
    }
}

macro_rules! memory_upsert {
    ($entity:ty, $rows:ident, |$value:ident| $key:expr) => {
        impl Upsert<$entity> for MemoryWarehouse {
            fn upsert(&mut self, $value: &$entity) -> Result<RowId> {
                self.write(|state| {
                    let MemoryState { next_id, $rows, .. } = state;
                    Ok($rows.put($key, $value, next_id))
                })
            }
        }
    };
}

memory_upsert!(Location, locations, |location| location.square_location_id.clone());
memory_upsert!(InventoryItem, inventory_items, |item| item.square_catalog_id.clone());
memory_upsert!(Order, orders, |order| order.square_order_id.clone());
memory_upsert!(OrderItem, order_items, |item| (item.order_id, item.line_item_uid.clone()));
memory_upsert!(Payment, payments, |payment| payment.square_payment_id.clone());
memory_upsert!(SocialAccount, social_accounts, |account| (
    account.platform.as_str().to_string(),
    account.account_handle.clone()
));
memory_upsert!(Post, posts, |post| post.platform_post_id.clone());
memory_upsert!(PostMetric, post_metrics, |metric| (metric.post_id, metric.metric_date));
memory_upsert!(Customer, customers, |customer| customer.square_customer_id.clone());

impl Warehouse for MemoryWarehouse {
    fn resolve(&mut self, reference: ExternalRef<'_>) -> Result<Option<RowId>> {
        let state = self.state.read();
        Ok(match reference {
            ExternalRef::Location(key) => state.locations.id(key),
            ExternalRef::Customer(key) => state.customers.id(key),
            ExternalRef::CatalogItem(key) => state.inventory_items.id(key),
            ExternalRef::Order(key) => state.orders.id(key),
        })
    }

    fn refresh_customer_aggregates(&mut self) -> Result<usize> {
        self.write(|state| {
            let purchases = state
                .orders
                .values()
                .filter(|order| order.order_status == COMPLETED)
                .filter_map(|order| {
                    order
                        .customer_id
                        .map(|customer| (customer, order.order_date.date(), order.total_amount))
                })
                .collect::<Vec<_>>();
            state.customer_summaries = aggregate::summarize(purchases);
            state.aggregate_refreshes += 1;
            Ok(state.customer_summaries.len())
        })
    }

    fn materialize_analytics(&mut self) -> Result<()> {
        self.write(|state| {
            state.analytics_runs += 1;
            Ok(())
        })
    }

    fn ping(&mut self) -> Result<()> {
        Ok(())
    }

    fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let before = self.snapshot();
        let result = work(self);
        if result.is_err() {
            let mut state = self.state.write();
            let writes_left = state.writes_left;
            *state = before;
            state.writes_left = writes_left;
        }
        result
    }
}

impl WarehouseProvider for MemoryWarehouse {
    type Session = MemoryWarehouse;

    fn session(&self) -> Result<Self::Session> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;

    fn location(id: &str, name: &str) -> Location {
        Location {
            square_location_id: id.into(),
            location_name: name.into(),
            location_type: "square_location".into(),
            address: None,
            city: None,
            state_province: None,
            country: None,
            postal_code: None,
            is_active: true,
        }
    }

    #[test]
    fn upsert_keeps_the_first_surrogate_key() {
        let mut warehouse = MemoryWarehouse::new();
        let first = warehouse.upsert(&location("L1", "Downtown")).unwrap();
        let again = warehouse.upsert(&location("L1", "Uptown")).unwrap();

        assert_eq!(first, again);
        let state = warehouse.snapshot();
        assert_eq!(state.locations.len(), 1);
        assert_eq!(state.locations.get("L1").unwrap().location_name, "Uptown");
    }

    #[test]
    fn sessions_share_state() {
        let warehouse = MemoryWarehouse::new();
        let mut session = warehouse.session().unwrap();
        let id = session.upsert(&location("L1", "Downtown")).unwrap();

        let mut other = warehouse.session().unwrap();
        assert_eq!(other.resolve(ExternalRef::Location("L1")).unwrap(), Some(id));
    }

    #[test]
    fn failed_transaction_restores_previous_rows() {
        let mut warehouse = MemoryWarehouse::new();
        warehouse.upsert(&location("L1", "Downtown")).unwrap();
        warehouse.fail_writes_after(1);

        let result = warehouse.transaction(|w| {
            w.upsert(&location("L2", "Online"))?;
            w.upsert(&location("L3", "Pop-up"))
        });

        assert!(result.is_err());
        assert_eq!(warehouse.snapshot().locations.len(), 1);
    }

    #[test]
    fn aggregates_count_completed_orders_only() {
        let mut warehouse = MemoryWarehouse::new();
        let order = |id: &str, status: &str, total| Order {
            square_order_id: id.into(),
            customer_id: Some(1),
            location_id: None,
            order_date: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            order_status: status.into(),
            subtotal: total,
            tax_amount: dec!(0),
            discount_amount: dec!(0),
            tip_amount: dec!(0),
            total_amount: total,
            order_source: "square_pos".into(),
        };
        warehouse.upsert(&order("O1", "completed", dec!(10))).unwrap();
        warehouse.upsert(&order("O2", "canceled", dec!(99))).unwrap();

        assert_eq!(warehouse.refresh_customer_aggregates().unwrap(), 1);
        let state = warehouse.snapshot();
        assert_eq!(state.customer_summaries[&1].total_spent, dec!(10));
        assert_eq!(state.aggregate_refreshes, 1);
    }
}
