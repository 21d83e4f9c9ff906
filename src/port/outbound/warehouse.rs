//! Repository port for the sync adapters.
//!
//! Adapters map remote records to entities and hand them to a [`Warehouse`];
//! each upsert matches on the entity's external identifier (or natural
//! composite key) and returns the row's surrogate key.

use crate::domain::entity::{
    Customer, ExternalRef, InventoryItem, Location, Order, OrderItem, Payment, Post, PostMetric,
    RowId, SocialAccount,
};
use crate::error::{Error, Result};

/// Insert an entity, or update its mutable fields when its key already exists.
pub trait Upsert<E> {
    fn upsert(&mut self, entity: &E) -> Result<RowId>;
}

/// A unit-of-work view of the warehouse.
pub trait Warehouse:
    Upsert<Location>
    + Upsert<Customer>
    + Upsert<InventoryItem>
    + Upsert<Order>
    + Upsert<OrderItem>
    + Upsert<Payment>
    + Upsert<SocialAccount>
    + Upsert<Post>
    + Upsert<PostMetric>
{
    /// Surrogate key for an external identifier, if the row exists.
    fn resolve(&mut self, reference: ExternalRef<'_>) -> Result<Option<RowId>>;

    /// Recompute order count, spend and purchase dates of every customer
    /// from their completed orders. Returns the number of customers updated.
    fn refresh_customer_aggregates(&mut self) -> Result<usize>;

    /// Rebuild the cross-source analytics (summary views and the social
    /// engagement note on market days).
    fn materialize_analytics(&mut self) -> Result<()>;

    /// Cheap round trip proving the warehouse is reachable.
    fn ping(&mut self) -> Result<()>;

    /// Run `work` atomically: every write commits, or none does.
    fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;
}

/// Opens a fresh warehouse session per unit of work.
pub trait WarehouseProvider: Send + Sync {
    type Session: Warehouse;

    fn session(&self) -> Result<Self::Session>;
}

/// Run `work` in one transaction on a fresh session, off the async runtime.
///
/// Sessions block on I/O, so the unit of work runs on tokio's blocking pool
/// and only its result crosses back.
pub async fn in_transaction<P, T, F>(provider: &P, work: F) -> Result<T>
where
    P: WarehouseProvider + Clone + 'static,
    T: Send + 'static,
    F: FnOnce(&mut P::Session) -> Result<T> + Send + 'static,
{
    let provider = provider.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let mut session = provider.session()?;
        session.transaction(work)
    })
    .await;
    joined.map_err(|err| Error::Connection(format!("warehouse task failed: {err}")))?
}
