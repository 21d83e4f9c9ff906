//! Customer purchase aggregates, recomputed from completed orders.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::entity::RowId;

/// Order status counted towards revenue and customer aggregates.
pub const COMPLETED: &str = "completed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseSummary {
    pub total_orders: i32,
    pub total_spent: Decimal,
    pub first_purchase: NaiveDate,
    pub last_purchase: NaiveDate,
}

impl PurchaseSummary {
    #[must_use]
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            total_orders: 1,
            total_spent: amount,
            first_purchase: date,
            last_purchase: date,
        }
    }

    pub fn record(&mut self, date: NaiveDate, amount: Decimal) {
        self.total_orders += 1;
        self.total_spent += amount;
        self.first_purchase = self.first_purchase.min(date);
        self.last_purchase = self.last_purchase.max(date);
    }

    #[must_use]
    pub fn average_order_value(&self) -> Decimal {
        if self.total_orders == 0 {
            return Decimal::ZERO;
        }
        self.total_spent / Decimal::from(self.total_orders)
    }
}

/// Fold `(customer, order date, order total)` triples into one summary per customer.
pub fn summarize<I>(orders: I) -> BTreeMap<RowId, PurchaseSummary>
where
    I: IntoIterator<Item = (RowId, NaiveDate, Decimal)>,
{
    let mut summaries: BTreeMap<RowId, PurchaseSummary> = BTreeMap::new();
    for (customer, date, amount) in orders {
        summaries
            .entry(customer)
            .and_modify(|summary| summary.record(date, amount))
            .or_insert_with(|| PurchaseSummary::new(date, amount));
    }
    summaries
}
