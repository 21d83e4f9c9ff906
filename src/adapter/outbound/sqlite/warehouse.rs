//! SQLite implementation of the sync repository.
//!
//! Each upsert inserts the entity or, when its external identifier (or
//! natural composite key) already exists, updates the fields a sync is
//! allowed to change. The surrogate key is read back afterwards.

use std::ops::DerefMut;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use diesel::connection::{AnsiTransactionManager, SimpleConnection, TransactionManager};
use diesel::prelude::*;
use diesel::upsert::excluded;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::adapter::outbound::sqlite::database::connection::{DbConnection, DbPool};
use crate::adapter::outbound::sqlite::database::model::{
    CompletedOrderRow, NewCustomerRow, NewInventoryItemRow, NewLocationRow, NewOrderItemRow,
    NewOrderRow, NewPaymentRow, NewPostMetricRow, NewPostRow, NewSocialAccountRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    customers, inventory_items, locations, order_items, orders, payments, social_media_accounts,
    social_media_metrics, social_media_posts,
};
use crate::domain::aggregate::{self, COMPLETED};
use crate::domain::entity::{
    Customer, ExternalRef, InventoryItem, Location, Order, OrderItem, Payment, Post, PostMetric,
    RowId, SocialAccount,
};
use crate::domain::value::{encode_text_array, format_decimal, format_timestamp, DATE_FORMAT};
use crate::error::{Error, Result};
use crate::port::outbound::warehouse::{Upsert, Warehouse, WarehouseProvider};

/// Scale of every money column.
const MONEY_SCALE: u32 = 2;
/// Scale of engagement rates.
const RATE_SCALE: u32 = 4;

/// Appends the social engagement of recent posts to market days that lack it.
const MARKET_ENGAGEMENT_NOTE: &str = "
UPDATE market_performance
SET notes = COALESCE(notes, '') || ' | Social engagement: ' || printf('%.4f', social_stats.avg_engagement)
FROM (
    SELECT
        DATE(p.posted_date) AS post_date,
        AVG(COALESCE(CAST(m.engagement_rate AS REAL), 0)) AS avg_engagement
    FROM social_media_posts p
    LEFT JOIN social_media_metrics m ON p.post_id = m.post_id
    WHERE DATE(p.posted_date) >= DATE('now', '-30 days')
    GROUP BY DATE(p.posted_date)
) AS social_stats
WHERE market_performance.market_date = social_stats.post_date
  AND social_stats.avg_engagement > 0
  AND (market_performance.notes IS NULL OR market_performance.notes NOT LIKE '%Social engagement:%');
";

const ANALYTICS_VIEWS: &str = "
DROP VIEW IF EXISTS business_performance_summary;
CREATE VIEW business_performance_summary AS
SELECT
    mp.market_date,
    mp.location_id,
    l.location_name,
    mp.total_sales,
    mp.total_transactions,
    mp.average_transaction_value,
    mp.net_profit,
    COALESCE(social_day.posts_count, 0) AS social_posts_count,
    COALESCE(social_day.avg_engagement, 0) AS avg_social_engagement,
    COALESCE(social_day.total_reach, 0) AS total_social_reach,
    COALESCE(mp.customer_acquisition_count, 0) AS new_customers,
    CASE
        WHEN CAST(mp.booth_cost AS REAL) > 0 THEN
            ROUND(CAST(mp.net_profit AS REAL) / CAST(mp.booth_cost AS REAL) * 100, 2)
        ELSE NULL
    END AS roi_percentage
FROM market_performance mp
JOIN locations l ON mp.location_id = l.location_id
LEFT JOIN (
    SELECT
        DATE(p.posted_date) AS post_date,
        COUNT(*) AS posts_count,
        AVG(COALESCE(CAST(m.engagement_rate AS REAL), 0)) AS avg_engagement,
        SUM(COALESCE(m.reach, 0)) AS total_reach
    FROM social_media_posts p
    LEFT JOIN social_media_metrics m ON p.post_id = m.post_id
    GROUP BY DATE(p.posted_date)
) social_day ON mp.market_date = social_day.post_date
WHERE mp.market_date >= DATE('now', '-90 days')
ORDER BY mp.market_date DESC;

DROP VIEW IF EXISTS best_performing_strategies;
CREATE VIEW best_performing_strategies AS
SELECT
    l.location_name,
    COUNT(DISTINCT mp.performance_id) AS market_appearances,
    AVG(CAST(mp.total_sales AS REAL)) AS avg_sales,
    AVG(CAST(mp.net_profit AS REAL)) AS avg_profit,
    AVG(COALESCE(social_stats.avg_engagement, 0)) AS avg_social_engagement,
    group_concat(DISTINCT top_hashtags.hashtag) AS successful_hashtags
FROM market_performance mp
JOIN locations l ON mp.location_id = l.location_id
LEFT JOIN (
    SELECT
        DATE(p.posted_date) AS post_date,
        AVG(COALESCE(CAST(m.engagement_rate AS REAL), 0)) AS avg_engagement
    FROM social_media_posts p
    LEFT JOIN social_media_metrics m ON p.post_id = m.post_id
    GROUP BY DATE(p.posted_date)
) social_stats ON mp.market_date = social_stats.post_date
LEFT JOIN (
    SELECT
        DATE(p.posted_date) AS post_date,
        tag.value AS hashtag
    FROM social_media_posts p
    JOIN json_each(COALESCE(p.hashtags, '[]')) tag
    LEFT JOIN social_media_metrics m ON p.post_id = m.post_id
    WHERE COALESCE(CAST(m.engagement_rate AS REAL), 0) > 0.05
) top_hashtags ON mp.market_date = top_hashtags.post_date
WHERE mp.market_date >= DATE('now', '-180 days')
GROUP BY l.location_id, l.location_name
HAVING COUNT(DISTINCT mp.performance_id) >= 2
ORDER BY avg_profit DESC;
";

/// Warehouse session over one SQLite connection.
///
/// Generic over how the connection is held so a pooled connection and a
/// borrowed one work the same way.
pub struct SqliteWarehouse<C = DbConnection> {
    conn: C,
}

impl<C> SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    #[must_use]
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl WarehouseProvider for DbPool {
    type Session = SqliteWarehouse<DbConnection>;

    fn session(&self) -> Result<Self::Session> {
        let conn = self.get().map_err(|e| Error::Connection(e.to_string()))?;
        Ok(SqliteWarehouse::new(conn))
    }
}

fn now() -> String {
    format_timestamp(Utc::now().naive_utc())
}

fn money(value: Decimal) -> String {
    format_decimal(value, MONEY_SCALE)
}

fn parse_money(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| Error::Parse(format!("amount {raw:?}: {e}")))
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|e| Error::Parse(format!("date {raw:?}: {e}")))
}

impl<C> Upsert<Location> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, location: &Location) -> Result<RowId> {
        let row = NewLocationRow {
            square_location_id: location.square_location_id.clone(),
            location_name: location.location_name.clone(),
            location_type: location.location_type.clone(),
            address: location.address.clone(),
            city: location.city.clone(),
            state_province: location.state_province.clone(),
            country: location.country.clone(),
            postal_code: location.postal_code.clone(),
            is_active: location.is_active,
            updated_at: now(),
        };
        let conn = self.conn();

        diesel::insert_into(locations::table)
            .values(&row)
            .on_conflict(locations::square_location_id)
            .do_update()
            .set((
                locations::location_name.eq(excluded(locations::location_name)),
                locations::address.eq(excluded(locations::address)),
                locations::city.eq(excluded(locations::city)),
                locations::state_province.eq(excluded(locations::state_province)),
                locations::country.eq(excluded(locations::country)),
                locations::postal_code.eq(excluded(locations::postal_code)),
                locations::is_active.eq(excluded(locations::is_active)),
                locations::updated_at.eq(excluded(locations::updated_at)),
            ))
            .execute(conn)?;

        let id = locations::table
            .filter(locations::square_location_id.eq(&row.square_location_id))
            .select(locations::location_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Upsert<Customer> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, customer: &Customer) -> Result<RowId> {
        let stamp = now();
        let row = NewCustomerRow {
            square_customer_id: customer.square_customer_id.clone(),
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            created_at: customer
                .created_at
                .map_or_else(|| stamp.clone(), format_timestamp),
            updated_at: stamp,
        };
        let conn = self.conn();

        // A customer seeded without a Square id is adopted by its email.
        if let Some(email) = &row.email {
            let unlinked: Option<RowId> = customers::table
                .filter(customers::email.eq(email))
                .filter(customers::square_customer_id.is_null())
                .select(customers::customer_id)
                .first(conn)
                .optional()?;
            if let Some(id) = unlinked {
                debug!(customer_id = id, square_id = %row.square_customer_id, "Linking existing customer by email");
                diesel::update(customers::table.find(id))
                    .set((
                        customers::square_customer_id.eq(&row.square_customer_id),
                        customers::first_name.eq(&row.first_name),
                        customers::last_name.eq(&row.last_name),
                        customers::phone.eq(&row.phone),
                        customers::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)?;
                return Ok(id);
            }
        }

        diesel::insert_into(customers::table)
            .values(&row)
            .on_conflict(customers::square_customer_id)
            .do_update()
            .set((
                customers::first_name.eq(excluded(customers::first_name)),
                customers::last_name.eq(excluded(customers::last_name)),
                customers::email.eq(excluded(customers::email)),
                customers::phone.eq(excluded(customers::phone)),
                customers::updated_at.eq(excluded(customers::updated_at)),
            ))
            .execute(conn)?;

        let id = customers::table
            .filter(customers::square_customer_id.eq(&row.square_customer_id))
            .select(customers::customer_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Upsert<InventoryItem> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, item: &InventoryItem) -> Result<RowId> {
        let row = NewInventoryItemRow {
            square_catalog_id: item.square_catalog_id.clone(),
            item_name: item.item_name.clone(),
            sku: item.sku.clone(),
            selling_price: money(item.selling_price),
            category: item.category.clone(),
            updated_at: now(),
        };
        let conn = self.conn();

        diesel::insert_into(inventory_items::table)
            .values(&row)
            .on_conflict(inventory_items::square_catalog_id)
            .do_update()
            .set((
                inventory_items::item_name.eq(excluded(inventory_items::item_name)),
                inventory_items::sku.eq(excluded(inventory_items::sku)),
                inventory_items::selling_price.eq(excluded(inventory_items::selling_price)),
                inventory_items::category.eq(excluded(inventory_items::category)),
                inventory_items::updated_at.eq(excluded(inventory_items::updated_at)),
            ))
            .execute(conn)?;

        let id = inventory_items::table
            .filter(inventory_items::square_catalog_id.eq(&row.square_catalog_id))
            .select(inventory_items::item_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Upsert<Order> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, order: &Order) -> Result<RowId> {
        let row = NewOrderRow {
            square_order_id: order.square_order_id.clone(),
            customer_id: order.customer_id,
            location_id: order.location_id,
            order_date: format_timestamp(order.order_date),
            order_status: order.order_status.clone(),
            subtotal: money(order.subtotal),
            tax_amount: money(order.tax_amount),
            discount_amount: money(order.discount_amount),
            tip_amount: money(order.tip_amount),
            total_amount: money(order.total_amount),
            order_source: order.order_source.clone(),
            updated_at: now(),
        };
        let conn = self.conn();

        diesel::insert_into(orders::table)
            .values(&row)
            .on_conflict(orders::square_order_id)
            .do_update()
            .set((
                orders::order_status.eq(excluded(orders::order_status)),
                orders::subtotal.eq(excluded(orders::subtotal)),
                orders::tax_amount.eq(excluded(orders::tax_amount)),
                orders::discount_amount.eq(excluded(orders::discount_amount)),
                orders::tip_amount.eq(excluded(orders::tip_amount)),
                orders::total_amount.eq(excluded(orders::total_amount)),
                orders::updated_at.eq(excluded(orders::updated_at)),
            ))
            .execute(conn)?;

        let id = orders::table
            .filter(orders::square_order_id.eq(&row.square_order_id))
            .select(orders::order_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Upsert<OrderItem> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, item: &OrderItem) -> Result<RowId> {
        let row = NewOrderItemRow {
            order_id: item.order_id,
            line_item_uid: item.line_item_uid.clone(),
            item_id: item.item_id,
            quantity: item.quantity,
            unit_price: money(item.unit_price),
            discount_amount: money(item.discount_amount),
            total_price: money(item.total_price),
        };
        let conn = self.conn();

        diesel::insert_into(order_items::table)
            .values(&row)
            .on_conflict((order_items::order_id, order_items::line_item_uid))
            .do_update()
            .set((
                order_items::item_id.eq(excluded(order_items::item_id)),
                order_items::quantity.eq(excluded(order_items::quantity)),
                order_items::unit_price.eq(excluded(order_items::unit_price)),
                order_items::discount_amount.eq(excluded(order_items::discount_amount)),
                order_items::total_price.eq(excluded(order_items::total_price)),
            ))
            .execute(conn)?;

        let id = order_items::table
            .filter(order_items::order_id.eq(row.order_id))
            .filter(order_items::line_item_uid.eq(&row.line_item_uid))
            .select(order_items::order_item_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Upsert<Payment> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, payment: &Payment) -> Result<RowId> {
        let row = NewPaymentRow {
            square_payment_id: payment.square_payment_id.clone(),
            order_id: payment.order_id,
            payment_date: format_timestamp(payment.payment_date),
            amount: money(payment.amount),
            payment_method: payment.payment_method.clone(),
            payment_status: payment.payment_status.clone(),
            processing_fee: money(payment.processing_fee),
            square_fee: money(payment.square_fee),
            net_amount: money(payment.net_amount),
            updated_at: now(),
        };
        let conn = self.conn();

        diesel::insert_into(payments::table)
            .values(&row)
            .on_conflict(payments::square_payment_id)
            .do_update()
            .set((
                payments::payment_status.eq(excluded(payments::payment_status)),
                payments::updated_at.eq(excluded(payments::updated_at)),
            ))
            .execute(conn)?;

        let id = payments::table
            .filter(payments::square_payment_id.eq(&row.square_payment_id))
            .select(payments::payment_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Upsert<SocialAccount> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, account: &SocialAccount) -> Result<RowId> {
        let row = NewSocialAccountRow {
            platform: account.platform.as_str().to_string(),
            account_handle: account.account_handle.clone(),
            account_name: account.account_name.clone(),
            updated_at: now(),
        };
        let conn = self.conn();

        diesel::insert_into(social_media_accounts::table)
            .values(&row)
            .on_conflict((
                social_media_accounts::platform,
                social_media_accounts::account_handle,
            ))
            .do_update()
            .set((
                social_media_accounts::account_name.eq(excluded(social_media_accounts::account_name)),
                social_media_accounts::updated_at.eq(excluded(social_media_accounts::updated_at)),
            ))
            .execute(conn)?;

        let id = social_media_accounts::table
            .filter(social_media_accounts::platform.eq(&row.platform))
            .filter(social_media_accounts::account_handle.eq(&row.account_handle))
            .select(social_media_accounts::account_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Upsert<Post> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, post: &Post) -> Result<RowId> {
        let row = NewPostRow {
            account_id: post.account_id,
            platform_post_id: post.platform_post_id.clone(),
            post_type: post.post_type.clone(),
            caption: post.caption.clone(),
            post_url: post.post_url.clone(),
            posted_date: format_timestamp(post.posted_date),
            hashtags: encode_text_array(&post.hashtags),
            mentions: encode_text_array(&post.mentions),
            updated_at: now(),
        };
        let conn = self.conn();

        diesel::insert_into(social_media_posts::table)
            .values(&row)
            .on_conflict(social_media_posts::platform_post_id)
            .do_update()
            .set((
                social_media_posts::caption.eq(excluded(social_media_posts::caption)),
                social_media_posts::post_url.eq(excluded(social_media_posts::post_url)),
                social_media_posts::hashtags.eq(excluded(social_media_posts::hashtags)),
                social_media_posts::mentions.eq(excluded(social_media_posts::mentions)),
                social_media_posts::updated_at.eq(excluded(social_media_posts::updated_at)),
            ))
            .execute(conn)?;

        let id = social_media_posts::table
            .filter(social_media_posts::platform_post_id.eq(&row.platform_post_id))
            .select(social_media_posts::post_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Upsert<PostMetric> for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn upsert(&mut self, metric: &PostMetric) -> Result<RowId> {
        let row = NewPostMetricRow {
            post_id: metric.post_id,
            metric_date: metric.metric_date.format(DATE_FORMAT).to_string(),
            likes: metric.likes,
            comments: metric.comments,
            shares: metric.shares,
            engagement_rate: format_decimal(metric.engagement_rate, RATE_SCALE),
            updated_at: now(),
        };
        let conn = self.conn();

        diesel::insert_into(social_media_metrics::table)
            .values(&row)
            .on_conflict((social_media_metrics::post_id, social_media_metrics::metric_date))
            .do_update()
            .set((
                social_media_metrics::likes.eq(excluded(social_media_metrics::likes)),
                social_media_metrics::comments.eq(excluded(social_media_metrics::comments)),
                social_media_metrics::shares.eq(excluded(social_media_metrics::shares)),
                social_media_metrics::engagement_rate
                    .eq(excluded(social_media_metrics::engagement_rate)),
                social_media_metrics::updated_at.eq(excluded(social_media_metrics::updated_at)),
            ))
            .execute(conn)?;

        let id = social_media_metrics::table
            .filter(social_media_metrics::post_id.eq(row.post_id))
            .filter(social_media_metrics::metric_date.eq(&row.metric_date))
            .select(social_media_metrics::metric_id)
            .first(conn)?;
        Ok(id)
    }
}

impl<C> Warehouse for SqliteWarehouse<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn resolve(&mut self, reference: ExternalRef<'_>) -> Result<Option<RowId>> {
        let conn = self.conn();
        let id = match reference {
            ExternalRef::Location(external) => locations::table
                .filter(locations::square_location_id.eq(external))
                .select(locations::location_id)
                .first::<RowId>(conn)
                .optional()?,
            ExternalRef::Customer(external) => customers::table
                .filter(customers::square_customer_id.eq(external))
                .select(customers::customer_id)
                .first::<RowId>(conn)
                .optional()?,
            ExternalRef::CatalogItem(external) => inventory_items::table
                .filter(inventory_items::square_catalog_id.eq(external))
                .select(inventory_items::item_id)
                .first::<RowId>(conn)
                .optional()?,
            ExternalRef::Order(external) => orders::table
                .filter(orders::square_order_id.eq(external))
                .select(orders::order_id)
                .first::<RowId>(conn)
                .optional()?,
        };
        Ok(id)
    }

    fn refresh_customer_aggregates(&mut self) -> Result<usize> {
        let conn = self.conn();
        let rows: Vec<CompletedOrderRow> = orders::table
            .filter(orders::customer_id.is_not_null())
            .filter(orders::order_status.eq(COMPLETED))
            .select(CompletedOrderRow::as_select())
            .load(conn)?;

        let mut purchases = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(customer) = row.customer_id {
                purchases.push((customer, parse_day(&row.order_date)?, parse_money(&row.total_amount)?));
            }
        }

        let stamp = now();
        let mut updated = 0;
        for (customer, summary) in aggregate::summarize(purchases) {
            updated += diesel::update(customers::table.find(customer))
                .set((
                    customers::total_orders.eq(summary.total_orders),
                    customers::total_spent.eq(money(summary.total_spent)),
                    customers::average_order_value.eq(money(summary.average_order_value())),
                    customers::first_purchase_date
                        .eq(summary.first_purchase.format(DATE_FORMAT).to_string()),
                    customers::last_purchase_date
                        .eq(summary.last_purchase.format(DATE_FORMAT).to_string()),
                    customers::updated_at.eq(&stamp),
                ))
                .execute(conn)?;
        }

        info!(customers = updated, "Customer aggregates refreshed");
        Ok(updated)
    }

    fn materialize_analytics(&mut self) -> Result<()> {
        let conn = self.conn();
        let annotated = diesel::sql_query(MARKET_ENGAGEMENT_NOTE).execute(conn)?;
        conn.batch_execute(ANALYTICS_VIEWS)?;
        info!(market_days = annotated, "Cross-platform analytics generated");
        Ok(())
    }

    fn ping(&mut self) -> Result<()> {
        diesel::sql_query("SELECT 1").execute(self.conn())?;
        Ok(())
    }

    fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        AnsiTransactionManager::begin_transaction(self.conn())?;
        match work(self) {
            Ok(value) => {
                AnsiTransactionManager::commit_transaction(self.conn())?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = AnsiTransactionManager::rollback_transaction(self.conn()) {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::memory_pool;
    use crate::domain::entity::Platform;

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn location(id: &str, name: &str) -> Location {
        Location {
            square_location_id: id.into(),
            location_name: name.into(),
            location_type: "square_location".into(),
            address: Some("1 Main St".into()),
            city: Some("Portland".into()),
            state_province: None,
            country: Some("US".into()),
            postal_code: None,
            is_active: true,
        }
    }

    fn customer(id: &str, email: Option<&str>) -> Customer {
        Customer {
            square_customer_id: id.into(),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: email.map(Into::into),
            phone: None,
            created_at: Some(ts("2024-01-01 09:00:00")),
        }
    }

    fn order(id: &str, customer_id: Option<RowId>, date: &str, total: Decimal, status: &str) -> Order {
        Order {
            square_order_id: id.into(),
            customer_id,
            location_id: None,
            order_date: ts(date),
            order_status: status.into(),
            subtotal: total,
            tax_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            tip_amount: Decimal::ZERO,
            total_amount: total,
            order_source: "square_pos".into(),
        }
    }

    #[derive(diesel::QueryableByName)]
    struct Count {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        count: i64,
    }

    fn count(warehouse: &mut SqliteWarehouse, table: &str) -> i64 {
        diesel::sql_query(format!("SELECT COUNT(*) AS count FROM {table}"))
            .get_result::<Count>(warehouse.conn())
            .unwrap()
            .count
    }

    #[test]
    fn upsert_is_keyed_by_external_id() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();

        let first = warehouse.upsert(&location("L1", "Downtown")).unwrap();
        let again = warehouse.upsert(&location("L1", "Downtown Market")).unwrap();
        let other = warehouse.upsert(&location("L2", "Online")).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(count(&mut warehouse, "locations"), 2);

        let name: String = locations::table
            .find(first)
            .select(locations::location_name)
            .first(warehouse.conn())
            .unwrap();
        assert_eq!(name, "Downtown Market");
    }

    #[test]
    fn resolve_finds_synced_rows_only() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();
        let id = warehouse.upsert(&location("L1", "Downtown")).unwrap();

        assert_eq!(warehouse.resolve(ExternalRef::Location("L1")).unwrap(), Some(id));
        assert_eq!(warehouse.resolve(ExternalRef::Location("missing")).unwrap(), None);
        assert_eq!(warehouse.resolve(ExternalRef::Order("L1")).unwrap(), None);
    }

    #[test]
    fn order_upsert_updates_totals_but_keeps_key() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();

        let id = warehouse
            .upsert(&order("O1", None, "2024-03-01 10:00:00", dec!(10.5), "open"))
            .unwrap();
        let again = warehouse
            .upsert(&order("O1", None, "2024-03-01 10:00:00", dec!(12.25), "completed"))
            .unwrap();
        assert_eq!(id, again);

        let (status, total): (String, String) = orders::table
            .find(id)
            .select((orders::order_status, orders::total_amount))
            .first(warehouse.conn())
            .unwrap();
        assert_eq!(status, "completed");
        assert_eq!(total, "12.25");
    }

    #[test]
    fn order_items_are_unique_per_line() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();
        let order_id = warehouse
            .upsert(&order("O1", None, "2024-03-01 10:00:00", dec!(20), "completed"))
            .unwrap();

        let line = OrderItem {
            order_id,
            line_item_uid: "line-1".into(),
            item_id: None,
            quantity: 1,
            unit_price: dec!(20),
            discount_amount: Decimal::ZERO,
            total_price: dec!(20),
        };
        let first = warehouse.upsert(&line).unwrap();
        let second = warehouse.upsert(&OrderItem { quantity: 2, ..line }).unwrap();

        assert_eq!(first, second);
        assert_eq!(count(&mut warehouse, "order_items"), 1);
    }

    #[test]
    fn customer_seeded_without_square_id_is_linked_by_email() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();
        diesel::sql_query(
            "INSERT INTO customers (customer_id, first_name, email) VALUES (7, 'Ada', 'ada@example.com')",
        )
        .execute(warehouse.conn())
        .unwrap();

        let id = warehouse
            .upsert(&customer("C1", Some("ada@example.com")))
            .unwrap();

        assert_eq!(id, 7);
        assert_eq!(count(&mut warehouse, "customers"), 1);
        assert_eq!(warehouse.resolve(ExternalRef::Customer("C1")).unwrap(), Some(7));
    }

    #[test]
    fn social_rows_upsert_on_natural_keys() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();

        let account = SocialAccount {
            platform: Platform::Instagram,
            account_handle: "ig_1".into(),
            account_name: None,
        };
        let account_id = warehouse.upsert(&account).unwrap();
        assert_eq!(warehouse.upsert(&account).unwrap(), account_id);

        let post = Post {
            account_id,
            platform_post_id: "p1".into(),
            post_type: Some("IMAGE".into()),
            caption: Some("New in #vintage".into()),
            post_url: None,
            posted_date: ts("2024-03-02 12:00:00"),
            hashtags: vec!["vintage".into()],
            mentions: vec![],
        };
        let post_id = warehouse.upsert(&post).unwrap();

        let metric = PostMetric {
            post_id,
            metric_date: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            likes: 5,
            comments: 1,
            shares: 0,
            engagement_rate: Decimal::ZERO,
        };
        let metric_id = warehouse.upsert(&metric).unwrap();
        let updated = warehouse.upsert(&PostMetric { likes: 9, ..metric }).unwrap();

        assert_eq!(metric_id, updated);
        let likes: i32 = social_media_metrics::table
            .find(metric_id)
            .select(social_media_metrics::likes)
            .first(warehouse.conn())
            .unwrap();
        assert_eq!(likes, 9);

        let hashtags: Option<String> = social_media_posts::table
            .find(post_id)
            .select(social_media_posts::hashtags)
            .first(warehouse.conn())
            .unwrap();
        assert_eq!(hashtags.as_deref(), Some(r#"["vintage"]"#));
    }

    #[test]
    fn failed_transaction_rolls_back_every_write() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();

        let result: Result<()> = warehouse.transaction(|w| {
            w.upsert(&location("L1", "Downtown"))?;
            Err(Error::Parse("boom".into()))
        });

        assert!(result.is_err());
        assert_eq!(count(&mut warehouse, "locations"), 0);

        warehouse
            .transaction(|w| w.upsert(&location("L1", "Downtown")))
            .unwrap();
        assert_eq!(count(&mut warehouse, "locations"), 1);
    }

    #[test]
    fn customer_aggregates_come_from_completed_orders() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();
        let ada = warehouse.upsert(&customer("C1", None)).unwrap();

        warehouse
            .upsert(&order("O1", Some(ada), "2024-03-01 10:00:00", dec!(10.00), "completed"))
            .unwrap();
        warehouse
            .upsert(&order("O2", Some(ada), "2024-03-05 10:00:00", dec!(25.01), "completed"))
            .unwrap();
        warehouse
            .upsert(&order("O3", Some(ada), "2024-03-09 10:00:00", dec!(99.00), "canceled"))
            .unwrap();

        assert_eq!(warehouse.refresh_customer_aggregates().unwrap(), 1);

        let (orders_count, spent, average, first, last): (
            i32,
            String,
            String,
            Option<String>,
            Option<String>,
        ) = customers::table
            .find(ada)
            .select((
                customers::total_orders,
                customers::total_spent,
                customers::average_order_value,
                customers::first_purchase_date,
                customers::last_purchase_date,
            ))
            .first(warehouse.conn())
            .unwrap();

        assert_eq!(orders_count, 2);
        assert_eq!(spent, "35.01");
        assert_eq!(average, "17.51");
        assert_eq!(first.as_deref(), Some("2024-03-01"));
        assert_eq!(last.as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn analytics_create_views_and_annotate_market_days_once() {
        let pool = memory_pool();
        let mut warehouse = pool.session().unwrap();
        let today = Utc::now().date_naive().format(DATE_FORMAT).to_string();

        warehouse
            .conn()
            .batch_execute(&format!(
                "INSERT INTO locations (location_id, location_name, location_type) VALUES (1, 'Market', 'flea_market');
                 INSERT INTO market_performance (location_id, market_date, net_profit, booth_cost, notes)
                     VALUES (1, '{today}', '50.00', '25.00', 'Sunny');
                 INSERT INTO social_media_accounts (account_id, platform, account_handle) VALUES (1, 'instagram', 'ig_1');
                 INSERT INTO social_media_posts (post_id, account_id, platform_post_id, posted_date, hashtags)
                     VALUES (1, 1, 'p1', '{today} 08:00:00', '[\"vintage\"]');
                 INSERT INTO social_media_metrics (post_id, metric_date, likes, engagement_rate)
                     VALUES (1, '{today}', 10, '0.0800');"
            ))
            .unwrap();

        warehouse.materialize_analytics().unwrap();
        warehouse.materialize_analytics().unwrap();

        let notes: Option<String> = diesel::sql_query("SELECT notes AS name FROM market_performance")
            .get_result::<NoteRow>(warehouse.conn())
            .unwrap()
            .name;
        assert_eq!(notes.as_deref(), Some("Sunny | Social engagement: 0.0800"));

        let views = diesel::sql_query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'view'",
        )
        .get_result::<Count>(warehouse.conn())
        .unwrap()
        .count;
        assert_eq!(views, 2);
        assert_eq!(count(&mut warehouse, "business_performance_summary"), 1);
    }

    #[derive(diesel::QueryableByName)]
    struct NoteRow {
        #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
        name: Option<String>,
    }

    #[test]
    fn ping_succeeds_on_open_connection() {
        let pool = memory_pool();
        assert!(pool.session().unwrap().ping().is_ok());
    }
}
