//! SQLite read-side report adapter.
//!
//! Integrity checks are plain row counts. Insight queries load the money
//! columns and aggregate them as decimals, since SQLite would sum the stored
//! text as floating point.

use std::collections::BTreeMap;
use std::ops::DerefMut;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use rust_decimal::Decimal;

use crate::adapter::outbound::sqlite::database::connection::DbConnection;
use crate::adapter::outbound::sqlite::database::model::CompletedOrderRow;
use crate::adapter::outbound::sqlite::database::schema::{
    customers, locations, market_performance, orders, social_media_metrics,
};
use crate::domain::aggregate::COMPLETED;
use crate::domain::entity::RowId;
use crate::domain::money::mean;
use crate::domain::report::{
    CategoryCount, Insights, IntegrityCheck, LocationProfit, MonthlySales, SocialEngagement,
    SourceCount, TopCustomer,
};
use crate::domain::value::{round_to_scale, DATE_FORMAT};
use crate::error::{Error, Result};
use crate::port::outbound::report::WarehouseReport;

/// Months covered by the sales trend.
const TREND_MONTHS: u32 = 6;

const INTEGRITY_CHECKS: [(&str, &str); 9] = [
    ("Total customers", "SELECT COUNT(*) AS count FROM customers"),
    ("Total inventory items", "SELECT COUNT(*) AS count FROM inventory_items"),
    ("Total orders", "SELECT COUNT(*) AS count FROM orders"),
    ("Total order items", "SELECT COUNT(*) AS count FROM order_items"),
    (
        "Orders with valid customer references",
        "SELECT COUNT(*) AS count FROM orders o JOIN customers c ON o.customer_id = c.customer_id",
    ),
    (
        "Order items with valid references",
        "SELECT COUNT(*) AS count FROM order_items oi \
         JOIN orders o ON oi.order_id = o.order_id \
         JOIN inventory_items i ON oi.item_id = i.item_id",
    ),
    (
        "Social posts with metrics",
        "SELECT COUNT(*) AS count FROM social_media_posts p \
         JOIN social_media_metrics m ON p.post_id = m.post_id",
    ),
    ("Market performance records", "SELECT COUNT(*) AS count FROM market_performance"),
    (
        "Customers with purchase history",
        "SELECT COUNT(*) AS count FROM customers \
         WHERE total_orders > 0 AND CAST(total_spent AS REAL) > 0",
    ),
];

const POPULAR_CATEGORY: &str = "
SELECT i.category AS category, COUNT(*) AS items_sold
FROM inventory_items i
JOIN order_items oi ON i.item_id = oi.item_id
GROUP BY i.category
ORDER BY items_sold DESC, i.category
LIMIT 1";

const ACQUISITION_SOURCES: &str = "
SELECT acquisition_source AS source, COUNT(*) AS customers
FROM customers
WHERE acquisition_source IS NOT NULL
GROUP BY acquisition_source
ORDER BY customers DESC, acquisition_source";

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct CategoryRow {
    #[diesel(sql_type = Text)]
    category: String,
    #[diesel(sql_type = BigInt)]
    items_sold: i64,
}

#[derive(QueryableByName)]
struct SourceRow {
    #[diesel(sql_type = Text)]
    source: String,
    #[diesel(sql_type = BigInt)]
    customers: i64,
}

/// Report reader over one SQLite connection.
pub struct SqliteReport<C = DbConnection> {
    conn: C,
}

impl<C> SqliteReport<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    #[must_use]
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    fn completed_orders(&mut self) -> Result<Vec<(Option<RowId>, String, Decimal)>> {
        let rows: Vec<CompletedOrderRow> = orders::table
            .filter(orders::order_status.eq(COMPLETED))
            .select(CompletedOrderRow::as_select())
            .load(&mut *self.conn)?;
        rows.into_iter()
            .map(|row| Ok((row.customer_id, row.order_date, parse_decimal(&row.total_amount)?)))
            .collect()
    }

    fn top_customer(&mut self, completed: &[(Option<RowId>, String, Decimal)]) -> Result<Option<TopCustomer>> {
        let mut spend: BTreeMap<RowId, Decimal> = BTreeMap::new();
        for (customer, _, amount) in completed {
            if let Some(customer) = customer {
                *spend.entry(*customer).or_default() += *amount;
            }
        }
        let Some((customer, total)) = best(spend) else {
            return Ok(None);
        };

        let (first_name, last_name): (Option<String>, Option<String>) = customers::table
            .find(customer)
            .select((customers::first_name, customers::last_name))
            .first(&mut *self.conn)?;
        Ok(Some(TopCustomer {
            first_name,
            last_name,
            total_spent: round_to_scale(total, 2),
        }))
    }

    fn best_location(&mut self) -> Result<Option<LocationProfit>> {
        let rows: Vec<(RowId, String, Option<String>)> = market_performance::table
            .inner_join(locations::table)
            .select((
                locations::location_id,
                locations::location_name,
                market_performance::net_profit,
            ))
            .load(&mut *self.conn)?;

        let mut names: BTreeMap<RowId, String> = BTreeMap::new();
        let mut profits: BTreeMap<RowId, Vec<Decimal>> = BTreeMap::new();
        for (location, name, net_profit) in rows {
            names.entry(location).or_insert(name);
            if let Some(raw) = net_profit {
                profits.entry(location).or_default().push(parse_decimal(&raw)?);
            }
        }

        let averages = profits
            .into_iter()
            .map(|(location, values)| (location, mean(&values)));
        Ok(best(averages).map(|(location, average)| LocationProfit {
            location_name: names.remove(&location).unwrap_or_default(),
            average_net_profit: round_to_scale(average, 2),
        }))
    }

    fn social_engagement(&mut self) -> Result<SocialEngagement> {
        let rows: Vec<(i32, String)> = social_media_metrics::table
            .select((social_media_metrics::likes, social_media_metrics::engagement_rate))
            .load(&mut *self.conn)?;

        let likes: Vec<Decimal> = rows.iter().map(|(likes, _)| Decimal::from(*likes)).collect();
        let rates = rows
            .iter()
            .map(|(_, rate)| parse_decimal(rate))
            .collect::<Result<Vec<_>>>()?;

        Ok(SocialEngagement {
            posts: rows.len() as i64,
            average_likes: round_to_scale(mean(&likes), 0),
            average_engagement_rate: round_to_scale(mean(&rates), 4),
        })
    }
}

impl<C> WarehouseReport for SqliteReport<C>
where
    C: DerefMut<Target = SqliteConnection>,
{
    fn integrity_checks(&mut self) -> Result<Vec<IntegrityCheck>> {
        INTEGRITY_CHECKS
            .iter()
            .map(|&(name, sql)| {
                let row = diesel::sql_query(sql).get_result::<CountRow>(&mut *self.conn)?;
                Ok(IntegrityCheck {
                    name,
                    count: row.count,
                })
            })
            .collect()
    }

    fn insights(&mut self, today: NaiveDate) -> Result<Insights> {
        let completed = self.completed_orders()?;
        let amounts: Vec<Decimal> = completed.iter().map(|(_, _, amount)| *amount).collect();

        let top_customer = self.top_customer(&completed)?;

        let popular_category = diesel::sql_query(POPULAR_CATEGORY)
            .load::<CategoryRow>(&mut *self.conn)?
            .into_iter()
            .next()
            .map(|row| CategoryCount {
                category: row.category,
                items_sold: row.items_sold,
            });

        let best_location = self.best_location()?;
        let social_engagement = self.social_engagement()?;

        let acquisition_sources = diesel::sql_query(ACQUISITION_SOURCES)
            .load::<SourceRow>(&mut *self.conn)?
            .into_iter()
            .map(|row| SourceCount {
                source: row.source,
                customers: row.customers,
            })
            .collect();

        let since = today
            .checked_sub_months(Months::new(TREND_MONTHS))
            .unwrap_or(today)
            .format(DATE_FORMAT)
            .to_string();
        let monthly_sales = monthly_trend(
            completed
                .iter()
                .filter(|(_, date, _)| date.as_str() >= since.as_str())
                .map(|(_, date, amount)| (date.as_str(), *amount)),
        );

        Ok(Insights {
            total_revenue: round_to_scale(amounts.iter().sum(), 2),
            average_order_value: round_to_scale(mean(&amounts), 2),
            top_customer,
            popular_category,
            best_location,
            social_engagement,
            acquisition_sources,
            monthly_sales,
        })
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| Error::Parse(format!("stored amount {raw:?}: {e}")))
}

/// Highest value; ties go to the lowest key.
fn best<K: Ord + Copy>(values: impl IntoIterator<Item = (K, Decimal)>) -> Option<(K, Decimal)> {
    values.into_iter().fold(None, |best, (key, value)| match best {
        Some((best_key, best_value)) if best_value > value || (best_value == value && best_key < key) => {
            Some((best_key, best_value))
        }
        _ => Some((key, value)),
    })
}

/// Orders and revenue per `YYYY-MM`, newest first, at most [`TREND_MONTHS`] months.
fn monthly_trend<'a>(orders: impl Iterator<Item = (&'a str, Decimal)>) -> Vec<MonthlySales> {
    let mut months: BTreeMap<&str, (i64, Decimal)> = BTreeMap::new();
    for (date, amount) in orders {
        let month = date.get(..7).unwrap_or(date);
        let entry = months.entry(month).or_default();
        entry.0 += 1;
        entry.1 += amount;
    }
    months
        .into_iter()
        .rev()
        .take(TREND_MONTHS as usize)
        .map(|(month, (orders, revenue))| MonthlySales {
            month: month.to_string(),
            orders,
            revenue: round_to_scale(revenue, 2),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use diesel::connection::SimpleConnection;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{establish, run_migrations_on};

    const SEED: &str = "
INSERT INTO locations (location_id, location_name, location_type) VALUES
    (1, 'Riverside Flea', 'flea_market'),
    (2, 'Online', 'online_only');
INSERT INTO customers (customer_id, first_name, last_name, email, acquisition_source, total_orders, total_spent) VALUES
    (1, 'Ada', 'Lovelace', 'ada@example.com', 'instagram', 2, '35.00'),
    (2, 'Grace', 'Hopper', 'grace@example.com', 'instagram', 1, '80.00'),
    (3, 'Alan', NULL, 'alan@example.com', 'market', 0, '0.00'),
    (4, 'Edsger', NULL, 'edsger@example.com', NULL, 0, '0.00');
INSERT INTO inventory_items (item_id, item_name, category, selling_price) VALUES
    (1, 'Coat', 'jackets', '40.00'),
    (2, 'Scarf', 'accessories', '10.00'),
    (3, 'Jacket', 'jackets', '55.00');
INSERT INTO orders (order_id, customer_id, location_id, order_date, order_status, subtotal, total_amount) VALUES
    (1, 1, 1, '2024-05-03 10:00:00', 'completed', '10.00', '10.00'),
    (2, 1, 1, '2024-06-10 10:00:00', 'completed', '25.00', '25.00'),
    (3, 2, 2, '2024-06-11 10:00:00', 'completed', '80.00', '80.00'),
    (4, 2, 2, '2024-06-12 10:00:00', 'canceled', '99.00', '99.00'),
    (5, NULL, 1, '2023-01-05 10:00:00', 'completed', '5.00', '5.00');
INSERT INTO order_items (order_id, item_id, quantity, unit_price, total_price) VALUES
    (1, 2, 1, '10.00', '10.00'),
    (2, 1, 1, '25.00', '25.00'),
    (3, 3, 1, '80.00', '80.00');
INSERT INTO market_performance (location_id, market_date, net_profit) VALUES
    (1, '2024-06-01', '100.00'),
    (1, '2024-06-08', '50.00'),
    (2, '2024-06-01', '60.00');
INSERT INTO social_media_accounts (account_id, platform, account_handle) VALUES (1, 'instagram', 'ig_1');
INSERT INTO social_media_posts (post_id, account_id, platform_post_id, posted_date) VALUES
    (1, 1, 'p1', '2024-06-01 08:00:00'),
    (2, 1, 'p2', '2024-06-02 08:00:00');
INSERT INTO social_media_metrics (post_id, metric_date, likes, engagement_rate) VALUES
    (1, '2024-06-01', 10, '0.0500'),
    (2, '2024-06-02', 15, '0.0800');
";

    fn seeded() -> SqliteConnection {
        let mut conn = establish(":memory:").unwrap();
        run_migrations_on(&mut conn).unwrap();
        conn.batch_execute(SEED).unwrap();
        conn
    }

    #[test]
    fn integrity_checks_count_rows_and_references() {
        let mut conn = seeded();
        let checks = SqliteReport::new(&mut conn).integrity_checks().unwrap();
        let by_name = |name: &str| checks.iter().find(|c| c.name == name).unwrap().count;

        assert_eq!(checks.len(), 9);
        assert_eq!(by_name("Total customers"), 4);
        assert_eq!(by_name("Total orders"), 5);
        assert_eq!(by_name("Orders with valid customer references"), 4);
        assert_eq!(by_name("Order items with valid references"), 3);
        assert_eq!(by_name("Social posts with metrics"), 2);
        assert_eq!(by_name("Market performance records"), 3);
        assert_eq!(by_name("Customers with purchase history"), 2);
    }

    #[test]
    fn insights_aggregate_completed_orders_as_decimals() {
        let mut conn = seeded();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let insights = SqliteReport::new(&mut conn).insights(today).unwrap();

        assert_eq!(insights.total_revenue, dec!(120.00));
        assert_eq!(insights.average_order_value, dec!(30.00));

        let top = insights.top_customer.unwrap();
        assert_eq!(top.display_name(), "Grace Hopper");
        assert_eq!(top.total_spent, dec!(80.00));

        let category = insights.popular_category.unwrap();
        assert_eq!(category.category, "jackets");
        assert_eq!(category.items_sold, 2);

        let location = insights.best_location.unwrap();
        assert_eq!(location.location_name, "Riverside Flea");
        assert_eq!(location.average_net_profit, dec!(75.00));

        assert_eq!(insights.social_engagement.posts, 2);
        assert_eq!(insights.social_engagement.average_likes, dec!(13));
        assert_eq!(insights.social_engagement.average_engagement_rate, dec!(0.0650));

        let sources: Vec<_> = insights
            .acquisition_sources
            .iter()
            .map(|s| (s.source.as_str(), s.customers))
            .collect();
        assert_eq!(sources, vec![("instagram", 2), ("market", 1)]);
    }

    #[test]
    fn monthly_trend_covers_recent_months_newest_first() {
        let mut conn = seeded();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let insights = SqliteReport::new(&mut conn).insights(today).unwrap();

        let months: Vec<_> = insights
            .monthly_sales
            .iter()
            .map(|m| (m.month.as_str(), m.orders, m.revenue))
            .collect();
        assert_eq!(
            months,
            vec![("2024-06", 2, dec!(105.00)), ("2024-05", 1, dec!(10.00))]
        );
    }

    #[test]
    fn monthly_trend_cutoff_is_day_precise() {
        let mut conn = seeded();
        let trend = |conn: &mut SqliteConnection, today: NaiveDate| -> Vec<String> {
            let insights = SqliteReport::new(conn).insights(today).unwrap();
            insights.monthly_sales.into_iter().map(|m| m.month).collect()
        };

        // 2024-05-02 cutoff keeps the order placed on 2024-05-03.
        let kept = trend(&mut conn, NaiveDate::from_ymd_opt(2024, 11, 2).unwrap());
        assert_eq!(kept, vec!["2024-06", "2024-05"]);

        // 2024-05-04 cutoff drops it even though May is within six months.
        let dropped = trend(&mut conn, NaiveDate::from_ymd_opt(2024, 11, 4).unwrap());
        assert_eq!(dropped, vec!["2024-06"]);
    }

    #[test]
    fn empty_warehouse_has_neutral_insights() {
        let mut conn = establish(":memory:").unwrap();
        run_migrations_on(&mut conn).unwrap();
        let insights = SqliteReport::new(&mut conn)
            .insights(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .unwrap();

        assert_eq!(insights.total_revenue, Decimal::ZERO);
        assert!(insights.top_customer.is_none());
        assert!(insights.popular_category.is_none());
        assert!(insights.best_location.is_none());
        assert_eq!(insights.social_engagement.posts, 0);
        assert!(insights.monthly_sales.is_empty());
    }

    #[test]
    fn best_prefers_lowest_key_on_ties() {
        assert_eq!(best([(2, dec!(5)), (1, dec!(5)), (3, dec!(4))]), Some((1, dec!(5))));
        assert_eq!(best(Vec::<(i32, Decimal)>::new()), None);
    }
}
