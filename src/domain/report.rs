//! Read-side summaries of a loaded warehouse.

use rust_decimal::Decimal;
use serde::Serialize;

/// One row-count check run after a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityCheck {
    pub name: &'static str,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_spent: Decimal,
}

impl TopCustomer {
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        format!("{first} {last}").trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub items_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationProfit {
    pub location_name: String,
    pub average_net_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialEngagement {
    pub posts: i64,
    pub average_likes: Decimal,
    pub average_engagement_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub customers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    /// Month as `YYYY-MM`.
    pub month: String,
    pub orders: i64,
    pub revenue: Decimal,
}

/// Business insights derived from a loaded warehouse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub top_customer: Option<TopCustomer>,
    pub popular_category: Option<CategoryCount>,
    pub best_location: Option<LocationProfit>,
    pub social_engagement: SocialEngagement,
    pub acquisition_sources: Vec<SourceCount>,
    pub monthly_sales: Vec<MonthlySales>,
}
