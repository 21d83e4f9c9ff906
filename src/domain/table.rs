//! Warehouse table catalog.
//!
//! Every table the loader can write is described here once: its columns with
//! their declared kinds and the foreign keys it holds. Column names coming from
//! CSV headers are checked against this catalog before any SQL is built.

/// Declared kind of a warehouse column, driving value coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    /// Fixed-point number rounded to `scale` fractional digits.
    Decimal { scale: u32 },
    Text,
    Bool,
    Date,
    Timestamp,
    /// Ordered sequence of strings, stored as a JSON array.
    TextArray,
    /// Free-form JSON document.
    Json,
}

impl ColumnKind {
    /// Short name used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal { .. } => "decimal",
            Self::Text => "text",
            Self::Bool => "boolean",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::TextArray => "text array",
            Self::Json => "json",
        }
    }
}

const MONEY: ColumnKind = ColumnKind::Decimal { scale: 2 };
const RATE: ColumnKind = ColumnKind::Decimal { scale: 4 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
}

impl ForeignKey {
    pub const fn new(column: &'static str, references: &'static str) -> Self {
        Self { column, references }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// File name of this table's CSV fixture.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name)
    }

    /// Tables this one must be loaded after.
    pub fn dependencies(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.foreign_keys.iter().map(|fk| fk.references)
    }
}

// =============================================================================
// Independent tables
// =============================================================================

pub static LOCATIONS: TableSchema = TableSchema {
    name: "locations",
    columns: &[
        Column::new("location_id", ColumnKind::Integer),
        Column::new("square_location_id", ColumnKind::Text),
        Column::new("location_name", ColumnKind::Text),
        Column::new("location_type", ColumnKind::Text),
        Column::new("address", ColumnKind::Text),
        Column::new("city", ColumnKind::Text),
        Column::new("state_province", ColumnKind::Text),
        Column::new("country", ColumnKind::Text),
        Column::new("postal_code", ColumnKind::Text),
        Column::new("market_fee", MONEY),
        Column::new("setup_date", ColumnKind::Date),
        Column::new("end_date", ColumnKind::Date),
        Column::new("is_active", ColumnKind::Bool),
        Column::new("notes", ColumnKind::Text),
    ],
    foreign_keys: &[],
};

pub static CUSTOMERS: TableSchema = TableSchema {
    name: "customers",
    columns: &[
        Column::new("customer_id", ColumnKind::Integer),
        Column::new("square_customer_id", ColumnKind::Text),
        Column::new("first_name", ColumnKind::Text),
        Column::new("last_name", ColumnKind::Text),
        Column::new("email", ColumnKind::Text),
        Column::new("phone", ColumnKind::Text),
        Column::new("date_of_birth", ColumnKind::Date),
        Column::new("customer_type", ColumnKind::Text),
        Column::new("preferred_eras", ColumnKind::TextArray),
        Column::new("preferred_styles", ColumnKind::TextArray),
        Column::new("preferred_sizes", ColumnKind::TextArray),
        Column::new("total_orders", ColumnKind::Integer),
        Column::new("total_spent", MONEY),
        Column::new("average_order_value", MONEY),
        Column::new("first_purchase_date", ColumnKind::Date),
        Column::new("last_purchase_date", ColumnKind::Date),
        Column::new("acquisition_source", ColumnKind::Text),
    ],
    foreign_keys: &[],
};

pub static INVENTORY_ITEMS: TableSchema = TableSchema {
    name: "inventory_items",
    columns: &[
        Column::new("item_id", ColumnKind::Integer),
        Column::new("square_catalog_id", ColumnKind::Text),
        Column::new("sku", ColumnKind::Text),
        Column::new("item_name", ColumnKind::Text),
        Column::new("brand", ColumnKind::Text),
        Column::new("category", ColumnKind::Text),
        Column::new("subcategory", ColumnKind::Text),
        Column::new("era_decade", ColumnKind::Text),
        Column::new("size", ColumnKind::Text),
        Column::new("measurements", ColumnKind::Json),
        Column::new("condition_rating", ColumnKind::Integer),
        Column::new("condition_notes", ColumnKind::Text),
        Column::new("material", ColumnKind::Text),
        Column::new("color_primary", ColumnKind::Text),
        Column::new("color_secondary", ColumnKind::Text),
        Column::new("pattern", ColumnKind::Text),
        Column::new("cost_price", MONEY),
        Column::new("selling_price", MONEY),
        Column::new("suggested_retail_price", MONEY),
        Column::new("source", ColumnKind::Text),
        Column::new("acquisition_date", ColumnKind::Date),
        Column::new("acquisition_location", ColumnKind::Text),
        Column::new("is_one_of_a_kind", ColumnKind::Bool),
        Column::new("weight_grams", ColumnKind::Integer),
        Column::new("photo_urls", ColumnKind::TextArray),
        Column::new("tags", ColumnKind::TextArray),
        Column::new("status", ColumnKind::Text),
    ],
    foreign_keys: &[],
};

pub static SOCIAL_MEDIA_ACCOUNTS: TableSchema = TableSchema {
    name: "social_media_accounts",
    columns: &[
        Column::new("account_id", ColumnKind::Integer),
        Column::new("platform", ColumnKind::Text),
        Column::new("account_handle", ColumnKind::Text),
        Column::new("account_name", ColumnKind::Text),
        Column::new("api_access_token", ColumnKind::Text),
        Column::new("is_active", ColumnKind::Bool),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Single-FK tables
// =============================================================================

pub static ORDERS: TableSchema = TableSchema {
    name: "orders",
    columns: &[
        Column::new("order_id", ColumnKind::Integer),
        Column::new("square_order_id", ColumnKind::Text),
        Column::new("customer_id", ColumnKind::Integer),
        Column::new("location_id", ColumnKind::Integer),
        Column::new("order_date", ColumnKind::Timestamp),
        Column::new("order_status", ColumnKind::Text),
        Column::new("subtotal", MONEY),
        Column::new("tax_amount", MONEY),
        Column::new("discount_amount", MONEY),
        Column::new("tip_amount", MONEY),
        Column::new("total_amount", MONEY),
        Column::new("payment_method", ColumnKind::Text),
        Column::new("order_source", ColumnKind::Text),
        Column::new("staff_member", ColumnKind::Text),
        Column::new("notes", ColumnKind::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("customer_id", "customers"),
        ForeignKey::new("location_id", "locations"),
    ],
};

pub static PAYMENTS: TableSchema = TableSchema {
    name: "payments",
    columns: &[
        Column::new("payment_id", ColumnKind::Integer),
        Column::new("square_payment_id", ColumnKind::Text),
        Column::new("order_id", ColumnKind::Integer),
        Column::new("payment_date", ColumnKind::Timestamp),
        Column::new("amount", MONEY),
        Column::new("payment_method", ColumnKind::Text),
        Column::new("payment_status", ColumnKind::Text),
        Column::new("processing_fee", MONEY),
        Column::new("square_fee", MONEY),
        Column::new("net_amount", MONEY),
        Column::new("device_name", ColumnKind::Text),
        Column::new("receipt_url", ColumnKind::Text),
    ],
    foreign_keys: &[ForeignKey::new("order_id", "orders")],
};

pub static SOCIAL_MEDIA_POSTS: TableSchema = TableSchema {
    name: "social_media_posts",
    columns: &[
        Column::new("post_id", ColumnKind::Integer),
        Column::new("account_id", ColumnKind::Integer),
        Column::new("platform_post_id", ColumnKind::Text),
        Column::new("post_type", ColumnKind::Text),
        Column::new("caption", ColumnKind::Text),
        Column::new("post_url", ColumnKind::Text),
        Column::new("posted_date", ColumnKind::Timestamp),
        Column::new("hashtags", ColumnKind::TextArray),
        Column::new("mentions", ColumnKind::TextArray),
        Column::new("is_promotional", ColumnKind::Bool),
    ],
    foreign_keys: &[ForeignKey::new("account_id", "social_media_accounts")],
};

pub static MARKET_PERFORMANCE: TableSchema = TableSchema {
    name: "market_performance",
    columns: &[
        Column::new("performance_id", ColumnKind::Integer),
        Column::new("location_id", ColumnKind::Integer),
        Column::new("market_date", ColumnKind::Date),
        Column::new("total_sales", MONEY),
        Column::new("total_transactions", ColumnKind::Integer),
        Column::new("items_sold", ColumnKind::Integer),
        Column::new("average_transaction_value", MONEY),
        Column::new("foot_traffic_estimate", ColumnKind::Integer),
        Column::new("weather", ColumnKind::Text),
        Column::new("competitor_count", ColumnKind::Integer),
        Column::new("booth_cost", MONEY),
        Column::new("travel_expenses", MONEY),
        Column::new("net_profit", MONEY),
        Column::new("customer_acquisition_count", ColumnKind::Integer),
        Column::new("notes", ColumnKind::Text),
    ],
    foreign_keys: &[ForeignKey::new("location_id", "locations")],
};

// =============================================================================
// Multi-FK junction tables
// =============================================================================

pub static ORDER_ITEMS: TableSchema = TableSchema {
    name: "order_items",
    columns: &[
        Column::new("order_item_id", ColumnKind::Integer),
        Column::new("order_id", ColumnKind::Integer),
        Column::new("item_id", ColumnKind::Integer),
        Column::new("line_item_uid", ColumnKind::Text),
        Column::new("quantity", ColumnKind::Integer),
        Column::new("unit_price", MONEY),
        Column::new("discount_amount", MONEY),
        Column::new("total_price", MONEY),
    ],
    foreign_keys: &[
        ForeignKey::new("order_id", "orders"),
        ForeignKey::new("item_id", "inventory_items"),
    ],
};

pub static SOCIAL_MEDIA_METRICS: TableSchema = TableSchema {
    name: "social_media_metrics",
    columns: &[
        Column::new("metric_id", ColumnKind::Integer),
        Column::new("post_id", ColumnKind::Integer),
        Column::new("metric_date", ColumnKind::Date),
        Column::new("impressions", ColumnKind::Integer),
        Column::new("reach", ColumnKind::Integer),
        Column::new("likes", ColumnKind::Integer),
        Column::new("comments", ColumnKind::Integer),
        Column::new("shares", ColumnKind::Integer),
        Column::new("saves", ColumnKind::Integer),
        Column::new("clicks", ColumnKind::Integer),
        Column::new("engagement_rate", RATE),
    ],
    foreign_keys: &[ForeignKey::new("post_id", "social_media_posts")],
};

pub static POST_ITEMS_FEATURED: TableSchema = TableSchema {
    name: "post_items_featured",
    columns: &[
        Column::new("feature_id", ColumnKind::Integer),
        Column::new("post_id", ColumnKind::Integer),
        Column::new("item_id", ColumnKind::Integer),
        Column::new("is_primary_item", ColumnKind::Bool),
    ],
    foreign_keys: &[
        ForeignKey::new("post_id", "social_media_posts"),
        ForeignKey::new("item_id", "inventory_items"),
    ],
};

pub static INVENTORY_LOCATION_TRACKING: TableSchema = TableSchema {
    name: "inventory_location_tracking",
    columns: &[
        Column::new("tracking_id", ColumnKind::Integer),
        Column::new("item_id", ColumnKind::Integer),
        Column::new("location_id", ColumnKind::Integer),
        Column::new("quantity", ColumnKind::Integer),
        Column::new("date_moved", ColumnKind::Date),
        Column::new("moved_by", ColumnKind::Text),
        Column::new("reason", ColumnKind::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("item_id", "inventory_items"),
        ForeignKey::new("location_id", "locations"),
    ],
};

pub static SOCIAL_MEDIA_ATTRIBUTION: TableSchema = TableSchema {
    name: "social_media_attribution",
    columns: &[
        Column::new("attribution_id", ColumnKind::Integer),
        Column::new("customer_id", ColumnKind::Integer),
        Column::new("order_id", ColumnKind::Integer),
        Column::new("post_id", ColumnKind::Integer),
        Column::new("attribution_type", ColumnKind::Text),
        Column::new("attribution_confidence", ColumnKind::Text),
        Column::new("time_from_post_to_purchase_secs", ColumnKind::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("customer_id", "customers"),
        ForeignKey::new("order_id", "orders"),
        ForeignKey::new("post_id", "social_media_posts"),
    ],
};

/// Tables seeded from fixtures, in foreign-key dependency order.
pub static LOAD_ORDER: [&TableSchema; 11] = [
    &LOCATIONS,
    &CUSTOMERS,
    &INVENTORY_ITEMS,
    &SOCIAL_MEDIA_ACCOUNTS,
    &ORDERS,
    &PAYMENTS,
    &SOCIAL_MEDIA_POSTS,
    &MARKET_PERFORMANCE,
    &ORDER_ITEMS,
    &SOCIAL_MEDIA_METRICS,
    &POST_ITEMS_FEATURED,
];

/// Every warehouse table, including the ones only written by sync jobs.
pub static ALL_TABLES: [&TableSchema; 13] = [
    &LOCATIONS,
    &CUSTOMERS,
    &INVENTORY_ITEMS,
    &SOCIAL_MEDIA_ACCOUNTS,
    &ORDERS,
    &PAYMENTS,
    &SOCIAL_MEDIA_POSTS,
    &MARKET_PERFORMANCE,
    &ORDER_ITEMS,
    &SOCIAL_MEDIA_METRICS,
    &POST_ITEMS_FEATURED,
    &INVENTORY_LOCATION_TRACKING,
    &SOCIAL_MEDIA_ATTRIBUTION,
];

/// Find a table by name.
#[must_use]
pub fn table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().copied().find(|schema| schema.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn load_order_respects_every_foreign_key() {
        let mut loaded: HashSet<&str> = HashSet::new();
        for schema in LOAD_ORDER {
            for dependency in schema.dependencies() {
                assert!(
                    loaded.contains(dependency),
                    "{} loads before its dependency {}",
                    schema.name,
                    dependency
                );
            }
            loaded.insert(schema.name);
        }
    }

    #[test]
    fn every_table_orders_after_its_dependencies() {
        let position = |name: &str| ALL_TABLES.iter().position(|t| t.name == name);
        for schema in ALL_TABLES {
            let own = position(schema.name).unwrap();
            for dependency in schema.dependencies() {
                let dep = position(dependency)
                    .unwrap_or_else(|| panic!("{dependency} is not in the catalog"));
                assert!(dep < own, "{} before {}", dependency, schema.name);
            }
        }
    }

    #[test]
    fn foreign_key_columns_are_declared_integers() {
        for schema in ALL_TABLES {
            for fk in schema.foreign_keys {
                let column = schema
                    .column(fk.column)
                    .unwrap_or_else(|| panic!("{}.{} missing", schema.name, fk.column));
                assert_eq!(column.kind, ColumnKind::Integer);
            }
        }
    }

    #[test]
    fn table_names_are_unique() {
        let names: HashSet<&str> = ALL_TABLES.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), ALL_TABLES.len());
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(table("orders").map(|t| t.name), Some("orders"));
        assert!(table("nope").is_none());
    }

    #[test]
    fn array_and_json_columns_match_the_warehouse() {
        let arrays: Vec<_> = ALL_TABLES
            .iter()
            .flat_map(|t| t.columns.iter().map(move |c| (t.name, c)))
            .filter(|(_, c)| c.kind == ColumnKind::TextArray)
            .map(|(t, c)| format!("{t}.{}", c.name))
            .collect();
        assert_eq!(
            arrays,
            vec![
                "customers.preferred_eras",
                "customers.preferred_styles",
                "customers.preferred_sizes",
                "inventory_items.photo_urls",
                "inventory_items.tags",
                "social_media_posts.hashtags",
                "social_media_posts.mentions",
            ]
        );
        assert_eq!(
            INVENTORY_ITEMS.column("measurements").map(|c| c.kind),
            Some(ColumnKind::Json)
        );
    }
}
