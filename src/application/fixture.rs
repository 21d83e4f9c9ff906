//! Synthetic fixture generation for a vintage clothing business.
//!
//! Every loader table is written as `<table>.csv` from an explicit seed, so
//! the same [`FixtureConfig`] always produces byte-identical files. Generated
//! rows respect every foreign key and unique key of the warehouse schema.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::aggregate::{summarize, COMPLETED};
use crate::domain::entity::RowId;
use crate::domain::table::{
    TableSchema, CUSTOMERS, INVENTORY_ITEMS, LOCATIONS, MARKET_PERFORMANCE, ORDERS, ORDER_ITEMS,
    PAYMENTS, POST_ITEMS_FEATURED, SOCIAL_MEDIA_ACCOUNTS, SOCIAL_MEDIA_METRICS,
    SOCIAL_MEDIA_POSTS,
};
use crate::domain::value::{format_decimal, round_to_scale};
use crate::error::{ConfigError, Result};

const HST: Decimal = dec!(0.13);
const CARD_RATE: Decimal = dec!(0.029);
const CARD_FIXED: Decimal = dec!(0.30);
const SQUARE_RATE: Decimal = dec!(0.026);

const LOCATION_TYPES: [(&str, u32); 3] = [("pop_up_market", 40), ("festival", 30), ("craft_fair", 30)];
const CITIES: [&str; 11] = [
    "Toronto", "Toronto", "Toronto", "Mississauga", "Brampton", "Hamilton", "Burlington",
    "Oakville", "Markham", "Richmond Hill", "Vaughan",
];
const STREETS: [&str; 12] = [
    "Queen", "King", "Ossington", "Dundas", "College", "Spadina", "Bloor", "Kensington",
    "Roncesvalles", "Danforth", "Leslieville", "Junction",
];

const FIRST_NAMES_F: [&str; 12] = [
    "Ava", "Chloe", "Maya", "Olivia", "Priya", "Sofia", "Hannah", "Leah", "Emma", "Zoe", "Nora",
    "Isla",
];
const FIRST_NAMES_M: [&str; 6] = ["Liam", "Noah", "Ethan", "Owen", "Lucas", "Arjun"];
const LAST_NAMES: [&str; 14] = [
    "Tremblay", "Martin", "Roy", "Wilson", "MacDonald", "Gagnon", "Taylor", "Singh", "Chen",
    "Brown", "Campbell", "Patel", "Nguyen", "Kelly",
];
const CUSTOMER_TYPES: [(&str, u32); 3] = [("collector", 20), ("casual_buyer", 70), ("reseller", 10)];
const ACQUISITION_SOURCES: [(&str, u32); 5] = [
    ("instagram", 40),
    ("tiktok", 20),
    ("word_of_mouth", 20),
    ("walk_by", 15),
    ("referral", 5),
];
const ERAS: [&str; 5] = ["1960s", "1970s", "1980s", "1990s", "Y2K"];
const ERA_WEIGHTS: [(&str, u32); 5] = [
    ("1960s", 10),
    ("1970s", 25),
    ("1980s", 30),
    ("1990s", 25),
    ("Y2K", 10),
];
const STYLES: [&str; 8] = [
    "bohemian", "grunge", "preppy", "punk", "disco", "band_tees", "minimalist", "romantic",
];
const SIZES: [&str; 10] = [
    "XS", "S", "M", "L", "XL", "size_6", "size_8", "size_10", "size_12", "size_14",
];

const CATEGORIES: [(&str, &[&str]); 6] = [
    ("dresses", &["mini_dress", "midi_dress", "maxi_dress", "cocktail_dress"]),
    ("tops", &["blouse", "sweater", "t_shirt", "tank_top", "blazer"]),
    ("bottoms", &["jeans", "skirt", "pants", "shorts"]),
    ("jackets", &["leather_jacket", "denim_jacket", "blazer", "cardigan"]),
    ("accessories", &["handbag", "scarf", "jewelry", "belt"]),
    ("shoes", &["boots", "heels", "flats", "sneakers"]),
];
const BRANDS: [(&str, u32); 14] = [
    ("Vintage Levi's", 15),
    ("Unknown", 30),
    ("Diane von Furstenberg", 5),
    ("Chanel", 3),
    ("Gucci", 3),
    ("Zara", 8),
    ("H&M", 8),
    ("Forever 21", 8),
    ("Ann Taylor", 5),
    ("Banana Republic", 5),
    ("J.Crew", 5),
    ("Vintage Band Tee", 2),
    ("Local Designer", 2),
    ("Handmade", 1),
];
const SHADES: [&str; 10] = [
    "Mustard", "Burgundy", "Olive", "Teal", "Rust", "Lavender", "Cream", "Navy", "Coral", "Sage",
];
const MATERIALS: [&str; 8] = [
    "cotton", "silk", "wool", "polyester", "leather", "denim", "cashmere", "linen",
];
const COLORS: [&str; 10] = [
    "black", "white", "red", "blue", "green", "yellow", "pink", "purple", "brown", "gray",
];
const PATTERNS: [&str; 6] = ["solid", "floral", "stripes", "polka_dot", "geometric", "animal_print"];
const ITEM_SOURCES: [&str; 5] = [
    "estate_sale", "thrift_store", "consignment", "online_marketplace", "donation",
];
const ITEM_TAGS: [&str; 6] = ["bohemian", "festival", "statement_piece", "vintage", "retro", "classic"];
const ITEM_STATUS: [(&str, u32); 3] = [("sold", 60), ("available", 35), ("reserved", 5)];
const CONDITIONS: [(i32, u32); 3] = [(3, 20), (4, 50), (5, 30)];

const ORDER_SIZES: [(usize, u32); 4] = [(1, 60), (2, 25), (3, 10), (4, 5)];
const ORDER_SOURCES: [(&str, u32); 4] = [
    ("in_person", 50),
    ("instagram_dm", 30),
    ("website", 15),
    ("phone", 5),
];
const PAYMENT_METHODS: [(&str, u32); 3] = [("card", 70), ("cash", 20), ("digital_wallet", 10)];

const POST_TYPES: [(&str, u32); 4] = [("photo", 40), ("video", 20), ("carousel", 30), ("story", 10)];
const POST_ACCOUNTS: [(RowId, u32); 2] = [(1, 70), (2, 30)];
const HASHTAGS: [&str; 10] = [
    "#vintage", "#thrifted", "#sustainable", "#90s", "#y2k", "#vintageootd", "#torontovintage",
    "#vintageclothing", "#secondhand", "#upcycled",
];
const CAPTIONS: [&str; 8] = [
    "New drop this weekend",
    "Fresh finds from the estate sale circuit",
    "Find us at the market on Saturday",
    "Styled three ways",
    "One of a kind and ready for a new home",
    "Restocked the rack with autumn layers",
    "Behind the scenes at the studio",
    "Your favourite decade, all in one booth",
];
const SENTENCES: [&str; 6] = [
    "Great turnout despite the weather.",
    "Booth near the main entrance.",
    "Small mark near the hem.",
    "Regulars asked about more denim.",
    "Shared table with a local maker.",
    "Slight fading consistent with age.",
];
const WEATHER: [&str; 4] = ["sunny", "cloudy", "rainy", "cold"];

/// Sizes, date range and seed of a fixture set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureConfig {
    pub seed: u64,
    /// Physical markets plus the online store, which is always the last row.
    pub locations: usize,
    pub customers: usize,
    pub items: usize,
    pub orders: usize,
    pub posts: usize,
    pub market_events: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            locations: 12,
            customers: 150,
            items: 300,
            orders: 180,
            posts: 80,
            market_events: 30,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
        }
    }
}

impl FixtureConfig {
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::InvalidValue {
            field,
            reason: reason.to_string(),
        };
        if self.locations < 2 {
            return Err(invalid("locations", "need at least one market and the online store"));
        }
        if self.customers == 0 {
            return Err(invalid("customers", "must be positive"));
        }
        if self.items == 0 {
            return Err(invalid("items", "must be positive"));
        }
        if self.end <= self.start {
            return Err(invalid("end", "must be after start"));
        }
        Ok(())
    }
}

/// Rows written for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureSummary {
    pub out_dir: PathBuf,
    pub tables: Vec<TableCount>,
}

impl FixtureSummary {
    #[must_use]
    pub fn rows(&self, table: &str) -> Option<usize> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.rows)
    }
}

#[derive(Debug, Serialize)]
struct LocationRow {
    location_id: RowId,
    location_name: String,
    location_type: &'static str,
    address: Option<String>,
    city: &'static str,
    state_province: &'static str,
    country: &'static str,
    postal_code: Option<String>,
    market_fee: String,
    setup_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    is_active: bool,
    notes: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct CustomerRow {
    customer_id: RowId,
    square_customer_id: String,
    first_name: &'static str,
    last_name: &'static str,
    email: String,
    phone: String,
    date_of_birth: NaiveDate,
    customer_type: &'static str,
    preferred_eras: String,
    preferred_styles: String,
    preferred_sizes: String,
    total_orders: i32,
    total_spent: String,
    average_order_value: String,
    first_purchase_date: Option<NaiveDate>,
    last_purchase_date: Option<NaiveDate>,
    acquisition_source: &'static str,
}

#[derive(Debug, Serialize)]
struct ItemRow {
    item_id: RowId,
    square_catalog_id: String,
    sku: String,
    item_name: String,
    brand: &'static str,
    category: &'static str,
    subcategory: &'static str,
    era_decade: &'static str,
    size: &'static str,
    measurements: String,
    condition_rating: i32,
    condition_notes: Option<&'static str>,
    material: &'static str,
    color_primary: &'static str,
    color_secondary: Option<&'static str>,
    pattern: &'static str,
    cost_price: String,
    selling_price: String,
    suggested_retail_price: String,
    source: &'static str,
    acquisition_date: NaiveDate,
    acquisition_location: &'static str,
    is_one_of_a_kind: bool,
    weight_grams: i32,
    photo_urls: String,
    tags: String,
    status: &'static str,
    #[serde(skip)]
    price: Decimal,
}

#[derive(Debug, Serialize)]
struct AccountRow {
    account_id: RowId,
    platform: &'static str,
    account_handle: &'static str,
    account_name: &'static str,
    is_active: bool,
}

#[derive(Debug, Serialize)]
struct OrderRow {
    order_id: RowId,
    square_order_id: String,
    customer_id: RowId,
    location_id: RowId,
    order_date: NaiveDateTime,
    order_status: &'static str,
    subtotal: String,
    tax_amount: String,
    discount_amount: String,
    tip_amount: String,
    total_amount: String,
    payment_method: &'static str,
    order_source: &'static str,
    staff_member: &'static str,
    notes: Option<&'static str>,
    #[serde(skip)]
    total: Decimal,
}

#[derive(Debug, Serialize)]
struct OrderItemRow {
    order_item_id: RowId,
    order_id: RowId,
    item_id: RowId,
    line_item_uid: String,
    quantity: i32,
    unit_price: String,
    discount_amount: String,
    total_price: String,
}

#[derive(Debug, Serialize)]
struct PaymentRow {
    payment_id: RowId,
    square_payment_id: String,
    order_id: RowId,
    payment_date: NaiveDateTime,
    amount: String,
    payment_method: &'static str,
    payment_status: &'static str,
    processing_fee: String,
    square_fee: String,
    net_amount: String,
    device_name: &'static str,
    receipt_url: String,
}

#[derive(Debug, Serialize)]
struct PostRow {
    post_id: RowId,
    account_id: RowId,
    platform_post_id: String,
    post_type: &'static str,
    caption: String,
    post_url: String,
    posted_date: NaiveDateTime,
    hashtags: String,
    mentions: String,
    is_promotional: bool,
}

#[derive(Debug, Serialize)]
struct MetricRow {
    metric_id: RowId,
    post_id: RowId,
    metric_date: NaiveDate,
    impressions: i32,
    reach: i32,
    likes: i32,
    comments: i32,
    shares: i32,
    saves: i32,
    clicks: i32,
    engagement_rate: String,
}

#[derive(Debug, Serialize)]
struct FeatureRow {
    feature_id: RowId,
    post_id: RowId,
    item_id: RowId,
    is_primary_item: bool,
}

#[derive(Debug, Serialize)]
struct MarketRow {
    performance_id: RowId,
    location_id: RowId,
    market_date: NaiveDate,
    total_sales: String,
    total_transactions: i32,
    items_sold: i32,
    average_transaction_value: String,
    foot_traffic_estimate: i32,
    weather: &'static str,
    competitor_count: i32,
    booth_cost: String,
    travel_expenses: String,
    net_profit: String,
    customer_acquisition_count: i32,
    notes: Option<&'static str>,
}

/// Generate every fixture table into `out_dir`, replacing existing files.
///
/// # Errors
/// Returns a config error for unusable sizes or dates, and IO/CSV errors
/// when a file cannot be written.
pub fn generate(config: &FixtureConfig, out_dir: &Path) -> Result<FixtureSummary> {
    config.validate()?;
    std::fs::create_dir_all(out_dir)?;
    info!(seed = config.seed, out_dir = %out_dir.display(), "Generating fixtures");

    let mut gen = Generator {
        rng: StdRng::seed_from_u64(config.seed),
        config,
    };

    let locations = gen.locations();
    let mut customers = gen.customers();
    let items = gen.items();
    let accounts = accounts();
    let (orders, order_items, payments) = gen.orders(&items);
    apply_purchase_totals(&mut customers, &orders);
    let (posts, metrics, features) = gen.posts();
    let markets = gen.market_performance(&orders, &order_items);

    let tables = vec![
        write_table(out_dir, &LOCATIONS, &locations)?,
        write_table(out_dir, &CUSTOMERS, &customers)?,
        write_table(out_dir, &INVENTORY_ITEMS, &items)?,
        write_table(out_dir, &SOCIAL_MEDIA_ACCOUNTS, &accounts)?,
        write_table(out_dir, &ORDERS, &orders)?,
        write_table(out_dir, &PAYMENTS, &payments)?,
        write_table(out_dir, &SOCIAL_MEDIA_POSTS, &posts)?,
        write_table(out_dir, &MARKET_PERFORMANCE, &markets)?,
        write_table(out_dir, &ORDER_ITEMS, &order_items)?,
        write_table(out_dir, &SOCIAL_MEDIA_METRICS, &metrics)?,
        write_table(out_dir, &POST_ITEMS_FEATURED, &features)?,
    ];

    info!(tables = tables.len(), "Fixtures written");
    Ok(FixtureSummary {
        out_dir: out_dir.to_path_buf(),
        tables,
    })
}

fn write_table<T: Serialize>(dir: &Path, schema: &'static TableSchema, rows: &[T]) -> Result<TableCount> {
    let path = dir.join(schema.file_name());
    let mut writer = csv::Writer::from_path(&path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    debug!(table = schema.name, rows = rows.len(), "Fixture table written");
    Ok(TableCount {
        table: schema.name,
        rows: rows.len(),
    })
}

fn money(value: Decimal) -> String {
    format_decimal(value, 2)
}

fn cents(rng: &mut StdRng, low: i64, high: i64) -> Decimal {
    Decimal::new(rng.gen_range(low..=high), 2)
}

fn id(index: usize) -> RowId {
    RowId::try_from(index + 1).unwrap_or(RowId::MAX)
}

/// `['a', 'b']`, the list notation the loader's literal parser reads.
fn list_literal<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{}'", item.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

fn weighted<T: Copy>(rng: &mut StdRng, choices: &[(T, u32)]) -> T {
    let total: u32 = choices.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total.max(1));
    for &(choice, weight) in choices {
        if roll < weight {
            return choice;
        }
        roll -= weight;
    }
    choices[choices.len() - 1].0
}

fn pick<T: Copy>(rng: &mut StdRng, choices: &[T]) -> T {
    choices[rng.gen_range(0..choices.len())]
}

fn sample<T: Copy>(rng: &mut StdRng, pool: &[T], low: usize, high: usize) -> Vec<T> {
    let amount = rng.gen_range(low..=high).min(pool.len());
    pool.choose_multiple(rng, amount).copied().collect()
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn accounts() -> Vec<AccountRow> {
    vec![
        AccountRow {
            account_id: 1,
            platform: "instagram",
            account_handle: "@curatedcloset_vintage",
            account_name: "Curated Closet Vintage",
            is_active: true,
        },
        AccountRow {
            account_id: 2,
            platform: "tiktok",
            account_handle: "@curatedcloset",
            account_name: "Curated Closet",
            is_active: true,
        },
        AccountRow {
            account_id: 3,
            platform: "facebook",
            account_handle: "curatedclosetvintage",
            account_name: "Curated Closet Vintage",
            is_active: false,
        },
    ]
}

/// Customer totals follow from their completed orders.
fn apply_purchase_totals(customers: &mut [CustomerRow], orders: &[OrderRow]) {
    let summaries = summarize(
        orders
            .iter()
            .filter(|order| order.order_status == COMPLETED)
            .map(|order| (order.customer_id, order.order_date.date(), order.total)),
    );
    for customer in customers {
        if let Some(summary) = summaries.get(&customer.customer_id) {
            customer.total_orders = summary.total_orders;
            customer.total_spent = money(summary.total_spent);
            customer.average_order_value = money(round_to_scale(summary.average_order_value(), 2));
            customer.first_purchase_date = Some(summary.first_purchase);
            customer.last_purchase_date = Some(summary.last_purchase);
        }
    }
}

struct Generator<'a> {
    rng: StdRng,
    config: &'a FixtureConfig,
}

impl Generator<'_> {
    fn date_between(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate {
        let days = (end - start).num_days().max(1);
        start + Duration::days(self.rng.gen_range(0..days))
    }

    fn date(&mut self) -> NaiveDate {
        self.date_between(self.config.start, self.config.end)
    }

    /// A time during trading hours on a random day.
    fn timestamp(&mut self) -> NaiveDateTime {
        let date = self.date();
        let seconds = self.rng.gen_range(9 * 3600..19 * 3600);
        date.and_time(NaiveTime::default()) + Duration::seconds(seconds)
    }

    fn sometimes<T>(&mut self, probability: f64, value: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.rng.gen_bool(probability) {
            Some(value(self))
        } else {
            None
        }
    }

    fn sentence(&mut self) -> &'static str {
        pick(&mut self.rng, &SENTENCES)
    }

    fn locations(&mut self) -> Vec<LocationRow> {
        let markets = self.config.locations - 1;
        let mut rows: Vec<LocationRow> = (0..markets)
            .map(|i| {
                let street = pick(&mut self.rng, &STREETS);
                LocationRow {
                    location_id: id(i),
                    location_name: format!("{street} Street Market"),
                    location_type: weighted(&mut self.rng, &LOCATION_TYPES),
                    address: Some(format!("{} {street} St", self.rng.gen_range(10..2000))),
                    city: CITIES[i % CITIES.len()],
                    state_province: "ON",
                    country: "Canada",
                    postal_code: Some(format!(
                        "M{}{} {}A{}",
                        self.rng.gen_range(1..10),
                        pick(&mut self.rng, &['A', 'B', 'C', 'E', 'H', 'J', 'K', 'L']),
                        self.rng.gen_range(1..10),
                        self.rng.gen_range(1..10)
                    )),
                    market_fee: money(cents(&mut self.rng, 5_000, 20_000)),
                    setup_date: Some(self.date()),
                    end_date: None,
                    is_active: self.rng.gen_ratio(3, 4),
                    notes: Some(self.sentence()),
                }
            })
            .collect();

        rows.push(LocationRow {
            location_id: id(markets),
            location_name: "Online Store".into(),
            location_type: "online_only",
            address: None,
            city: "Online",
            state_province: "ON",
            country: "Canada",
            postal_code: None,
            market_fee: money(Decimal::ZERO),
            setup_date: None,
            end_date: None,
            is_active: true,
            notes: Some("Instagram and direct messages"),
        });
        rows
    }

    fn customers(&mut self) -> Vec<CustomerRow> {
        (0..self.config.customers)
            .map(|i| {
                let first_name = if self.rng.gen_ratio(3, 4) {
                    pick(&mut self.rng, &FIRST_NAMES_F)
                } else {
                    pick(&mut self.rng, &FIRST_NAMES_M)
                };
                let last_name = pick(&mut self.rng, &LAST_NAMES);
                let born_days = self.rng.gen_range(18 * 365..65 * 365);
                CustomerRow {
                    customer_id: id(i),
                    square_customer_id: format!("sq_cust_{:03}", i + 1),
                    first_name,
                    last_name,
                    email: format!("{first_name}.{last_name}{}@example.com", i + 1).to_lowercase(),
                    phone: format!(
                        "416-{:03}-{:04}",
                        self.rng.gen_range(200..1000),
                        self.rng.gen_range(0..10_000)
                    ),
                    date_of_birth: self.config.end - Duration::days(born_days),
                    customer_type: weighted(&mut self.rng, &CUSTOMER_TYPES),
                    preferred_eras: list_literal(&sample(&mut self.rng, &ERAS, 1, 2)),
                    preferred_styles: list_literal(&sample(&mut self.rng, &STYLES, 1, 3)),
                    preferred_sizes: list_literal(&sample(&mut self.rng, &SIZES, 1, 2)),
                    total_orders: 0,
                    total_spent: money(Decimal::ZERO),
                    average_order_value: money(Decimal::ZERO),
                    first_purchase_date: None,
                    last_purchase_date: None,
                    acquisition_source: weighted(&mut self.rng, &ACQUISITION_SOURCES),
                }
            })
            .collect()
    }

    fn items(&mut self) -> Vec<ItemRow> {
        (0..self.config.items)
            .map(|i| {
                let (category, subcategories) = pick(&mut self.rng, &CATEGORIES);
                let subcategory = pick(&mut self.rng, subcategories);
                let cost = cents(&mut self.rng, 500, 8_000);
                let markup = Decimal::new(self.rng.gen_range(200..=500), 2);
                let selling = round_to_scale(cost * markup, 2);
                let measurements = serde_json::json!({
                    "chest": format!("{}\"", self.rng.gen_range(32..=42)),
                    "waist": format!("{}\"", self.rng.gen_range(24..=36)),
                    "length": format!("{}\"", self.rng.gen_range(20..=50)),
                });
                let photos: Vec<String> = (0..self.rng.gen_range(1..=4))
                    .map(|j| format!("https://example.com/photos/item_{}_{j}.jpg", i + 1))
                    .collect();

                ItemRow {
                    item_id: id(i),
                    square_catalog_id: format!("sq_item_{:03}", i + 1),
                    sku: format!("VIN{:04}", i + 1),
                    item_name: format!("{} {}", pick(&mut self.rng, &SHADES), title_case(subcategory)),
                    brand: weighted(&mut self.rng, &BRANDS),
                    category,
                    subcategory,
                    era_decade: weighted(&mut self.rng, &ERA_WEIGHTS),
                    size: pick(&mut self.rng, &SIZES),
                    measurements: measurements.to_string(),
                    condition_rating: weighted(&mut self.rng, &CONDITIONS),
                    condition_notes: self.sometimes(0.3, Self::sentence),
                    material: pick(&mut self.rng, &MATERIALS),
                    color_primary: pick(&mut self.rng, &COLORS),
                    color_secondary: self.sometimes(0.3, |g| pick(&mut g.rng, &COLORS)),
                    pattern: pick(&mut self.rng, &PATTERNS),
                    cost_price: money(cost),
                    selling_price: money(selling),
                    suggested_retail_price: money(round_to_scale(selling * dec!(1.2), 2)),
                    source: pick(&mut self.rng, &ITEM_SOURCES),
                    acquisition_date: self.date(),
                    acquisition_location: pick(&mut self.rng, &CITIES),
                    is_one_of_a_kind: true,
                    weight_grams: self.rng.gen_range(100..=2000),
                    photo_urls: list_literal(&photos),
                    tags: list_literal(&sample(&mut self.rng, &ITEM_TAGS, 1, 3)),
                    status: weighted(&mut self.rng, &ITEM_STATUS),
                    price: selling,
                }
            })
            .collect()
    }

    /// Orders draw their lines from sold items; each gets one card-style payment.
    fn orders(&mut self, items: &[ItemRow]) -> (Vec<OrderRow>, Vec<OrderItemRow>, Vec<PaymentRow>) {
        let sold: Vec<&ItemRow> = items.iter().filter(|item| item.status == "sold").collect();
        let mut orders = Vec::new();
        let mut lines = Vec::new();
        let mut payments = Vec::new();
        if sold.is_empty() {
            return (orders, lines, payments);
        }

        for n in 0..self.config.orders {
            let order_id = id(n);
            let size = weighted(&mut self.rng, &ORDER_SIZES);
            let picked: Vec<&ItemRow> = sold.choose_multiple(&mut self.rng, size).copied().collect();
            let order_date = self.timestamp();

            let subtotal: Decimal = picked.iter().map(|item| item.price).sum();
            let tax = round_to_scale(subtotal * HST, 2);
            let discount = if self.rng.gen_bool(0.1) {
                round_to_scale(subtotal * Decimal::new(self.rng.gen_range(0..=20), 2), 2)
            } else {
                Decimal::ZERO
            };
            let tip = if self.rng.gen_bool(0.3) {
                cents(&mut self.rng, 0, 2_000)
            } else {
                Decimal::ZERO
            };
            let total = subtotal + tax - discount + tip;
            let payment_method = weighted(&mut self.rng, &PAYMENT_METHODS);

            for (position, item) in picked.iter().enumerate() {
                lines.push(OrderItemRow {
                    order_item_id: id(lines.len()),
                    order_id,
                    item_id: item.item_id,
                    line_item_uid: format!("line-{position}"),
                    quantity: 1,
                    unit_price: money(item.price),
                    discount_amount: money(Decimal::ZERO),
                    total_price: money(item.price),
                });
            }

            let card_fee = total * CARD_RATE + CARD_FIXED;
            payments.push(PaymentRow {
                payment_id: order_id,
                square_payment_id: format!("sq_pay_{:03}", order_id),
                order_id,
                payment_date: order_date,
                amount: money(total),
                payment_method,
                payment_status: COMPLETED,
                processing_fee: money(round_to_scale(card_fee, 2)),
                square_fee: money(round_to_scale(total * SQUARE_RATE, 2)),
                net_amount: money(round_to_scale(total - card_fee, 2)),
                device_name: "Square Terminal",
                receipt_url: format!("https://squareup.com/receipt/{order_id}"),
            });

            orders.push(OrderRow {
                order_id,
                square_order_id: format!("sq_order_{:03}", order_id),
                customer_id: id(self.rng.gen_range(0..self.config.customers)),
                location_id: id(self.rng.gen_range(0..self.config.locations)),
                order_date,
                order_status: COMPLETED,
                subtotal: money(subtotal),
                tax_amount: money(tax),
                discount_amount: money(discount),
                tip_amount: money(tip),
                total_amount: money(total),
                payment_method,
                order_source: weighted(&mut self.rng, &ORDER_SOURCES),
                staff_member: "Elise",
                notes: self.sometimes(0.2, Self::sentence),
                total,
            });
        }
        (orders, lines, payments)
    }

    fn posts(&mut self) -> (Vec<PostRow>, Vec<MetricRow>, Vec<FeatureRow>) {
        let mut posts = Vec::with_capacity(self.config.posts);
        let mut metrics = Vec::with_capacity(self.config.posts);
        let mut features = Vec::new();

        for i in 0..self.config.posts {
            let post_id = id(i);
            let account_id = weighted(&mut self.rng, &POST_ACCOUNTS);
            let posted_date = self.timestamp();
            let hashtags = sample(&mut self.rng, &HASHTAGS, 3, 8);
            let caption = format!("{} {}", pick(&mut self.rng, &CAPTIONS), hashtags.join(" "));
            let slug: String = (0..8)
                .map(|_| char::from_digit(self.rng.gen_range(0..16), 16).unwrap_or('0'))
                .collect();

            posts.push(PostRow {
                post_id,
                account_id,
                platform_post_id: format!("post_{account_id}_{:03}", i + 1),
                post_type: weighted(&mut self.rng, &POST_TYPES),
                caption,
                post_url: format!("https://instagram.com/p/{slug}"),
                posted_date,
                hashtags: list_literal(&hashtags),
                mentions: list_literal::<&str>(&[]),
                is_promotional: self.rng.gen_bool(0.5),
            });

            let impressions: i32 = self.rng.gen_range(100..=2000);
            let reach = scaled(impressions, self.rng.gen_range(0.7..0.95));
            let likes = scaled(reach, self.rng.gen_range(0.02..0.15));
            let comments = scaled(likes, self.rng.gen_range(0.02..0.1));
            let saves = scaled(likes, self.rng.gen_range(0.1..0.3));
            let shares = scaled(likes, self.rng.gen_range(0.01..0.05));
            let engaged = Decimal::from(likes + comments + saves + shares);
            metrics.push(MetricRow {
                metric_id: post_id,
                post_id,
                metric_date: posted_date.date(),
                impressions,
                reach,
                likes,
                comments,
                shares,
                saves,
                clicks: self.rng.gen_range(5..=50),
                engagement_rate: format_decimal(engaged / Decimal::from(reach.max(1)), 4),
            });

            let featured = self.rng.gen_range(1..=3).min(self.config.items);
            for (j, item) in index::sample(&mut self.rng, self.config.items, featured)
                .into_iter()
                .enumerate()
            {
                features.push(FeatureRow {
                    feature_id: id(features.len()),
                    post_id,
                    item_id: id(item),
                    is_primary_item: j == 0,
                });
            }
        }
        (posts, metrics, features)
    }

    /// Market days at physical locations; sales come from that day's orders
    /// when there were any.
    fn market_performance(&mut self, orders: &[OrderRow], lines: &[OrderItemRow]) -> Vec<MarketRow> {
        let mut items_per_order: BTreeMap<RowId, i32> = BTreeMap::new();
        for line in lines {
            *items_per_order.entry(line.order_id).or_default() += line.quantity;
        }

        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for _ in 0..self.config.market_events {
            let location_id = id(self.rng.gen_range(0..self.config.locations - 1));
            let market_date = self.date();
            if !seen.insert((location_id, market_date)) {
                continue;
            }

            let day_orders: Vec<&OrderRow> = orders
                .iter()
                .filter(|o| o.location_id == location_id && o.order_date.date() == market_date)
                .collect();
            let (total_sales, transactions, items_sold): (Decimal, i32, i32) = if day_orders.is_empty() {
                (
                    cents(&mut self.rng, 20_000, 150_000),
                    self.rng.gen_range(5..=25),
                    self.rng.gen_range(5..=30),
                )
            } else {
                (
                    day_orders.iter().map(|o| o.total).sum(),
                    i32::try_from(day_orders.len()).unwrap_or(i32::MAX),
                    day_orders
                        .iter()
                        .map(|o| items_per_order.get(&o.order_id).copied().unwrap_or(0))
                        .sum(),
                )
            };
            let booth_cost = cents(&mut self.rng, 5_000, 20_000);
            let travel = cents(&mut self.rng, 2_000, 8_000);

            rows.push(MarketRow {
                performance_id: id(rows.len()),
                location_id,
                market_date,
                total_sales: money(total_sales),
                total_transactions: transactions,
                items_sold,
                average_transaction_value: money(round_to_scale(
                    total_sales / Decimal::from(transactions.max(1)),
                    2,
                )),
                foot_traffic_estimate: self.rng.gen_range(50..=300),
                weather: pick(&mut self.rng, &WEATHER),
                competitor_count: self.rng.gen_range(2..=12),
                booth_cost: money(booth_cost),
                travel_expenses: money(travel),
                net_profit: money(total_sales - booth_cost - travel),
                customer_acquisition_count: self.rng.gen_range(0..=8),
                notes: self.sometimes(0.3, Self::sentence),
            });
        }
        rows
    }
}

/// `value * factor`, truncated like a count.
fn scaled(value: i32, factor: f64) -> i32 {
    (f64::from(value) * factor) as i32
}
