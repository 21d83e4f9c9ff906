//! `closet-sync load` and `closet-sync check`.

use chrono::Local;

use super::output::{highlight, Output};
use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::{SqliteReport, SqliteTableSink};
use crate::application::loader::{DataLoader, LoadSummary, TableStatus};
use crate::domain::report::{Insights, IntegrityCheck};
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap::open_warehouse;
use crate::infrastructure::config::settings::Settings;
use crate::port::outbound::report::WarehouseReport;

use super::command::LoadArgs;

fn report(pool: &DbPool) -> Result<SqliteReport> {
    let conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
    Ok(SqliteReport::new(conn))
}

/// Load every fixture table, then run the integrity checks and, on request,
/// the insights. Both only run after a fully successful load.
pub fn execute(settings: &Settings, args: &LoadArgs, out: &Output) -> Result<bool> {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| settings.sync.data_dir.clone());
    let pool = open_warehouse(&settings.database)?;
    let conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;

    out.section("Load");
    out.field("Data directory", data_dir.display());
    let summary = DataLoader::new(SqliteTableSink::new(conn), &data_dir).load_all();
    render_summary(&summary, out);

    if !summary.is_success() {
        out.warning("Skipping integrity checks until every table loads");
        return Ok(false);
    }

    let mut report = report(&pool)?;
    render_checks(&report.integrity_checks()?, out);

    if args.insights {
        let insights = report.insights(Local::now().date_naive())?;
        render_insights(&insights, out);
    }
    Ok(true)
}

/// Integrity checks against an already-loaded warehouse.
pub fn check(settings: &Settings, out: &Output) -> Result<bool> {
    let pool = open_warehouse(&settings.database)?;
    render_checks(&report(&pool)?.integrity_checks()?, out);
    Ok(true)
}

fn render_summary(summary: &LoadSummary, out: &Output) {
    for outcome in &summary.outcomes {
        match &outcome.status {
            TableStatus::Loaded { rows_read, inserted } => {
                let skipped = outcome.skipped();
                let message = if skipped > 0 {
                    format!(
                        "{}: {inserted} of {rows_read} rows inserted, {skipped} already present",
                        outcome.table
                    )
                } else {
                    format!("{}: {inserted} rows inserted", outcome.table)
                };
                out.success(&message);
            }
            TableStatus::MissingFile { path } => {
                out.warning(&format!("{}: {} not found, skipped", outcome.table, path.display()));
            }
            TableStatus::Failed { reason } => {
                out.error(&format!("{}: {reason}", outcome.table));
            }
        }
    }
    out.data("load", summary);
    out.status(
        summary.is_success(),
        &format!(
            "Loaded {}/{} tables",
            summary.succeeded(),
            summary.attempted()
        ),
    );
}

fn render_checks(checks: &[IntegrityCheck], out: &Output) {
    out.section("Integrity");
    for check in checks {
        out.field(check.name, check.count);
    }
    out.data("integrity", &checks);
}

fn render_insights(insights: &Insights, out: &Output) {
    out.section("Insights");
    out.field("Total revenue", format!("${}", insights.total_revenue));
    out.field("Average order value", format!("${}", insights.average_order_value));
    if let Some(customer) = &insights.top_customer {
        out.field(
            "Top customer",
            format!("{} (${})", highlight(out, customer.display_name()), customer.total_spent),
        );
    }
    if let Some(category) = &insights.popular_category {
        out.field(
            "Most popular category",
            format!("{} ({} sold)", category.category, category.items_sold),
        );
    }
    if let Some(location) = &insights.best_location {
        out.field(
            "Best location",
            format!("{} (${} avg profit)", location.location_name, location.average_net_profit),
        );
    }
    let social = &insights.social_engagement;
    out.field(
        "Social engagement",
        format!(
            "{} posts, {} avg likes, {} avg rate",
            social.posts, social.average_likes, social.average_engagement_rate
        ),
    );
    for source in &insights.acquisition_sources {
        out.field(&format!("Acquired via {}", source.source), source.customers);
    }
    for month in &insights.monthly_sales {
        out.field(
            &format!("Sales {}", month.month),
            format!("{} orders, ${}", month.orders, month.revenue),
        );
    }
    out.data("insights", insights);
}
