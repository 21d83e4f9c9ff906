//! Read-side reporting port.

use chrono::NaiveDate;

use crate::domain::report::{Insights, IntegrityCheck};
use crate::error::Result;

/// Read-only queries over a loaded warehouse.
pub trait WarehouseReport {
    /// Row-count checks confirming a load landed with its references intact.
    fn integrity_checks(&mut self) -> Result<Vec<IntegrityCheck>>;

    /// Business insights; the monthly trend covers six months before `today`.
    fn insights(&mut self, today: NaiveDate) -> Result<Insights>;
}
