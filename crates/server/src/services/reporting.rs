//! The reporting engine.
//!
//! Produces the admin dashboard for a target month: the month's aggregate,
//! the previous month's sales, a growth rate, a six-month trend series, the
//! all-time product ranking, and global counters.
//!
//! Month bucketing compares stored timestamps against half-open
//! `[month start, next month start)` ranges as plain strings. Stored
//! timestamps are written zero-padded by the application, so the string
//! comparison is chronological on either storage engine without
//! backend-specific date functions.

use serde::Serialize;

use oroshi_core::MonthKey;

use crate::db::{Database, RepositoryError};
use crate::params;

/// Dashboard payload for one target month.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    #[serde(rename = "targetMonth")]
    pub target_month: String,
    pub summary: Summary,
    #[serde(rename = "salesTrend")]
    pub sales_trend: Vec<TrendPoint>,
    #[serde(rename = "productRanking")]
    pub product_ranking: Vec<RankingEntry>,
}

/// Headline numbers for the target month.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub current_month_sales: i64,
    pub last_month_sales: i64,
    /// Percent versus the previous month, one decimal place.
    pub growth_rate: f64,
    pub current_month_orders: i64,
    pub current_month_quantity: i64,
    pub total_orders: i64,
    pub active_products: i64,
}

/// One month of the trend series.
#[derive(Debug, Serialize)]
pub struct TrendPoint {
    /// `YYYY-MM` label.
    pub month: String,
    pub sales: i64,
}

/// One product of the all-time sales ranking.
#[derive(Debug, Serialize)]
pub struct RankingEntry {
    pub name: String,
    pub total_quantity: i64,
    pub total_sales: i64,
}

/// Number of months in the trend series, target month included.
const TREND_MONTHS: usize = 6;

/// Number of products in the ranking.
const RANKING_LIMIT: i64 = 5;

struct MonthAggregate {
    order_count: i64,
    sales: i64,
    total_quantity: i64,
}

/// The reporting engine.
pub struct ReportingService<'a> {
    db: &'a Database,
}

impl<'a> ReportingService<'a> {
    /// Create a new reporting service.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Build the dashboard for a target month.
    ///
    /// # Errors
    ///
    /// Any query failure aborts the whole report; there are no partial
    /// results.
    pub async fn dashboard(&self, target: MonthKey) -> Result<Dashboard, RepositoryError> {
        let current = self.month_aggregate(target).await?;
        let last_month_sales = self.month_sales(target.prev()).await?;
        let growth_rate = growth_rate(current.sales, last_month_sales);

        let mut sales_trend = Vec::with_capacity(TREND_MONTHS);
        for month in target.trailing(TREND_MONTHS) {
            sales_trend.push(TrendPoint {
                month: month.label(),
                sales: self.month_sales(month).await?,
            });
        }

        let product_ranking = self.product_ranking().await?;

        let totals = self
            .db
            .fetch_optional(
                "SELECT \
                 (SELECT COUNT(*) FROM orders) AS total_orders, \
                 (SELECT COUNT(*) FROM products WHERE is_active = 1) AS active_products",
                &[],
            )
            .await?;
        let (total_orders, active_products) = match totals {
            Some(row) => (row.i64("total_orders")?, row.i64("active_products")?),
            None => (0, 0),
        };

        Ok(Dashboard {
            target_month: target.label(),
            summary: Summary {
                current_month_sales: current.sales,
                last_month_sales,
                growth_rate,
                current_month_orders: current.order_count,
                current_month_quantity: current.total_quantity,
                total_orders,
                active_products,
            },
            sales_trend,
            product_ranking,
        })
    }

    async fn month_aggregate(&self, month: MonthKey) -> Result<MonthAggregate, RepositoryError> {
        let (start, end) = month.range();
        let row = self
            .db
            .fetch_optional(
                "SELECT COUNT(*) AS order_count, \
                 COALESCE(SUM(total_price), 0) AS sales, \
                 COALESCE(SUM(quantity), 0) AS total_quantity \
                 FROM orders WHERE created_at >= ? AND created_at < ?",
                &params![start, end],
            )
            .await?;
        match row {
            Some(row) => Ok(MonthAggregate {
                order_count: row.i64("order_count")?,
                sales: row.i64("sales")?,
                total_quantity: row.i64("total_quantity")?,
            }),
            None => Ok(MonthAggregate {
                order_count: 0,
                sales: 0,
                total_quantity: 0,
            }),
        }
    }

    async fn month_sales(&self, month: MonthKey) -> Result<i64, RepositoryError> {
        let (start, end) = month.range();
        let row = self
            .db
            .fetch_optional(
                "SELECT COALESCE(SUM(total_price), 0) AS sales \
                 FROM orders WHERE created_at >= ? AND created_at < ?",
                &params![start, end],
            )
            .await?;
        row.map_or(Ok(0), |row| row.i64("sales"))
    }

    async fn product_ranking(&self) -> Result<Vec<RankingEntry>, RepositoryError> {
        let rows = self
            .db
            .fetch_all(
                "SELECT p.name AS name, \
                 SUM(o.quantity) AS total_quantity, \
                 SUM(o.total_price) AS total_sales \
                 FROM orders o \
                 JOIN products p ON o.product_id = p.id \
                 GROUP BY p.id, p.name \
                 ORDER BY total_sales DESC \
                 LIMIT ?",
                &params![RANKING_LIMIT],
            )
            .await?;
        rows.iter()
            .map(|row| {
                Ok(RankingEntry {
                    name: row.text("name")?,
                    total_quantity: row.i64("total_quantity")?,
                    total_sales: row.i64("total_sales")?,
                })
            })
            .collect()
    }
}

/// Growth rate versus the previous month, in percent, one decimal place.
///
/// A zero baseline is defined as 100 when the current month has sales and
/// 0 otherwise, instead of dividing by zero.
#[must_use]
pub fn growth_rate(current_sales: i64, last_sales: i64) -> f64 {
    if last_sales > 0 {
        #[allow(clippy::cast_precision_loss)]
        let rate = (current_sales - last_sales) as f64 / last_sales as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    } else if current_sales > 0 {
        100.0
    } else {
        0.0
    }
}
