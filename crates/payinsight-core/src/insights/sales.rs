//! Sales performance: completed sales and success rate over the trailing week

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::db::{daily_sales_sql, SalesBucket};
use crate::error::Result;
use crate::import::STORED_DATETIME_FORMAT;
use crate::models::{InsightResult, PaymentMethod};

use super::chart::{daily_sales_line, empty_chart};
use super::engine::AnalysisContext;
use super::format::{format_amount, title_case};

/// Sales are always reported over this many trailing days
pub const SALES_WINDOW_DAYS: i64 = 7;

/// Start of the sales window: local midnight seven days before `now`
pub fn window_start(now: NaiveDateTime) -> NaiveDateTime {
    (now.date() - Duration::days(SALES_WINDOW_DAYS)).and_time(chrono::NaiveTime::MIN)
}

/// `completed / (completed + failed)` as a percentage, or `None` when the
/// period has neither
pub fn success_rate(buckets: &[SalesBucket]) -> Option<f64> {
    let completed: i64 = buckets.iter().map(|b| b.successful_transactions).sum();
    let failed: i64 = buckets.iter().map(|b| b.failed_transactions).sum();
    let attempted = completed + failed;
    if attempted == 0 {
        None
    } else {
        Some(completed as f64 / attempted as f64 * 100.0)
    }
}

fn method_label(method: Option<PaymentMethod>) -> &'static str {
    method.map(|m| m.as_str()).unwrap_or("ALL")
}

fn method_text(method: Option<PaymentMethod>) -> String {
    match method {
        Some(m) => format!("for {}", m.as_str()),
        None => "across all payment methods".to_string(),
    }
}

/// No-data sentence for a method filter
pub fn no_sales_text(method: Option<PaymentMethod>) -> String {
    format!(
        "No sales data found for {} in the last {} days.",
        method_label(method),
        SALES_WINDOW_DAYS
    )
}

/// Summarize sales for the trailing week, optionally for one method
pub fn analyze(ctx: &AnalysisContext<'_>, method: Option<PaymentMethod>) -> Result<InsightResult> {
    let start = window_start(ctx.now)
        .format(STORED_DATETIME_FORMAT)
        .to_string();
    debug!(%start, method = method_label(method), "Running daily sales");

    let sql = daily_sales_sql(method);
    let buckets = ctx.db.daily_sales(&start, method)?;

    if buckets.is_empty() {
        return Ok(InsightResult {
            insight_text: no_sales_text(method),
            chart_spec: empty_chart(),
            query_used: sql.to_string(),
        });
    }

    let method_text = method_text(method);
    let figure = daily_sales_line(
        &buckets,
        &format!("Daily Sales Performance ({})", title_case(&method_text)),
    );

    Ok(InsightResult {
        insight_text: summarize(&buckets, &method_text),
        chart_spec: serde_json::to_value(&figure)?,
        query_used: sql.to_string(),
    })
}

fn summarize(buckets: &[SalesBucket], method_text: &str) -> String {
    let total_sales: f64 = buckets.iter().map(|b| b.total_sales).sum();

    let rate_sentence = match success_rate(buckets) {
        Some(rate) => format!("Your transaction success rate was {:.2}%.", rate),
        None => "Your transaction success rate is unavailable for this period.".to_string(),
    };

    format!(
        "In the last {} days, you've had total sales of ₹{} {}. {}",
        SALES_WINDOW_DAYS,
        format_amount(total_sales),
        method_text,
        rate_sentence
    )
}
