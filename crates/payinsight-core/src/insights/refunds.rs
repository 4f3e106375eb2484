//! Refund analysis: refund volume and reasons over a short window

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::db::{RefundBucket, REFUND_BREAKDOWN_SQL};
use crate::error::Result;
use crate::import::STORED_DATETIME_FORMAT;
use crate::models::InsightResult;

use super::chart::{empty_chart, refunds_by_reason};
use super::engine::AnalysisContext;
use super::format::{format_amount, title_case};
use super::router::RefundWindow;

pub const NO_REFUNDS_TEXT: &str = "No refund data found for the specified period.";

/// How many distinct reasons the summary names
const TOP_REASONS: usize = 3;

/// Label for refunds without a recorded reason
pub fn reason_label(reason: Option<&str>) -> &str {
    reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(crate::derive::UNSPECIFIED_REASON)
}

impl RefundWindow {
    /// `[start, end)` bounds relative to `now`
    pub fn bounds(&self, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        match self {
            Self::Yesterday => {
                let midnight = now.date().and_time(chrono::NaiveTime::MIN);
                (midnight - Duration::days(1), midnight)
            }
            Self::LastSevenDays => (now - Duration::days(7), now),
        }
    }

    /// Phrase used in the summary sentence
    pub fn period_text(&self) -> &'static str {
        match self {
            Self::Yesterday => "yesterday",
            Self::LastSevenDays => "in the last 7 days",
        }
    }
}

/// Summarize refunds for `window`
pub fn analyze(ctx: &AnalysisContext<'_>, window: RefundWindow) -> Result<InsightResult> {
    let (start, end) = window.bounds(ctx.now);
    let start = start.format(STORED_DATETIME_FORMAT).to_string();
    let end = end.format(STORED_DATETIME_FORMAT).to_string();
    debug!(%start, %end, "Running refund breakdown");

    let buckets = ctx.db.refund_breakdown(&start, &end)?;

    if buckets.is_empty() {
        return Ok(InsightResult {
            insight_text: NO_REFUNDS_TEXT.to_string(),
            chart_spec: empty_chart(),
            query_used: REFUND_BREAKDOWN_SQL.to_string(),
        });
    }

    let period = window.period_text();
    let figure = refunds_by_reason(
        &buckets,
        &format!("Refunds by Reason ({})", title_case(period)),
    );

    Ok(InsightResult {
        insight_text: summarize(&buckets, period),
        chart_spec: serde_json::to_value(&figure)?,
        query_used: REFUND_BREAKDOWN_SQL.to_string(),
    })
}

fn summarize(buckets: &[RefundBucket], period: &str) -> String {
    let total_refunds: i64 = buckets.iter().map(|b| b.number_of_refunds).sum();
    let total_amount: f64 = buckets.iter().map(|b| b.total_refund_amount).sum();

    let mut reasons: Vec<&str> = Vec::new();
    for bucket in buckets {
        let reason = reason_label(bucket.reason.as_deref());
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }
    reasons.truncate(TOP_REASONS);

    format!(
        "Found {} refunds totaling ₹{} {}. The primary reasons for refunds were: {}.",
        total_refunds,
        format_amount(total_amount),
        period,
        reasons.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_yesterday_bounds_are_calendar_day() {
        let (start, end) = RefundWindow::Yesterday.bounds(at(2025, 3, 1, 14, 30));
        assert_eq!(start, at(2025, 2, 28, 0, 0));
        assert_eq!(end, at(2025, 3, 1, 0, 0));
    }

    #[test]
    fn test_week_bounds_end_now() {
        let now = at(2025, 3, 10, 9, 15);
        let (start, end) = RefundWindow::LastSevenDays.bounds(now);
        assert_eq!(start, at(2025, 3, 3, 9, 15));
        assert_eq!(end, now);
    }

    #[test]
    fn test_summary_names_first_three_reasons() {
        let bucket = |date: &str, reason: Option<&str>, n: i64, amt: f64| RefundBucket {
            refund_date: date.to_string(),
            reason: reason.map(str::to_string),
            number_of_refunds: n,
            total_refund_amount: amt,
        };
        let buckets = vec![
            bucket("2025-01-14", Some("Damaged"), 4, 1000.0),
            bucket("2025-01-14", Some("Late"), 2, 234.5),
            bucket("2025-01-15", Some("Damaged"), 1, 10.0),
            bucket("2025-01-15", None, 1, 5.0),
            bucket("2025-01-15", Some("Wrong size"), 1, 5.0),
        ];

        assert_eq!(
            summarize(&buckets, "in the last 7 days"),
            "Found 9 refunds totaling ₹1,254.50 in the last 7 days. \
             The primary reasons for refunds were: Damaged, Late, Unspecified."
        );
    }

    #[test]
    fn test_reason_label() {
        assert_eq!(reason_label(Some("Late")), "Late");
        assert_eq!(reason_label(Some("  ")), "Unspecified");
        assert_eq!(reason_label(None), "Unspecified");
    }
}
