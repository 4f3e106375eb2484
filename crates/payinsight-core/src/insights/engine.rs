//! Insight Engine - routes a question to an analysis and runs it

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::db::Database;
use crate::models::InsightResult;
use crate::Result;

use super::chart::empty_chart;
use super::router::{route, Route};
use super::{refunds, sales};

/// Returned for any question no rule recognizes
pub const FALLBACK_TEXT: &str = "Sorry, I can't answer that question yet. Try asking about 'refunds yesterday' or 'sales performance this week'.";

/// `query_used` when no query ran
pub const NO_QUERY: &str = "N/A";

/// Context provided to analyses
pub struct AnalysisContext<'a> {
    /// Database holding the derived query tables
    pub db: &'a Database,
    /// Local wall-clock time every window is relative to
    pub now: NaiveDateTime,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(db: &'a Database, now: NaiveDateTime) -> Self {
        Self { db, now }
    }

    /// Context anchored at the current local time
    pub fn current(db: &'a Database) -> Self {
        Self::new(db, Local::now().naive_local())
    }
}

/// Answers free-text questions against the store
#[derive(Clone)]
pub struct InsightEngine {
    db: Database,
}

impl InsightEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Answer relative to the current local time
    pub fn answer(&self, question: &str) -> Result<InsightResult> {
        self.run(question, &AnalysisContext::current(&self.db))
    }

    /// Answer as if the local time were `now`
    pub fn answer_at(&self, question: &str, now: NaiveDateTime) -> Result<InsightResult> {
        self.run(question, &AnalysisContext::new(&self.db, now))
    }

    fn run(&self, question: &str, ctx: &AnalysisContext<'_>) -> Result<InsightResult> {
        let route = route(question);
        debug!(?route, "Routed question");

        match route {
            Route::Refunds { window } => refunds::analyze(ctx, window),
            Route::Sales { method } => sales::analyze(ctx, method),
            Route::Unknown => Ok(fallback()),
        }
    }
}

/// Canned answer for unrecognized questions
pub fn fallback() -> InsightResult {
    InsightResult {
        insight_text: FALLBACK_TEXT.to_string(),
        chart_spec: empty_chart(),
        query_used: NO_QUERY.to_string(),
    }
}
