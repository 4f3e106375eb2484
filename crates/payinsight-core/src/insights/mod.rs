//! Insight Engine - answers merchant questions from the settlement store
//!
//! A question is routed by keyword rules onto one of two analyses:
//!
//! - **Refunds** - refund count, amount and top reasons for yesterday or the last week
//! - **Sales** - completed sales and success rate for the trailing week, optionally per payment method
//!
//! Anything else gets a canned fallback. Every answer carries a sentence, a
//! Plotly-compatible chart spec, and the SQL that produced it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use payinsight_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new(db);
//! let result = engine.answer("refunds this week")?;
//! println!("{}", result.insight_text);
//! ```

pub mod chart;
pub mod engine;
pub mod format;
pub mod refunds;
pub mod router;
pub mod sales;

pub use engine::{fallback, AnalysisContext, InsightEngine, FALLBACK_TEXT, NO_QUERY};
pub use router::{route, IntentKind, RefundWindow, Route, Rule};
