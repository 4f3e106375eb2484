//! Keyword rule tables that map a question onto an analysis
//!
//! Each decision is an ordered list of [`Rule`]s evaluated against the
//! lower-cased question; the first rule whose predicate matches wins. Adding
//! an intent or modifier means adding a row, not another nested branch.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::models::PaymentMethod;

/// A predicate paired with the outcome it selects
pub struct Rule<T> {
    /// Short label used in logs
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub outcome: T,
}

/// Outcome of the first matching rule, if any
pub fn first_match<T: Copy>(rules: &[Rule<T>], text: &str) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find(|rule| (rule.matches)(text))
        .map(|rule| (rule.name, rule.outcome))
}

/// Which analysis a question is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Refunds,
    Sales,
}

/// Time window for refund analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundWindow {
    /// Previous calendar day, midnight to midnight
    Yesterday,
    /// Seven days ending now
    LastSevenDays,
}

/// Fully resolved routing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Route {
    Refunds { window: RefundWindow },
    /// Always the trailing seven days; `None` means every payment method
    Sales { method: Option<PaymentMethod> },
    Unknown,
}

pub const INTENT_RULES: &[Rule<IntentKind>] = &[
    Rule {
        name: "refund",
        matches: |q| q.contains("refund"),
        outcome: IntentKind::Refunds,
    },
    Rule {
        name: "sales",
        matches: |q| q.contains("sale") || q.contains("perform"),
        outcome: IntentKind::Sales,
    },
];

pub const REFUND_WINDOW_RULES: &[Rule<RefundWindow>] = &[Rule {
    name: "week",
    matches: |q| q.contains("week") || q.contains("7 days"),
    outcome: RefundWindow::LastSevenDays,
}];

pub const PAYMENT_METHOD_RULES: &[Rule<PaymentMethod>] = &[
    Rule {
        name: "upi",
        matches: |q| upi_word().is_match(q),
        outcome: PaymentMethod::Upi,
    },
    Rule {
        name: "card",
        matches: |q| card_word().is_match(q),
        outcome: PaymentMethod::Card,
    },
];

fn upi_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bupi\b").expect("valid regex"))
}

fn card_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcard\b").expect("valid regex"))
}

/// Resolve a free-text question into a [`Route`]
pub fn route(question: &str) -> Route {
    let q = question.to_lowercase();

    let Some((intent, kind)) = first_match(INTENT_RULES, &q) else {
        debug!("No intent rule matched");
        return Route::Unknown;
    };

    match kind {
        IntentKind::Refunds => {
            let matched = first_match(REFUND_WINDOW_RULES, &q);
            debug!(
                rule = intent,
                window = matched.map_or("default", |(name, _)| name),
                "Routed question"
            );
            Route::Refunds {
                window: matched.map_or(RefundWindow::Yesterday, |(_, w)| w),
            }
        }
        IntentKind::Sales => {
            let matched = first_match(PAYMENT_METHOD_RULES, &q);
            debug!(
                rule = intent,
                method = matched.map_or("any", |(name, _)| name),
                "Routed question"
            );
            Route::Sales {
                method: matched.map(|(_, m)| m),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refunds_default_to_yesterday() {
        assert_eq!(
            route("refunds yesterday"),
            Route::Refunds {
                window: RefundWindow::Yesterday
            }
        );
        assert_eq!(
            route("How many REFUNDS did we get?"),
            Route::Refunds {
                window: RefundWindow::Yesterday
            }
        );
    }

    #[test]
    fn test_refunds_week_keywords() {
        for q in ["refunds this week", "refunds in the last 7 days", "Weekly refund report"] {
            assert_eq!(
                route(q),
                Route::Refunds {
                    window: RefundWindow::LastSevenDays
                },
                "question: {}",
                q
            );
        }
    }

    #[test]
    fn test_refund_wins_over_sales() {
        assert!(matches!(
            route("refunds vs sales"),
            Route::Refunds { .. }
        ));
    }

    #[test]
    fn test_sales_method_filters() {
        assert_eq!(
            route("sales performance upi this week"),
            Route::Sales {
                method: Some(PaymentMethod::Upi)
            }
        );
        assert_eq!(
            route("Card sales"),
            Route::Sales {
                method: Some(PaymentMethod::Card)
            }
        );
        assert_eq!(route("how are sales?"), Route::Sales { method: None });
        assert_eq!(route("performance overview"), Route::Sales { method: None });
    }

    #[test]
    fn test_method_needs_whole_word() {
        // "upix" and "cards" are not the standalone words
        assert_eq!(route("sales via upix"), Route::Sales { method: None });
        assert_eq!(route("sales on cards"), Route::Sales { method: None });
        assert_eq!(
            route("sales (upi) today"),
            Route::Sales {
                method: Some(PaymentMethod::Upi)
            }
        );
    }

    #[test]
    fn test_upi_checked_before_card() {
        assert_eq!(
            route("sales upi and card"),
            Route::Sales {
                method: Some(PaymentMethod::Upi)
            }
        );
    }

    #[test]
    fn test_unknown_intent() {
        assert_eq!(route("what is the weather"), Route::Unknown);
        assert_eq!(route(""), Route::Unknown);
    }

    #[test]
    fn test_first_match_reports_rule_name() {
        assert_eq!(
            first_match(INTENT_RULES, "sale"),
            Some(("sales", IntentKind::Sales))
        );
        assert_eq!(first_match(REFUND_WINDOW_RULES, "today"), None);
    }
}
