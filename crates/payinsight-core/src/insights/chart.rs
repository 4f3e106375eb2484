//! Declarative chart specs
//!
//! Charts are emitted as Plotly-compatible figure documents
//! (`{"data": [...], "layout": {...}}`) so any Plotly front end can render
//! them directly. Nothing here draws anything.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::{RefundBucket, SalesBucket};

use super::refunds::reason_label;

const TEMPLATE: &str = "plotly_white";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Text,
    pub template: &'static str,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: Text,
}

fn text(s: impl Into<String>) -> Text {
    Text { text: s.into() }
}

/// Chart returned when there is nothing to plot
pub fn empty_chart() -> Value {
    Value::Object(Map::new())
}

/// Bar chart of refund counts per day, one trace per reason
pub fn refunds_by_reason(buckets: &[RefundBucket], title: &str) -> Figure {
    let mut traces: Vec<Trace> = Vec::new();

    for bucket in buckets {
        let reason = reason_label(bucket.reason.as_deref());
        let idx = match traces
            .iter()
            .position(|t| t.name.as_deref() == Some(reason))
        {
            Some(idx) => idx,
            None => {
                traces.push(Trace {
                    kind: "bar",
                    mode: None,
                    name: Some(reason.to_string()),
                    x: Vec::new(),
                    y: Vec::new(),
                });
                traces.len() - 1
            }
        };
        traces[idx].x.push(bucket.refund_date.clone());
        traces[idx].y.push(bucket.number_of_refunds as f64);
    }

    Figure {
        data: traces,
        layout: Layout {
            title: text(title),
            template: TEMPLATE,
            xaxis: Axis { title: text("Date") },
            yaxis: Axis {
                title: text("Number of Refunds"),
            },
            legend: Some(Legend {
                title: text("Reason"),
            }),
            barmode: Some("relative"),
            bargap: Some(0.2),
        },
    }
}

/// Line chart of completed sales per day
pub fn daily_sales_line(buckets: &[SalesBucket], title: &str) -> Figure {
    Figure {
        data: vec![Trace {
            kind: "scatter",
            mode: Some("lines+markers"),
            name: None,
            x: buckets.iter().map(|b| b.transaction_date.clone()).collect(),
            y: buckets.iter().map(|b| b.total_sales).collect(),
        }],
        layout: Layout {
            title: text(title),
            template: TEMPLATE,
            xaxis: Axis { title: text("Date") },
            yaxis: Axis {
                title: text("Total Sales (INR)"),
            },
            legend: None,
            barmode: None,
            bargap: None,
        },
    }
}
