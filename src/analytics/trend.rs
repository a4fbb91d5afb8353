use crate::analytics::MonthlyTotals;
use crate::model::Month;
use serde::Serialize;

/// One point of a monthly trend: a month and its totals.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthSummary {
    month: Month,
    label: String,
    #[serde(flatten)]
    totals: MonthlyTotals,
}

impl MonthSummary {
    pub fn new(month: Month, totals: MonthlyTotals) -> Self {
        Self {
            month,
            label: month.label(),
            totals,
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn totals(&self) -> &MonthlyTotals {
        &self.totals
    }
}

#[test]
fn test_month_summary_serializes_flat() {
    use crate::analytics::fixtures::example;
    let summary = MonthSummary::new(
        Month::new(2025, 10).unwrap(),
        MonthlyTotals::compute(&example()),
    );
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["month"], "2025-10");
    assert_eq!(json["label"], "Oct 2025");
    assert_eq!(json["balance"], "$25.00");
}
