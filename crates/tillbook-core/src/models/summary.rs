//! Read-side payloads: monthly summary figures and raw sheet listings.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::amount::deserialize_figure;

/// Month totals computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub total_sales: f64,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub total_expenses: f64,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub profit: f64,
    /// Expenses as a percentage of sales.
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub expense_ratio: f64,
    /// Profit as a percentage of sales.
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub profit_margin: f64,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub cash_sales: f64,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub bank_sales: f64,
}

impl MonthlySummary {
    pub fn is_profitable(&self) -> bool {
        self.profit >= 0.0
    }
}

/// Which sheet an entries listing is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Sales,
    Expenses,
}

impl SheetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Sales => "sales",
            SheetKind::Expenses => "expenses",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A sheet listing: header row plus data rows, cells left as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntriesTable {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl EntriesTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_accepts_string_ratios() {
        let json = r#"{
            "totalSales": 150000,
            "totalExpenses": 90000,
            "profit": -1200.5,
            "expenseRatio": "60.0",
            "profitMargin": "40.0"
        }"#;
        let summary: MonthlySummary = serde_json::from_str(json).expect("summary should parse");
        assert_eq!(summary.total_sales, 150000.0);
        assert_eq!(summary.expense_ratio, 60.0);
        assert_eq!(summary.profit, -1200.5);
        assert!(!summary.is_profitable());
        assert_eq!(summary.cash_sales, 0.0);
    }

    #[test]
    fn test_sheet_kind_wire_names() {
        assert_eq!(SheetKind::Sales.as_str(), "sales");
        assert_eq!(SheetKind::Expenses.to_string(), "expenses");
    }
}
