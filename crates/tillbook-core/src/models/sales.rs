//! Daily sales entries and the cash-balance baseline they reconcile against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::amount::{deserialize_amount, deserialize_figure};

/// One staff-day of takings, as written to the sales sheet.
///
/// `date` is the unique key per staff-day. Every monetary field defaults to
/// zero when absent or unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesEntry {
    pub date: NaiveDate,
    pub staff_name: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub cash_sale: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub bank_sale: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub cash_in_hand: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub cash_in_bank: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub cash_withdrawal: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub swiggy: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub zomato: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub swiggy_payout: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub zomato_payout: f64,
}

impl SalesEntry {
    /// An entry with every amount at zero.
    pub fn empty(date: NaiveDate, staff_name: &str) -> Self {
        Self {
            date,
            staff_name: staff_name.to_string(),
            cash_sale: 0.0,
            bank_sale: 0.0,
            cash_in_hand: 0.0,
            cash_in_bank: 0.0,
            cash_withdrawal: 0.0,
            swiggy: 0.0,
            zomato: 0.0,
            swiggy_payout: 0.0,
            zomato_payout: 0.0,
        }
    }
}

/// Server-derived cash position for a date.
///
/// A zeroed snapshot means "no prior data", which is also what a failed
/// fetch degrades to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashBalanceSnapshot {
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub yesterday_closing: f64,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub today_cash_expense: f64,
    #[serde(default, deserialize_with = "deserialize_figure")]
    pub cash_withdrawal: f64,
}

impl CashBalanceSnapshot {
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn is_zeroed(&self) -> bool {
        *self == Self::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_entry_tolerates_bad_fields() {
        let json = r#"{
            "date": "2026-03-14",
            "staffName": "Ravi",
            "cashSale": "500",
            "bankSale": "abc",
            "swiggy": 120.5,
            "zomatoPayout": null
        }"#;
        let entry: SalesEntry = serde_json::from_str(json).expect("entry should parse");
        assert_eq!(entry.cash_sale, 500.0);
        assert_eq!(entry.bank_sale, 0.0);
        assert_eq!(entry.swiggy, 120.5);
        assert_eq!(entry.zomato_payout, 0.0);
        assert_eq!(entry.cash_in_hand, 0.0);
    }

    #[test]
    fn test_sales_entry_wire_names() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date");
        let json = serde_json::to_value(SalesEntry::empty(date, "Ravi")).expect("serialize");
        let keys: Vec<_> = json.as_object().expect("object").keys().cloned().collect();
        for key in [
            "date", "staffName", "cashSale", "bankSale", "cashInHand", "cashInBank",
            "cashWithdrawal", "swiggy", "zomato", "swiggyPayout", "zomatoPayout",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing {}", key);
        }
    }

    #[test]
    fn test_snapshot_partial_payload() {
        let snapshot: CashBalanceSnapshot =
            serde_json::from_str(r#"{"yesterdayClosing": 1000, "todayCashExpense": "200"}"#)
                .expect("snapshot should parse");
        assert_eq!(snapshot.yesterday_closing, 1000.0);
        assert_eq!(snapshot.today_cash_expense, 200.0);
        assert_eq!(snapshot.cash_withdrawal, 0.0);
        assert!(!snapshot.is_zeroed());
        assert!(CashBalanceSnapshot::zeroed().is_zeroed());
    }
}
