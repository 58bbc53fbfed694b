//! Daily cash reconciliation.
//!
//! Everything here is a pure function of the figures typed into the sales
//! form and the server's cash-balance snapshot for the day. Nothing is
//! stored; callers recompute on every input change.
//!
//! ```text
//! cash_bank_total        = cash_sale + bank_sale
//! total_with_platforms   = cash_bank_total + swiggy + zomato
//! net_sale               = total_with_platforms - swiggy_payout - zomato_payout
//! quick_expense_total    = oil + water_can + water_bottle + misc
//! total_cash_expense     = snapshot.today_cash_expense + quick_expense_total
//! projected_cash_balance = snapshot.yesterday_closing + cash_sale - total_cash_expense
//! cash_after_withdrawal  = cash_in_hand - cash_withdrawal
//! cash_check             = projected_cash_balance - cash_after_withdrawal
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{parse_amount, CashBalanceSnapshot, ExpenseCategory, ExpenseEntry, SalesEntry};

/// A cash check smaller than this in magnitude counts as reconciled.
pub const CASH_CHECK_TOLERANCE: f64 = 0.01;

/// Outcome of comparing the projected till balance with the counted cash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CashCheck {
    /// Counted cash matches the projection.
    Reconciled,
    /// The projection exceeds the counted cash by this much.
    Missing(f64),
    /// The counted cash exceeds the projection by this much.
    Surplus(f64),
}

impl CashCheck {
    pub fn classify(cash_check: f64) -> Self {
        if cash_check.abs() < CASH_CHECK_TOLERANCE {
            CashCheck::Reconciled
        } else if cash_check > 0.0 {
            CashCheck::Missing(cash_check)
        } else {
            CashCheck::Surplus(-cash_check)
        }
    }

    pub fn is_reconciled(&self) -> bool {
        matches!(self, CashCheck::Reconciled)
    }
}

impl fmt::Display for CashCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashCheck::Reconciled => f.write_str("No money missing"),
            CashCheck::Missing(amount) => write!(f, "Money missing: {:.2}", amount),
            CashCheck::Surplus(amount) => write!(f, "Extra cash: {:.2}", amount),
        }
    }
}

/// The quick cash expenses entered alongside the day's sales.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuickExpenses {
    pub oil: f64,
    pub water_can: f64,
    pub water_bottle: f64,
    pub misc: f64,
}

impl QuickExpenses {
    pub fn total(&self) -> f64 {
        self.oil + self.water_can + self.water_bottle + self.misc
    }

    /// One cash expense per positive field, in form order.
    pub fn entries(&self, date: NaiveDate, staff_name: &str) -> Vec<ExpenseEntry> {
        [
            (ExpenseCategory::Oil, self.oil),
            (ExpenseCategory::WaterCan, self.water_can),
            (ExpenseCategory::WaterBottle, self.water_bottle),
            (ExpenseCategory::Misc, self.misc),
        ]
        .into_iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(category, amount)| ExpenseEntry::cash(date, staff_name, category, amount))
        .collect()
    }
}

/// Raw text of the sales form, exactly as typed.
///
/// Unparseable fields count as zero; nothing here blocks submission.
#[derive(Debug, Clone, Default)]
pub struct SalesForm {
    pub cash_sale: String,
    pub bank_sale: String,
    pub cash_in_hand: String,
    pub cash_in_bank: String,
    pub cash_withdrawal: String,
    pub swiggy: String,
    pub zomato: String,
    pub swiggy_payout: String,
    pub zomato_payout: String,
    pub oil: String,
    pub water_can: String,
    pub water_bottle: String,
    pub misc: String,
}

impl SalesForm {
    /// Pre-fill the withdrawal field from the day's snapshot. A zero
    /// withdrawal leaves the field blank.
    pub fn apply_snapshot(&mut self, snapshot: &CashBalanceSnapshot) {
        self.cash_withdrawal = if snapshot.cash_withdrawal != 0.0 {
            snapshot.cash_withdrawal.to_string()
        } else {
            String::new()
        };
    }

    pub fn entry(&self, date: NaiveDate, staff_name: &str) -> SalesEntry {
        SalesEntry {
            date,
            staff_name: staff_name.to_string(),
            cash_sale: parse_amount(&self.cash_sale),
            bank_sale: parse_amount(&self.bank_sale),
            cash_in_hand: parse_amount(&self.cash_in_hand),
            cash_in_bank: parse_amount(&self.cash_in_bank),
            cash_withdrawal: parse_amount(&self.cash_withdrawal),
            swiggy: parse_amount(&self.swiggy),
            zomato: parse_amount(&self.zomato),
            swiggy_payout: parse_amount(&self.swiggy_payout),
            zomato_payout: parse_amount(&self.zomato_payout),
        }
    }

    pub fn quick_expenses(&self) -> QuickExpenses {
        QuickExpenses {
            oil: parse_amount(&self.oil),
            water_can: parse_amount(&self.water_can),
            water_bottle: parse_amount(&self.water_bottle),
            misc: parse_amount(&self.misc),
        }
    }
}

/// Every derived figure shown live on the sales form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub cash_bank_total: f64,
    pub total_with_platforms: f64,
    pub net_sale: f64,
    pub quick_expense_total: f64,
    pub total_cash_expense: f64,
    pub projected_cash_balance: f64,
    pub cash_after_withdrawal: f64,
    pub cash_check: f64,
}

impl Reconciliation {
    pub fn compute(
        entry: &SalesEntry,
        quick: &QuickExpenses,
        snapshot: &CashBalanceSnapshot,
    ) -> Self {
        let cash_bank_total = entry.cash_sale + entry.bank_sale;
        let total_with_platforms = cash_bank_total + entry.swiggy + entry.zomato;
        let net_sale = total_with_platforms - entry.swiggy_payout - entry.zomato_payout;

        let quick_expense_total = quick.total();
        let total_cash_expense = snapshot.today_cash_expense + quick_expense_total;
        let projected_cash_balance =
            snapshot.yesterday_closing + entry.cash_sale - total_cash_expense;
        let cash_after_withdrawal = entry.cash_in_hand - entry.cash_withdrawal;

        Self {
            cash_bank_total,
            total_with_platforms,
            net_sale,
            quick_expense_total,
            total_cash_expense,
            projected_cash_balance,
            cash_after_withdrawal,
            cash_check: projected_cash_balance - cash_after_withdrawal,
        }
    }

    /// Convenience for the form: parse and compute in one step.
    pub fn from_form(
        form: &SalesForm,
        date: NaiveDate,
        staff_name: &str,
        snapshot: &CashBalanceSnapshot,
    ) -> Self {
        Self::compute(&form.entry(date, staff_name), &form.quick_expenses(), snapshot)
    }

    pub fn status(&self) -> CashCheck {
        CashCheck::classify(self.cash_check)
    }
}

/// Net sale less the month's expenses.
pub fn profit(net_sale: f64, total_expense: f64) -> f64 {
    net_sale - total_expense
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    fn snapshot(yesterday_closing: f64, today_cash_expense: f64) -> CashBalanceSnapshot {
        CashBalanceSnapshot {
            yesterday_closing,
            today_cash_expense,
            cash_withdrawal: 0.0,
        }
    }

    fn form(cash_sale: &str, cash_withdrawal: &str, cash_in_hand: &str) -> SalesForm {
        SalesForm {
            cash_sale: cash_sale.to_string(),
            cash_withdrawal: cash_withdrawal.to_string(),
            cash_in_hand: cash_in_hand.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_money_missing_scenario() {
        let r = Reconciliation::from_form(&form("500", "100", "1150"), day(), "Ravi", &snapshot(1000.0, 200.0));
        assert_eq!(r.projected_cash_balance, 1300.0);
        assert_eq!(r.cash_after_withdrawal, 1050.0);
        assert_eq!(r.cash_check, 250.0);
        assert_eq!(r.status(), CashCheck::Missing(250.0));
    }

    #[test]
    fn test_reconciled_scenario() {
        let r = Reconciliation::from_form(&form("500", "100", "1400"), day(), "Ravi", &snapshot(1000.0, 200.0));
        assert_eq!(r.cash_after_withdrawal, 1300.0);
        assert_eq!(r.cash_check, 0.0);
        assert_eq!(r.status(), CashCheck::Reconciled);
    }

    #[test]
    fn test_surplus_scenario() {
        let r = Reconciliation::from_form(&form("500", "100", "1500"), day(), "Ravi", &snapshot(1000.0, 200.0));
        assert_eq!(r.cash_check, -100.0);
        assert_eq!(r.status(), CashCheck::Surplus(100.0));
    }

    #[test]
    fn test_epsilon_boundary() {
        assert_eq!(CashCheck::classify(0.009), CashCheck::Reconciled);
        assert_eq!(CashCheck::classify(-0.009), CashCheck::Reconciled);
        assert!(!CashCheck::classify(0.011).is_reconciled());
        assert!(matches!(CashCheck::classify(0.011), CashCheck::Missing(_)));
        assert!(matches!(CashCheck::classify(-0.011), CashCheck::Surplus(_)));
    }

    #[test]
    fn test_epsilon_through_computation() {
        let near = Reconciliation::from_form(&form("100.009", "", "100"), day(), "Ravi", &snapshot(0.0, 0.0));
        assert!(near.status().is_reconciled());

        let off = Reconciliation::from_form(&form("100.011", "", "100"), day(), "Ravi", &snapshot(0.0, 0.0));
        assert!(matches!(off.status(), CashCheck::Missing(_)));
    }

    #[test]
    fn test_non_numeric_fields_are_zero_everywhere() {
        let garbage = SalesForm {
            cash_sale: "abc".into(),
            bank_sale: "12x".into(),
            cash_in_hand: "".into(),
            cash_in_bank: "?".into(),
            cash_withdrawal: "none".into(),
            swiggy: "1,000".into(),
            zomato: "--".into(),
            swiggy_payout: "NaN".into(),
            zomato_payout: "inf".into(),
            oil: "oil".into(),
            water_can: " ".into(),
            water_bottle: "two".into(),
            misc: "-".into(),
        };
        let entry = garbage.entry(day(), "Ravi");
        assert_eq!(entry, SalesEntry::empty(day(), "Ravi"));
        assert_eq!(garbage.quick_expenses(), QuickExpenses::default());

        let r = Reconciliation::compute(&entry, &garbage.quick_expenses(), &CashBalanceSnapshot::zeroed());
        assert_eq!(r, Reconciliation::default());
        assert!(r.status().is_reconciled());
    }

    #[test]
    fn test_sales_totals() {
        let entry = SalesEntry {
            cash_sale: 500.0,
            bank_sale: 700.0,
            swiggy: 300.0,
            zomato: 200.0,
            swiggy_payout: 250.0,
            zomato_payout: 150.0,
            ..SalesEntry::empty(day(), "Ravi")
        };
        let r = Reconciliation::compute(&entry, &QuickExpenses::default(), &CashBalanceSnapshot::zeroed());
        assert_eq!(r.cash_bank_total, 1200.0);
        assert_eq!(r.total_with_platforms, 1700.0);
        assert_eq!(r.net_sale, 1300.0);
        assert_eq!(profit(r.net_sale, 400.0), 900.0);
    }

    #[test]
    fn test_quick_expenses_reduce_projection() {
        let mut f = form("500", "", "1000");
        f.oil = "150".into();
        f.water_can = "40".into();
        f.misc = "10".into();
        let r = Reconciliation::from_form(&f, day(), "Ravi", &snapshot(1000.0, 100.0));
        assert_eq!(r.quick_expense_total, 200.0);
        assert_eq!(r.total_cash_expense, 300.0);
        assert_eq!(r.projected_cash_balance, 1200.0);
        assert_eq!(r.status(), CashCheck::Missing(200.0));
    }

    #[test]
    fn test_quick_expense_entries_skip_zero_fields() {
        let quick = QuickExpenses {
            oil: 150.0,
            water_bottle: 20.0,
            ..Default::default()
        };
        let entries = quick.entries(day(), "Ravi");
        let categories: Vec<_> = entries.iter().map(|e| e.category).collect();
        assert_eq!(categories, [ExpenseCategory::Oil, ExpenseCategory::WaterBottle]);
        assert!(entries.iter().all(|e| e.payment_method == crate::models::PaymentMethod::Cash));
    }

    #[test]
    fn test_apply_snapshot_prefills_withdrawal() {
        let mut f = SalesForm::default();
        f.apply_snapshot(&CashBalanceSnapshot {
            cash_withdrawal: 100.0,
            ..Default::default()
        });
        assert_eq!(parse_amount(&f.cash_withdrawal), 100.0);

        f.apply_snapshot(&CashBalanceSnapshot::zeroed());
        assert_eq!(f.cash_withdrawal, "");
    }

    #[test]
    fn test_cash_check_display() {
        assert_eq!(CashCheck::Reconciled.to_string(), "No money missing");
        assert_eq!(CashCheck::Missing(250.0).to_string(), "Money missing: 250.00");
        assert_eq!(CashCheck::Surplus(12.5).to_string(), "Extra cash: 12.50");
    }
}
