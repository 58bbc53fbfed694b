//! Plain-text rendering of reconciliation, summaries and listings.

use chrono::NaiveDate;
use serde_json::Value;

use tillbook_core::utils::truncate_string;
use tillbook_core::{
    format_currency, CashBalanceSnapshot, EntriesTable, MonthKey, MonthlySummary,
    OfflineQueueItem, Reconciliation,
};

/// Widest a listing cell may be before it is truncated
const MAX_CELL_WIDTH: usize = 18;

fn line(label: &str, amount: f64) {
    println!("  {:<26}{:>16}", label, format_currency(amount));
}

pub fn print_balance(date: NaiveDate, snapshot: &CashBalanceSnapshot) {
    println!("Cash balance for {}", date.format("%d %b %Y"));
    line("Yesterday's closing", snapshot.yesterday_closing);
    line("Cash expenses so far", snapshot.today_cash_expense);
    line("Cash withdrawal", snapshot.cash_withdrawal);
    if snapshot.is_zeroed() {
        println!("  (no balance recorded, or the service could not be reached)");
    }
}

pub fn print_reconciliation(snapshot: &CashBalanceSnapshot, r: &Reconciliation) {
    println!("Sales");
    line("Cash + bank", r.cash_bank_total);
    line("Total with platforms", r.total_with_platforms);
    line("Net sale", r.net_sale);
    println!("Cash");
    line("Yesterday's closing", snapshot.yesterday_closing);
    line("Quick expenses", r.quick_expense_total);
    line("Total cash expense", r.total_cash_expense);
    line("Projected cash balance", r.projected_cash_balance);
    line("Cash after withdrawal", r.cash_after_withdrawal);
    println!("{}", r.status());
}

pub fn print_summary(month: &MonthKey, summary: &MonthlySummary, updated: &str) {
    println!("{} (updated {})", month.display_long(), updated);
    line("Total sales", summary.total_sales);
    line("  Cash", summary.cash_sales);
    line("  Bank", summary.bank_sales);
    line("Total expenses", summary.total_expenses);
    line(if summary.is_profitable() { "Profit" } else { "Loss" }, summary.profit);
    println!("  {:<26}{:>15.1}%", "Expense ratio", summary.expense_ratio);
    println!("  {:<26}{:>15.1}%", "Profit margin", summary.profit_margin);
}

fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate_string(&text, MAX_CELL_WIDTH)
}

pub fn print_entries(table: &EntriesTable) {
    if table.is_empty() {
        println!("No entries");
        return;
    }
    let header: Vec<String> = table
        .headers
        .iter()
        .map(|h| format!("{:<w$}", truncate_string(h, MAX_CELL_WIDTH), w = MAX_CELL_WIDTH))
        .collect();
    println!("{}", header.join(" "));
    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|v| format!("{:<w$}", cell(v), w = MAX_CELL_WIDTH))
            .collect();
        println!("{}", cells.join(" "));
    }
}

fn describe(item: &OfflineQueueItem) -> String {
    if let Some(sales) = item.sales() {
        return format!("{} cash {}", sales.date, format_currency(sales.cash_sale));
    }
    if let Some(expense) = item.expense() {
        return format!(
            "{} {} {} ({})",
            expense.date,
            expense.category,
            format_currency(expense.amount),
            expense.payment_method
        );
    }
    truncate_string(&item.data.to_string(), 48)
}

pub fn print_queue(items: &[OfflineQueueItem]) {
    if items.is_empty() {
        println!("Offline queue is empty");
        return;
    }
    println!("{} queued entr{}", items.len(), if items.len() == 1 { "y" } else { "ies" });
    for (i, item) in items.iter().enumerate() {
        println!(
            "  {:>3}. {:<8} {}  saved {}",
            i + 1,
            item.kind,
            describe(item),
            item.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tillbook_core::EntryKind;

    use super::*;

    #[test]
    fn test_cell_strips_quotes_and_nulls() {
        assert_eq!(cell(&json!("Ravi")), "Ravi");
        assert_eq!(cell(&json!(1250.5)), "1250.5");
        assert_eq!(cell(&Value::Null), "");
    }

    #[test]
    fn test_cell_truncates_long_text() {
        let text = cell(&json!("a very long note written by staff"));
        assert_eq!(text.chars().count(), MAX_CELL_WIDTH);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_describe_queued_expense() {
        let item = OfflineQueueItem::new(
            EntryKind::Expense,
            json!({
                "date": "2026-03-14",
                "staffName": "Ravi",
                "paymentMethod": "cash",
                "category": "Oil",
                "amount": 1200
            }),
        );
        assert_eq!(describe(&item), "2026-03-14 Oil ₹1,200.00 (cash)");
    }
}
