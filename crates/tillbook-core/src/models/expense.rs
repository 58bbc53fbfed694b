//! Expense entries and the fixed category set they are booked against.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::amount::{deserialize_amount, parse_amount};
use crate::error::ValidationError;

/// Expense categories, in the column order of the expense sheet.
///
/// This is the single identifier every component uses for a category; the
/// sheet label is only produced at the wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExpenseCategory {
    Rent,
    Staff,
    Bake,
    Store,
    Biscoff,
    IceCream,
    Oil,
    Disposable,
    SmoochoDisposable,
    WaterCan,
    WaterBottle,
    GoodLife,
    Wiping,
    Promotion,
    Nuts,
    Custard,
    Kiwi,
    Strawberry,
    Mango,
    Robst,
    Pineapple,
    Misc,
}

impl ExpenseCategory {
    const ALL: [ExpenseCategory; 22] = [
        ExpenseCategory::Rent,
        ExpenseCategory::Staff,
        ExpenseCategory::Bake,
        ExpenseCategory::Store,
        ExpenseCategory::Biscoff,
        ExpenseCategory::IceCream,
        ExpenseCategory::Oil,
        ExpenseCategory::Disposable,
        ExpenseCategory::SmoochoDisposable,
        ExpenseCategory::WaterCan,
        ExpenseCategory::WaterBottle,
        ExpenseCategory::GoodLife,
        ExpenseCategory::Wiping,
        ExpenseCategory::Promotion,
        ExpenseCategory::Nuts,
        ExpenseCategory::Custard,
        ExpenseCategory::Kiwi,
        ExpenseCategory::Strawberry,
        ExpenseCategory::Mango,
        ExpenseCategory::Robst,
        ExpenseCategory::Pineapple,
        ExpenseCategory::Misc,
    ];

    /// Every category in sheet order.
    pub fn all() -> &'static [ExpenseCategory] {
        &Self::ALL
    }

    /// The fruit categories, in sheet order.
    pub fn fruits() -> impl Iterator<Item = ExpenseCategory> {
        Self::ALL.into_iter().filter(|c| c.is_fruit())
    }

    /// Every category that is not a fruit, in sheet order.
    pub fn others() -> impl Iterator<Item = ExpenseCategory> {
        Self::ALL.into_iter().filter(|c| !c.is_fruit())
    }

    /// The label used as the column header in the expense sheet.
    /// Spellings follow the sheet exactly.
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "Rent",
            ExpenseCategory::Staff => "Staff",
            ExpenseCategory::Bake => "Bake",
            ExpenseCategory::Store => "Store",
            ExpenseCategory::Biscoff => "Biscoff",
            ExpenseCategory::IceCream => "Ice crm",
            ExpenseCategory::Oil => "Oil",
            ExpenseCategory::Disposable => "Disposbl",
            ExpenseCategory::SmoochoDisposable => "Smoocho Disposable",
            ExpenseCategory::WaterCan => "Water Can",
            ExpenseCategory::WaterBottle => "Water Bottle",
            ExpenseCategory::GoodLife => "Good Life",
            ExpenseCategory::Wiping => "Wipping",
            ExpenseCategory::Promotion => "Promotion",
            ExpenseCategory::Nuts => "Nuts",
            ExpenseCategory::Custard => "Custard",
            ExpenseCategory::Kiwi => "Kiwi",
            ExpenseCategory::Strawberry => "Strawberry",
            ExpenseCategory::Mango => "Mango",
            ExpenseCategory::Robst => "Robst",
            ExpenseCategory::Pineapple => "pinaple",
            ExpenseCategory::Misc => "Misc",
        }
    }

    pub fn is_fruit(&self) -> bool {
        matches!(
            self,
            ExpenseCategory::Kiwi
                | ExpenseCategory::Strawberry
                | ExpenseCategory::Mango
                | ExpenseCategory::Robst
                | ExpenseCategory::Pineapple
        )
    }

    /// Lower-case a label and fold underscores and runs of whitespace into
    /// single spaces, so `water_can`, `Water  Can` and `Water Can` compare equal.
    fn normalize(label: &str) -> String {
        label
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for ExpenseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = Self::normalize(s);
        Self::ALL
            .into_iter()
            .find(|c| Self::normalize(c.label()) == wanted)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for ExpenseCategory {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExpenseCategory> for String {
    fn from(category: ExpenseCategory) -> Self {
        category.label().to_string()
    }
}

/// How an expense was paid. Only cash expenses reduce the till balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Bank,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "bank" => Ok(PaymentMethod::Bank),
            other => Err(ValidationError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// A single expense row as written to the expense sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseEntry {
    pub date: NaiveDate,
    pub staff_name: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub category: ExpenseCategory,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
}

impl ExpenseEntry {
    /// A cash expense, as produced by the quick-expense fields of the sales form.
    pub fn cash(date: NaiveDate, staff_name: &str, category: ExpenseCategory, amount: f64) -> Self {
        Self {
            date,
            staff_name: staff_name.to_string(),
            payment_method: PaymentMethod::Cash,
            category,
            amount,
        }
    }
}

/// Raw expense form input, validated before anything is sent or queued.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    pub category: Option<ExpenseCategory>,
    pub amount: String,
}

impl ExpenseDraft {
    /// Check the required fields and build the entry to submit.
    ///
    /// A category must be chosen and the amount must parse to a positive value.
    pub fn validate(&self, staff_name: &str) -> Result<ExpenseEntry, ValidationError> {
        let date = self.date.ok_or(ValidationError::MissingDate)?;
        let category = self.category.ok_or(ValidationError::MissingCategory)?;
        let amount = parse_amount(&self.amount);
        if amount <= 0.0 {
            return Err(ValidationError::InvalidAmount(self.amount.clone()));
        }
        Ok(ExpenseEntry {
            date,
            staff_name: staff_name.to_string(),
            payment_method: self.payment_method,
            category,
            amount,
        })
    }
}

/// Sum of every expense amount.
pub fn total_expense(expenses: &[ExpenseEntry]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Sum of the expenses booked against fruit categories.
pub fn fruit_sum(expenses: &[ExpenseEntry]) -> f64 {
    expenses
        .iter()
        .filter(|e| e.category.is_fruit())
        .map(|e| e.amount)
        .sum()
}
