// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;
use crate::period::Period;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub is_system_account: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryType {
    #[serde(rename = "Income")]
    Income,
    #[serde(rename = "Fixed Expense")]
    FixedExpense,
    #[serde(rename = "Utility")]
    Utility,
    #[serde(rename = "Static Loan")]
    StaticLoan,
    #[serde(rename = "Dynamic Debt")]
    DynamicDebt,
}

impl CategoryType {
    pub const ALL: [CategoryType; 5] = [
        CategoryType::Income,
        CategoryType::FixedExpense,
        CategoryType::Utility,
        CategoryType::StaticLoan,
        CategoryType::DynamicDebt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "Income",
            CategoryType::FixedExpense => "Fixed Expense",
            CategoryType::Utility => "Utility",
            CategoryType::StaticLoan => "Static Loan",
            CategoryType::DynamicDebt => "Dynamic Debt",
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, CategoryType::Income)
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "income" => Ok(CategoryType::Income),
            "fixedexpense" => Ok(CategoryType::FixedExpense),
            "utility" => Ok(CategoryType::Utility),
            "staticloan" => Ok(CategoryType::StaticLoan),
            "dynamicdebt" => Ok(CategoryType::DynamicDebt),
            _ => Err(LedgerError::not_found("Category type", s.trim())),
        }
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryType,
    pub is_recurring: bool,
    pub is_static: bool,
    pub is_household: bool,
    pub default_amount: Decimal,
}

/// Who owns the records a category produces each period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipScope {
    Household,
    PerUser,
}

impl Category {
    pub fn ownership(&self) -> OwnershipScope {
        if self.is_household {
            OwnershipScope::Household
        } else {
            OwnershipScope::PerUser
        }
    }

    /// Amount a freshly seeded period starts with.
    pub fn seed_amount(&self) -> Decimal {
        if self.is_static {
            self.default_amount
        } else {
            Decimal::ZERO
        }
    }
}

impl OwnershipScope {
    /// Resolve the user ids that receive one record each for this category.
    pub fn target_users(&self, household_id: i64, real_users: &[User]) -> Vec<i64> {
        match self {
            OwnershipScope::Household => vec![household_id],
            OwnershipScope::PerUser => real_users.iter().map(|u| u.id).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub month_year: Period,
    pub note: Option<String>,
}

/// A record joined with the type of its category.
#[derive(Debug, Clone, Serialize)]
pub struct CategorizedRecord {
    pub record: Record,
    pub category_name: String,
    pub kind: CategoryType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub total_principal: Decimal,
    pub remaining_balance: Decimal,
    pub interest_rate: Decimal,
    pub monthly_payment: Decimal,
    pub start_date: NaiveDate,
    pub target_payoff_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevolvingDebt {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub current_balance: Decimal,
    pub credit_limit: Decimal,
    pub minimum_payment: Decimal,
    pub interest_rate: Decimal,
    pub is_temporary: bool,
}

/// A revolving debt with the amount paid in the period being viewed.
#[derive(Debug, Clone, Serialize)]
pub struct DebtWithPayment {
    pub debt: RevolvingDebt,
    pub period_payment: Decimal,
    pub period_payment_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayment {
    pub id: i64,
    pub debt_id: i64,
    pub amount: Decimal,
    pub month_year: Period,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub kind: String,
    pub current_value: Decimal,
    pub cost_basis: Decimal,
    pub target_amount: Option<Decimal>,
    pub monthly_contribution: Decimal,
    pub shares: Decimal,
    pub total_units: Decimal,
    pub vested_units: Decimal,
    pub unvested_units: Decimal,
    pub is_active: bool,
}

impl Asset {
    pub fn recompute_unvested(&mut self) {
        self.unvested_units = (self.total_units - self.vested_units).max(Decimal::ZERO);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetTxKind {
    Deposit,
    Withdraw,
    Buy,
    Sell,
    Vest,
    Dividend,
    Contribution,
}

impl AssetTxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetTxKind::Deposit => "deposit",
            AssetTxKind::Withdraw => "withdraw",
            AssetTxKind::Buy => "buy",
            AssetTxKind::Sell => "sell",
            AssetTxKind::Vest => "vest",
            AssetTxKind::Dividend => "dividend",
            AssetTxKind::Contribution => "contribution",
        }
    }
}

impl fmt::Display for AssetTxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetTxKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deposit" => Ok(AssetTxKind::Deposit),
            "withdraw" => Ok(AssetTxKind::Withdraw),
            "buy" => Ok(AssetTxKind::Buy),
            "sell" => Ok(AssetTxKind::Sell),
            "vest" => Ok(AssetTxKind::Vest),
            "dividend" => Ok(AssetTxKind::Dividend),
            "contribution" => Ok(AssetTxKind::Contribution),
            other => Err(LedgerError::not_found("Asset transaction type", other)),
        }
    }
}

impl ToSql for AssetTxKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AssetTxKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetTransaction {
    pub id: i64,
    pub asset_id: i64,
    pub kind: AssetTxKind,
    pub amount: Decimal,
    pub units: Option<Decimal>,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// Whose data a view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Every owner combined, Household included.
    #[default]
    Family,
    User(i64),
}

impl Scope {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Scope::Family => None,
            Scope::User(id) => Some(*id),
        }
    }

    pub fn is_family(&self) -> bool {
        matches!(self, Scope::Family)
    }
}
