// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use rust_decimal::Decimal;
use time::Date;

use crate::{Category, Expense, ExpenseId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFormInput {
    pub id: Option<ExpenseId>,
    pub name: String,
    pub amount: Option<Decimal>,
    pub date: Option<Date>,
    pub category: Option<Category>,
}

impl ExpenseFormInput {
    pub fn blank(today: Date) -> Self {
        Self {
            id: None,
            name: String::new(),
            amount: None,
            date: Some(today),
            category: None,
        }
    }

    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            id: expense.id.clone(),
            name: expense.name.clone(),
            amount: Some(expense.amount),
            date: Some(expense.date),
            category: expense.category.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("expense name is required -- enter a name and retry");
        }
        match self.amount {
            None => bail!("expense amount is required -- enter an amount and retry"),
            Some(amount) if amount < Decimal::ZERO => {
                bail!("expense amount cannot be negative")
            }
            Some(_) => {}
        }
        if self.date.is_none() {
            bail!("expense date is required -- pick a date and retry");
        }
        Ok(())
    }

    /// Builds the record sent to the backend. The name is trimmed; the date
    /// is already date-only.
    pub fn to_expense(&self) -> Result<Expense> {
        self.validate()?;
        Ok(Expense {
            id: self.id.clone(),
            name: self.name.trim().to_owned(),
            amount: self.amount.ok_or_else(|| anyhow!("expense amount missing"))?,
            date: self.date.ok_or_else(|| anyhow!("expense date missing"))?,
            category: self.category.clone(),
        })
    }
}

/// Parses user-typed money. Accepts a comma as decimal separator.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<Decimal>().ok()
}
