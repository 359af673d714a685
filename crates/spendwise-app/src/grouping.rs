// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::Decimal;
use time::Date;

use crate::Expense;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseGroup {
    pub date: Date,
    pub expenses: Vec<Expense>,
}

impl ExpenseGroup {
    pub fn total(&self) -> Decimal {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }
}

/// Groups expenses by calendar day. Groups appear in the order their day is
/// first seen; expenses keep their arrival order inside a group.
pub fn group_expenses(expenses: Vec<Expense>) -> Vec<ExpenseGroup> {
    let mut groups: Vec<ExpenseGroup> = Vec::new();
    for expense in expenses {
        match groups.iter_mut().find(|group| group.date == expense.date) {
            Some(group) => group.expenses.push(expense),
            None => groups.push(ExpenseGroup {
                date: expense.date,
                expenses: vec![expense],
            }),
        }
    }
    groups
}

/// Appends a further page onto already grouped results. Only the trailing
/// group is merged into; earlier days that reappear start a new group.
pub fn append_expenses(groups: &mut Vec<ExpenseGroup>, expenses: Vec<Expense>) {
    let mut incoming = group_expenses(expenses);
    if let Some(last) = groups.last_mut()
        && incoming.first().is_some_and(|first| first.date == last.date)
    {
        let first = incoming.remove(0);
        last.expenses.extend(first.expenses);
    }
    groups.extend(incoming);
}
