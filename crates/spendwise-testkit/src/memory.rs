// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::Decimal;
use spendwise_app::{
    Category, Expense, ExpenseGateway, ExpenseId, ExpenseQuery, GatewayError, GatewayResult,
    Page, SortDirection, SortField, first_of_month,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use time::Date;
use tracing::debug;

const QUERY_LOG_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    ListExpenses,
    UpsertExpense,
    DeleteExpense,
    ListCategories,
}

#[derive(Debug, Clone)]
struct StoredExpense {
    created: u64,
    expense: Expense,
}

#[derive(Debug, Default)]
struct Store {
    expenses: Vec<StoredExpense>,
    categories: Vec<Category>,
    next_id: u64,
    failures: HashMap<GatewayOperation, GatewayError>,
    queries: VecDeque<ExpenseQuery>,
}

/// Backend stand-in that keeps expenses in memory and answers the same
/// filtered, sorted and paged queries the REST service does. Clones share
/// one store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    store: Arc<Mutex<Store>>,
}

impl InMemoryGateway {
    pub fn new(categories: Vec<Category>) -> Self {
        let gateway = Self::default();
        gateway.lock().categories = categories;
        gateway
    }

    /// A gateway pre-filled with demo categories and three months of
    /// expenses ending at `today`.
    pub fn seeded(seed: u64, today: Date) -> Self {
        let gateway = Self::new(crate::ExpenseFaker::new(seed).categories());
        for expense in crate::demo_expenses(seed, today) {
            gateway.insert(expense);
        }
        gateway
    }

    /// Stores `expense` under a fresh id, ignoring any id it carries.
    pub fn insert(&self, expense: Expense) -> ExpenseId {
        let mut store = self.lock();
        store.next_id += 1;
        let id = ExpenseId::new(format!("e-{}", store.next_id));
        let created = store.next_id;
        store.expenses.push(StoredExpense {
            created,
            expense: Expense {
                id: Some(id.clone()),
                ..expense
            },
        });
        id
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.lock()
            .expenses
            .iter()
            .map(|stored| stored.expense.clone())
            .collect()
    }

    pub fn expense(&self, id: &ExpenseId) -> Option<Expense> {
        self.lock()
            .expenses
            .iter()
            .find(|stored| stored.expense.id.as_ref() == Some(id))
            .map(|stored| stored.expense.clone())
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: GatewayOperation, error: GatewayError) {
        self.lock().failures.insert(operation, error);
    }

    /// The most recent expense queries, oldest first.
    pub fn queries(&self) -> Vec<ExpenseQuery> {
        self.lock().queries.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store {
    fn take_failure(&mut self, operation: GatewayOperation) -> GatewayResult<()> {
        match self.failures.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn resolve_category(&self, expense: &Expense) -> GatewayResult<Option<Category>> {
        let Some(category) = &expense.category else {
            return Ok(None);
        };
        self.categories
            .iter()
            .find(|known| known.id == category.id)
            .cloned()
            .map(Some)
            .ok_or_else(|| GatewayError::Validation(format!("unknown category {}", category.id)))
    }
}

impl ExpenseGateway for InMemoryGateway {
    fn list_expenses(&self, query: &ExpenseQuery) -> GatewayResult<Page<Expense>> {
        let mut store = self.lock();
        if store.queries.len() == QUERY_LOG_LIMIT {
            store.queries.pop_front();
        }
        store.queries.push_back(query.clone());
        store.take_failure(GatewayOperation::ListExpenses)?;

        let month = first_of_month(query.month);
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matches: Vec<&StoredExpense> = store
            .expenses
            .iter()
            .filter(|stored| first_of_month(stored.expense.date) == month)
            .filter(|stored| {
                needle
                    .as_deref()
                    .is_none_or(|needle| stored.expense.name.to_lowercase().contains(needle))
            })
            .collect();

        matches.sort_by(|left, right| {
            let ordering = match query.sort.field {
                SortField::CreatedAt => left.created.cmp(&right.created),
                SortField::Name => left
                    .expense
                    .name
                    .to_lowercase()
                    .cmp(&right.expense.name.to_lowercase())
                    .then(left.created.cmp(&right.created)),
            };
            match query.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let size = query.size.max(1) as usize;
        let start = (query.page as usize).saturating_mul(size);
        let total = matches.len();
        let content: Vec<Expense> = matches
            .into_iter()
            .skip(start)
            .take(size)
            .map(|stored| stored.expense.clone())
            .collect();
        debug!(page = query.page, returned = content.len(), total, "in-memory expense page");

        Ok(Page {
            content,
            last: Some(start.saturating_add(size) >= total),
            total_elements: Some(total as u64),
        })
    }

    fn upsert_expense(&self, expense: &Expense) -> GatewayResult<()> {
        let mut store = self.lock();
        store.take_failure(GatewayOperation::UpsertExpense)?;

        if expense.name.trim().is_empty() {
            return Err(GatewayError::Validation("name must not be blank".to_owned()));
        }
        if expense.amount < Decimal::ZERO {
            return Err(GatewayError::Validation(
                "amount must not be negative".to_owned(),
            ));
        }
        let category = store.resolve_category(expense)?;
        let record = Expense {
            category,
            ..expense.clone()
        };

        match &expense.id {
            Some(id) => {
                let stored = store
                    .expenses
                    .iter_mut()
                    .find(|stored| stored.expense.id.as_ref() == Some(id))
                    .ok_or_else(|| GatewayError::NotFound(format!("expense {id}")))?;
                stored.expense = record;
            }
            None => {
                store.next_id += 1;
                let created = store.next_id;
                store.expenses.push(StoredExpense {
                    created,
                    expense: Expense {
                        id: Some(ExpenseId::new(format!("e-{created}"))),
                        ..record
                    },
                });
            }
        }
        Ok(())
    }

    fn delete_expense(&self, id: &ExpenseId) -> GatewayResult<()> {
        let mut store = self.lock();
        store.take_failure(GatewayOperation::DeleteExpense)?;

        let before = store.expenses.len();
        store
            .expenses
            .retain(|stored| stored.expense.id.as_ref() != Some(id));
        if store.expenses.len() == before {
            return Err(GatewayError::NotFound(format!("expense {id}")));
        }
        Ok(())
    }

    fn list_categories(&self, direction: SortDirection) -> GatewayResult<Vec<Category>> {
        let mut store = self.lock();
        store.take_failure(GatewayOperation::ListCategories)?;

        let mut categories = store.categories.clone();
        categories.sort_by(|left, right| left.name.to_lowercase().cmp(&right.name.to_lowercase()));
        if direction == SortDirection::Desc {
            categories.reverse();
        }
        Ok(categories)
    }
}
