// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{Category, Expense, ExpenseId, ExpenseQuery, Page, SortDirection};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No response arrived: connection refused, DNS, timeout.
    #[error("cannot reach the expense service: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("rejected by the expense service: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Backend operations the controllers depend on. Implementations are
/// expected to block until the backend answers.
pub trait ExpenseGateway {
    fn list_expenses(&self, query: &ExpenseQuery) -> GatewayResult<Page<Expense>>;

    /// Creates the expense when it has no id, updates it otherwise.
    fn upsert_expense(&self, expense: &Expense) -> GatewayResult<()>;

    fn delete_expense(&self, id: &ExpenseId) -> GatewayResult<()>;

    /// Lists every category ordered by name.
    fn list_categories(&self, direction: SortDirection) -> GatewayResult<Vec<Category>>;
}

#[cfg(test)]
mod tests {
    use super::GatewayError;

    #[test]
    fn error_messages_are_human_readable() {
        assert_eq!(
            GatewayError::Server {
                status: 503,
                message: "maintenance".to_owned(),
            }
            .to_string(),
            "server error (503): maintenance"
        );
        assert_eq!(
            GatewayError::NotFound("expense e-9".to_owned()).to_string(),
            "not found: expense e-9"
        );
    }
}
