// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::Decimal;
use time::Date;
use tracing::debug;

use crate::{
    Category, Confirmation, DismissRole, Dismissal, Expense, ExpenseFormInput, ExpenseId,
    GatewayResult, Notice, SortDirection,
};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this expense?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// The modal became visible.
    Shown,
    SetName(String),
    SetAmount(Option<Decimal>),
    SetDate(Option<Date>),
    Save,
    Delete,
    Cancel,
    SelectCategory,
    CategoriesLoaded(GatewayResult<Vec<Category>>),
    CategoryPicked(Dismissal<Category>),
    DeletionAnswered(Confirmation),
    UpsertFinished(GatewayResult<()>),
    DeleteFinished(GatewayResult<()>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEffect {
    LoadCategories(SortDirection),
    Upsert(Expense),
    DeleteExpense(ExpenseId),
    ConfirmDeletion(String),
    PickCategory(Vec<Category>),
    Notify(Notice),
    Dismiss(DismissRole),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseEditor {
    form: ExpenseFormInput,
    categories: Vec<Category>,
    submitting: bool,
    deleting: bool,
}

impl ExpenseEditor {
    /// Opens the editor for `expense`, or for a new expense dated `today`.
    pub fn open(expense: Option<&Expense>, today: Date) -> Self {
        let form = match expense {
            Some(expense) => ExpenseFormInput::from_expense(expense),
            None => ExpenseFormInput::blank(today),
        };
        Self {
            form,
            categories: Vec::new(),
            submitting: false,
            deleting: false,
        }
    }

    pub fn form(&self) -> &ExpenseFormInput {
        &self.form
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn can_delete(&self) -> bool {
        self.form.id.is_some()
    }

    pub fn validation_error(&self) -> Option<String> {
        self.form.validate().err().map(|error| error.to_string())
    }

    pub fn title(&self) -> &'static str {
        if self.can_delete() {
            "edit expense"
        } else {
            "add expense"
        }
    }

    pub fn dispatch(&mut self, command: EditorCommand) -> Vec<EditorEffect> {
        match command {
            EditorCommand::Shown => vec![EditorEffect::LoadCategories(SortDirection::Asc)],
            EditorCommand::SetName(name) => {
                self.form.name = name;
                Vec::new()
            }
            EditorCommand::SetAmount(amount) => {
                self.form.amount = amount;
                Vec::new()
            }
            EditorCommand::SetDate(date) => {
                self.form.date = date;
                Vec::new()
            }
            EditorCommand::Save => self.save(),
            EditorCommand::Delete => self.delete(),
            EditorCommand::Cancel => vec![EditorEffect::Dismiss(DismissRole::Cancel)],
            EditorCommand::SelectCategory => {
                if self.categories.is_empty() {
                    debug!("no categories loaded; picker not opened");
                    return Vec::new();
                }
                vec![EditorEffect::PickCategory(self.categories.clone())]
            }
            EditorCommand::CategoriesLoaded(Ok(categories)) => {
                self.categories = categories;
                Vec::new()
            }
            EditorCommand::CategoriesLoaded(Err(error)) => {
                self.categories.clear();
                vec![EditorEffect::Notify(Notice::error(
                    "Could not load categories",
                    &error,
                ))]
            }
            EditorCommand::CategoryPicked(dismissal) => {
                if dismissal.role == Some(DismissRole::Save)
                    && let Some(category) = dismissal.data
                {
                    self.form.category = Some(category);
                }
                Vec::new()
            }
            EditorCommand::DeletionAnswered(answer) => self.confirm_delete(answer),
            EditorCommand::UpsertFinished(result) => {
                self.submitting = false;
                match result {
                    Ok(()) => vec![
                        EditorEffect::Notify(Notice::success("Expense saved successfully")),
                        EditorEffect::Dismiss(DismissRole::Save),
                    ],
                    Err(error) => vec![EditorEffect::Notify(Notice::error(
                        "Failed to save expense",
                        &error,
                    ))],
                }
            }
            EditorCommand::DeleteFinished(result) => {
                self.deleting = false;
                match result {
                    Ok(()) => vec![
                        EditorEffect::Notify(Notice::success("Expense deleted successfully")),
                        EditorEffect::Dismiss(DismissRole::Delete),
                    ],
                    Err(error) => vec![EditorEffect::Notify(Notice::error(
                        "Failed to delete expense",
                        &error,
                    ))],
                }
            }
        }
    }

    fn save(&mut self) -> Vec<EditorEffect> {
        if self.submitting {
            return Vec::new();
        }
        let expense = match self.form.to_expense() {
            Ok(expense) => expense,
            Err(error) => {
                debug!(%error, "save blocked by form validation");
                return Vec::new();
            }
        };
        self.submitting = true;
        vec![EditorEffect::Upsert(expense)]
    }

    fn delete(&mut self) -> Vec<EditorEffect> {
        if !self.can_delete() || self.deleting {
            return Vec::new();
        }
        vec![EditorEffect::ConfirmDeletion(DELETE_CONFIRMATION.to_owned())]
    }

    fn confirm_delete(&mut self, answer: Confirmation) -> Vec<EditorEffect> {
        if answer != Confirmation::Delete || self.deleting {
            return Vec::new();
        }
        let Some(id) = self.form.id.clone() else {
            return Vec::new();
        };
        self.deleting = true;
        vec![EditorEffect::DeleteExpense(id)]
    }
}
