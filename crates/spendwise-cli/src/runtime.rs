// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use spendwise_app::{
    Category, Expense, ExpenseGateway, ExpenseId, ExpenseQuery, GatewayResult, Page, PageRequest,
    PageResponse, SortDirection,
};
use spendwise_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

/// Hosts the terminal UI on top of any gateway, loading pages on a
/// background thread so the event loop keeps drawing.
pub struct ApiRuntime<G> {
    gateway: G,
}

impl<G> ApiRuntime<G>
where
    G: ExpenseGateway + Clone + Send + 'static,
{
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: ExpenseGateway> ExpenseGateway for ApiRuntime<G> {
    fn list_expenses(&self, query: &ExpenseQuery) -> GatewayResult<Page<Expense>> {
        self.gateway.list_expenses(query)
    }

    fn upsert_expense(&self, expense: &Expense) -> GatewayResult<()> {
        self.gateway.upsert_expense(expense)
    }

    fn delete_expense(&self, id: &ExpenseId) -> GatewayResult<()> {
        self.gateway.delete_expense(id)
    }

    fn list_categories(&self, direction: SortDirection) -> GatewayResult<Vec<Category>> {
        self.gateway.list_categories(direction)
    }
}

impl<G> spendwise_tui::AppRuntime for ApiRuntime<G>
where
    G: ExpenseGateway + Clone + Send + 'static,
{
    fn spawn_list_expenses(
        &mut self,
        request: PageRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let gateway = self.gateway.clone();
        thread::Builder::new()
            .name(format!("expense-page-{}", request.request_id))
            .spawn(move || {
                let result = gateway.list_expenses(&request.query);
                // The receiver is gone once the UI has exited.
                if tx
                    .send(InternalEvent::PageLoaded(PageResponse { request, result }))
                    .is_err()
                {
                    debug!("expense page dropped after UI shutdown");
                }
            })
            .context("spawn expense page loader")?;
        Ok(())
    }
}
