// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use tracing::{debug, warn};

use crate::{
    Dismissal, Expense, ExpenseGroup, ExpenseQuery, GatewayResult, Notice, Page, SortCriterion,
    append_expenses, first_of_month, format_year_month, group_expenses, shift_date_by_months,
};

pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Completion token handed back once a load settles, the way a
/// pull-to-refresh or infinite-scroll widget expects to be told it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ack(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Reload,
    NextPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub request_id: u64,
    pub kind: PageKind,
    pub query: ExpenseQuery,
    pub ack: Option<Ack>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub request: PageRequest,
    pub result: GatewayResult<Page<Expense>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserCommand {
    ShiftMonth(i32),
    SetSearchTerm(String),
    SetSort(SortCriterion),
    Reload { ack: Option<Ack> },
    LoadNextPage { ack: Ack },
    OpenCreate,
    OpenEdit(Expense),
    EditorClosed(Dismissal),
    PageLoaded(PageResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEffect {
    Fetch(PageRequest),
    Acknowledge(Ack),
    Notify(Notice),
    OpenEditor(Option<Expense>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseBrowser {
    month: Date,
    groups: Option<Vec<ExpenseGroup>>,
    loading: bool,
    last_page_reached: bool,
    search_term: String,
    sort: SortCriterion,
    page_cursor: u32,
    page_size: u32,
    generation: u64,
}

impl ExpenseBrowser {
    pub fn new(today: Date, page_size: u32) -> Self {
        Self {
            month: first_of_month(today),
            groups: None,
            loading: false,
            last_page_reached: false,
            search_term: String::new(),
            sort: SortCriterion::default(),
            page_cursor: 0,
            page_size: page_size.max(1),
            generation: 0,
        }
    }

    pub fn month(&self) -> Date {
        self.month
    }

    /// `None` until the first load settles.
    pub fn groups(&self) -> Option<&[ExpenseGroup]> {
        self.groups.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_page_reached(&self) -> bool {
        self.last_page_reached
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort(&self) -> SortCriterion {
        self.sort
    }

    pub fn page_cursor(&self) -> u32 {
        self.page_cursor
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn expense_count(&self) -> usize {
        self.groups
            .iter()
            .flatten()
            .map(|group| group.expenses.len())
            .sum()
    }

    pub fn dispatch(&mut self, command: BrowserCommand) -> Vec<BrowserEffect> {
        match command {
            BrowserCommand::ShiftMonth(delta) => self.shift_month(delta),
            BrowserCommand::SetSearchTerm(term) => {
                self.search_term = term;
                self.full_reload(None)
            }
            BrowserCommand::SetSort(sort) => {
                self.sort = sort;
                self.full_reload(None)
            }
            BrowserCommand::Reload { ack } => self.full_reload(ack),
            BrowserCommand::LoadNextPage { ack } => self.load_next_page(ack),
            BrowserCommand::OpenCreate => vec![BrowserEffect::OpenEditor(None)],
            BrowserCommand::OpenEdit(expense) => vec![BrowserEffect::OpenEditor(Some(expense))],
            BrowserCommand::EditorClosed(dismissal) => match dismissal.role {
                Some(role) if role.changes_data() => {
                    debug!(role = role.as_str(), "editor changed data; reloading");
                    self.full_reload(None)
                }
                _ => Vec::new(),
            },
            BrowserCommand::PageLoaded(response) => self.apply_page(response),
        }
    }

    fn shift_month(&mut self, delta: i32) -> Vec<BrowserEffect> {
        let Some(month) = shift_date_by_months(self.month, delta) else {
            warn!(delta, "month shift out of calendar range");
            return Vec::new();
        };
        self.month = first_of_month(month);
        self.full_reload(None)
    }

    fn full_reload(&mut self, ack: Option<Ack>) -> Vec<BrowserEffect> {
        self.generation = self.generation.wrapping_add(1);
        self.groups = None;
        self.last_page_reached = false;
        self.page_cursor = 0;
        self.loading = true;
        debug!(
            request_id = self.generation,
            month = %format_year_month(self.month),
            search = %self.search_term,
            sort = %self.sort.as_param(),
            "reloading expenses"
        );
        vec![BrowserEffect::Fetch(PageRequest {
            request_id: self.generation,
            kind: PageKind::Reload,
            query: self.query_for(0),
            ack,
        })]
    }

    fn load_next_page(&mut self, ack: Ack) -> Vec<BrowserEffect> {
        if self.last_page_reached || self.loading || self.groups.is_none() {
            return vec![BrowserEffect::Acknowledge(ack)];
        }

        self.page_cursor = self.page_cursor.saturating_add(1);
        self.loading = true;
        vec![BrowserEffect::Fetch(PageRequest {
            request_id: self.generation,
            kind: PageKind::NextPage,
            query: self.query_for(self.page_cursor),
            ack: Some(ack),
        })]
    }

    fn apply_page(&mut self, response: PageResponse) -> Vec<BrowserEffect> {
        let PageResponse { request, result } = response;
        let mut effects = Vec::new();

        if request.request_id != self.generation {
            debug!(
                request_id = request.request_id,
                current = self.generation,
                "discarding superseded expense page"
            );
            effects.extend(request.ack.map(BrowserEffect::Acknowledge));
            return effects;
        }

        self.loading = false;
        match (request.kind, result) {
            (PageKind::Reload, Ok(page)) => {
                self.last_page_reached = page.is_last();
                self.groups = Some(group_expenses(page.content));
            }
            (PageKind::Reload, Err(error)) => {
                warn!(%error, "expense reload failed");
                self.groups = Some(Vec::new());
                effects.push(BrowserEffect::Notify(Notice::error(
                    "Could not load expenses",
                    &error,
                )));
            }
            (PageKind::NextPage, Ok(page)) => {
                self.last_page_reached = page.is_last();
                append_expenses(self.groups.get_or_insert_with(Vec::new), page.content);
            }
            (PageKind::NextPage, Err(error)) => {
                warn!(%error, page = request.query.page, "loading next expense page failed");
                self.page_cursor = self.page_cursor.saturating_sub(1);
                effects.push(BrowserEffect::Notify(Notice::error(
                    "Could not load more expenses",
                    &error,
                )));
            }
        }

        effects.extend(request.ack.map(BrowserEffect::Acknowledge));
        effects
    }

    fn query_for(&self, page: u32) -> ExpenseQuery {
        ExpenseQuery::new(self.month, &self.search_term, self.sort, page, self.page_size)
    }
}
