// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::calendar::{first_of_month, format_year_month};
use crate::ids::*;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ExpenseId>,
    pub name: String,
    pub amount: Decimal,
    #[serde(with = "date_only")]
    pub date: Date,
    #[serde(default)]
    pub category: Option<Category>,
}

/// Formats a date the way the backend expects it, without a time component.
pub fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month() as u8, date.day())
}

/// Parses `YYYY-MM-DD`, ignoring any trailing time component such as
/// `T10:15:00Z`.
pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(head, DATE_FORMAT)
}

mod date_only {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    CreatedAt,
    Name,
}

impl SortField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortCriterion {
    pub const CREATED_DESC: Self = Self::new(SortField::CreatedAt, SortDirection::Desc);
    pub const CREATED_ASC: Self = Self::new(SortField::CreatedAt, SortDirection::Asc);
    pub const NAME_ASC: Self = Self::new(SortField::Name, SortDirection::Asc);
    pub const NAME_DESC: Self = Self::new(SortField::Name, SortDirection::Desc);

    pub const ALL: [Self; 4] = [
        Self::CREATED_DESC,
        Self::CREATED_ASC,
        Self::NAME_ASC,
        Self::NAME_DESC,
    ];

    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Wire encoding: `field,direction`.
    pub fn as_param(self) -> String {
        format!("{},{}", self.field.as_str(), self.direction.as_str())
    }

    pub const fn label(self) -> &'static str {
        match (self.field, self.direction) {
            (SortField::CreatedAt, SortDirection::Desc) => "newest first",
            (SortField::CreatedAt, SortDirection::Asc) => "oldest first",
            (SortField::Name, SortDirection::Asc) => "name A-Z",
            (SortField::Name, SortDirection::Desc) => "name Z-A",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|criterion| *criterion == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl Default for SortCriterion {
    fn default() -> Self {
        Self::CREATED_DESC
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseQuery {
    pub month: Date,
    pub search: Option<String>,
    pub sort: SortCriterion,
    pub page: u32,
    pub size: u32,
}

impl ExpenseQuery {
    pub fn new(month: Date, search_term: &str, sort: SortCriterion, page: u32, size: u32) -> Self {
        let search = search_term.trim();
        Self {
            month: first_of_month(month),
            search: (!search.is_empty()).then(|| search.to_owned()),
            sort,
            page,
            size,
        }
    }

    /// Query-string parameters in the order the backend documents them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("yearMonth", format_year_month(first_of_month(self.month)))];
        if let Some(search) = &self.search {
            params.push(("name", search.clone()));
        }
        params.push(("sort", self.sort.as_param()));
        params.push(("page", self.page.to_string()));
        params.push(("size", self.size.to_string()));
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub last: Option<bool>,
    #[serde(default)]
    pub total_elements: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, last: bool) -> Self {
        Self {
            content,
            last: Some(last),
            total_elements: None,
        }
    }

    /// An absent continuation flag means no further pages.
    pub fn is_last(&self) -> bool {
        self.last.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{Expense, ExpenseQuery, Page, SortCriterion, parse_date};
    use crate::{CategoryId, ExpenseId};
    use anyhow::Result;
    use rust_decimal::Decimal;
    use time::{Date, Month};

    #[test]
    fn query_normalizes_month_and_encodes_params() -> Result<()> {
        let query = ExpenseQuery::new(
            Date::from_calendar_date(2024, Month::March, 17)?,
            "  coffee ",
            SortCriterion::NAME_ASC,
            2,
            25,
        );
        assert_eq!(query.month, Date::from_calendar_date(2024, Month::March, 1)?);
        assert_eq!(
            query.to_params(),
            vec![
                ("yearMonth", "2024-03".to_owned()),
                ("name", "coffee".to_owned()),
                ("sort", "name,asc".to_owned()),
                ("page", "2".to_owned()),
                ("size", "25".to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn blank_search_is_omitted() -> Result<()> {
        let query = ExpenseQuery::new(
            Date::from_calendar_date(2024, Month::March, 1)?,
            "   ",
            SortCriterion::default(),
            0,
            10,
        );
        assert_eq!(query.search, None);
        assert!(query.to_params().iter().all(|(key, _)| *key != "name"));
        assert_eq!(query.sort.as_param(), "createdAt,desc");
        Ok(())
    }

    #[test]
    fn sort_criterion_cycles_through_every_order() {
        let mut criterion = SortCriterion::default();
        for _ in 0..SortCriterion::ALL.len() {
            criterion = criterion.next();
        }
        assert_eq!(criterion, SortCriterion::default());
        assert_eq!(SortCriterion::NAME_ASC.next(), SortCriterion::NAME_DESC);
        assert_eq!(SortCriterion::NAME_DESC.as_param(), "name,desc");
    }

    #[test]
    fn expense_decodes_datetime_and_encodes_date_only() -> Result<()> {
        let raw = r#"{
            "id": "e-1",
            "name": "Groceries",
            "amount": 42.5,
            "date": "2024-03-05T18:30:00Z",
            "category": {"id": "c-1", "name": "Food"}
        }"#;
        let expense: Expense = serde_json::from_str(raw)?;
        assert_eq!(expense.id, Some(ExpenseId::new("e-1")));
        assert_eq!(expense.date, Date::from_calendar_date(2024, Month::March, 5)?);
        assert_eq!(expense.amount, Decimal::new(425, 1));
        assert_eq!(
            expense.category.as_ref().map(|category| category.id.clone()),
            Some(CategoryId::new("c-1"))
        );

        let encoded = serde_json::to_value(&expense)?;
        assert_eq!(encoded["date"], "2024-03-05");
        Ok(())
    }

    #[test]
    fn page_without_last_flag_is_last() -> Result<()> {
        let page: Page<Expense> = serde_json::from_str(r#"{"content": []}"#)?;
        assert!(page.is_last());

        let page: Page<Expense> = serde_json::from_str(r#"{"content": [], "last": false}"#)?;
        assert!(!page.is_last());
        Ok(())
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("soon").is_err());
        assert!(parse_date(" 2024-02-29 ").is_ok());
    }
}
