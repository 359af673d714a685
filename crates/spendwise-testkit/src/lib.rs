// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod memory;

pub use memory::{GatewayOperation, InMemoryGateway};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use spendwise_app::{
    Category, CategoryId, Expense, first_of_month, last_day_of_month, shift_date_by_months,
};
use std::path::PathBuf;
use time::{Date, Month};

const CATEGORY_NAMES: [&str; 8] = [
    "Dining",
    "Entertainment",
    "Groceries",
    "Health",
    "Housing",
    "Transport",
    "Travel",
    "Utilities",
];

const MERCHANTS: [&str; 12] = [
    "Corner",
    "Northside",
    "Harbor",
    "Maple",
    "Summit",
    "Riverside",
    "Central",
    "Oakwood",
    "Lakeview",
    "Union",
    "Parkway",
    "Elm Street",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible categories and expenses.
#[derive(Debug, Clone)]
pub struct ExpenseFaker {
    rng: DeterministicRng,
}

impl ExpenseFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn categories(&self) -> Vec<Category> {
        CATEGORY_NAMES
            .iter()
            .enumerate()
            .map(|(index, name)| Category {
                id: CategoryId::new(format!("c-{}", index + 1)),
                name: (*name).to_owned(),
            })
            .collect()
    }

    /// An unsaved expense dated somewhere in `month`, no later than `until`.
    pub fn expense(&mut self, month: Date, until: Date, categories: &[Category]) -> Expense {
        let month = first_of_month(month);
        let mut max_day = last_day_of_month(month.year(), month.month()).unwrap_or(28);
        if first_of_month(until) == month {
            max_day = max_day.min(until.day());
        }
        let day = 1 + self.int_n(usize::from(max_day)) as u8;
        let date = month.replace_day(day).unwrap_or(month);

        let category = (!categories.is_empty())
            .then(|| categories[self.int_n(categories.len())].clone());
        let name = match &category {
            Some(category) => self.expense_name(&category.name),
            None => format!("{} purchase", self.pick(&MERCHANTS)),
        };

        Expense {
            id: None,
            name,
            amount: self.amount(category.as_ref()),
            date,
            category,
        }
    }

    fn expense_name(&mut self, category_name: &str) -> String {
        let options = expense_names(category_name);
        if options.is_empty() {
            return format!("{} {}", self.pick(&MERCHANTS), category_name.to_lowercase());
        }
        let base = self.pick(options);
        if self.int_n(3) == 0 {
            format!("{base} ({})", self.pick(&MERCHANTS))
        } else {
            base.to_owned()
        }
    }

    fn amount(&mut self, category: Option<&Category>) -> Decimal {
        let (min_cents, max_cents) = match category.map(|category| category.name.as_str()) {
            Some("Housing") => (40_000, 180_000),
            Some("Travel") => (5_000, 90_000),
            Some("Utilities") => (2_000, 25_000),
            Some("Dining") | Some("Entertainment") => (400, 12_000),
            _ => (150, 20_000),
        };
        let cents = min_cents + self.int_n((max_cents - min_cents) as usize) as i64;
        Decimal::new(cents, 2)
    }

    fn pick<'a>(&mut self, options: &'a [&'a str]) -> &'a str {
        if options.is_empty() {
            return "";
        }
        options[self.int_n(options.len())]
    }
}

/// Demo data: the current month and the two before it, in creation order.
pub fn demo_expenses(seed: u64, today: Date) -> Vec<Expense> {
    let mut faker = ExpenseFaker::new(seed);
    let categories = faker.categories();
    let mut expenses = Vec::new();
    for offset in (0..3).rev() {
        let Some(month) = shift_date_by_months(first_of_month(today), -offset)
        else {
            continue;
        };
        let count = 12 + faker.int_n(30);
        for _ in 0..count {
            expenses.push(faker.expense(month, today, &categories));
        }
    }
    expenses
}

pub fn category_names() -> &'static [&'static str] {
    &CATEGORY_NAMES
}

pub fn fixture_date() -> Date {
    Date::from_calendar_date(REFERENCE_YEAR, Month::March, 15).unwrap_or(Date::MIN)
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

fn expense_names(category_name: &str) -> &'static [&'static str] {
    match category_name {
        "Dining" => &["Lunch", "Coffee", "Dinner out", "Bakery", "Takeaway"],
        "Entertainment" => &["Cinema tickets", "Concert", "Streaming plan", "Board game"],
        "Groceries" => &["Weekly groceries", "Farmers market", "Produce", "Pantry restock"],
        "Health" => &["Pharmacy", "Dentist copay", "Gym membership", "Vitamins"],
        "Housing" => &["Rent", "Home insurance", "Furniture", "Repairs"],
        "Transport" => &["Bus pass", "Fuel", "Parking", "Taxi", "Bike repair"],
        "Travel" => &["Train ticket", "Hotel", "Flight", "Car rental"],
        "Utilities" => &["Electricity", "Water bill", "Internet", "Phone plan"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::{ExpenseFaker, category_names, demo_expenses, fixture_date};
    use spendwise_app::first_of_month;
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = ExpenseFaker::new(42);
        let mut right = ExpenseFaker::new(42);
        let categories = left.categories();

        let today = fixture_date();
        assert_eq!(
            left.expense(today, today, &categories),
            right.expense(today, today, &categories)
        );
    }

    #[test]
    fn categories_cover_every_name() {
        let faker = ExpenseFaker::new(1);
        let names: Vec<String> = faker
            .categories()
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, category_names());
    }

    #[test]
    fn expense_stays_inside_month_and_before_until() {
        let mut faker = ExpenseFaker::new(7);
        let categories = faker.categories();
        let today = fixture_date();
        for _ in 0..200 {
            let expense = faker.expense(today, today, &categories);
            assert_eq!(first_of_month(expense.date), first_of_month(today));
            assert!(expense.date <= today);
            assert!(expense.amount.is_sign_positive());
            assert!(!expense.name.is_empty());
            assert!(expense.id.is_none());
        }
    }

    #[test]
    fn expense_without_categories_still_has_a_name() {
        let mut faker = ExpenseFaker::new(9);
        let today = fixture_date();
        let expense = faker.expense(today, today, &[]);
        assert!(expense.category.is_none());
        assert!(expense.name.ends_with("purchase"));
    }

    #[test]
    fn demo_expenses_span_three_months() {
        let expenses = demo_expenses(5, fixture_date());
        let months: BTreeSet<_> = expenses
            .iter()
            .map(|expense| first_of_month(expense.date))
            .collect();
        assert_eq!(months.len(), 3);
        assert!(expenses.iter().all(|expense| expense.date <= fixture_date()));
    }

    #[test]
    fn variety_across_seeds() {
        let today = fixture_date();
        let names: BTreeSet<String> = (0_u64..20)
            .map(|seed| {
                let mut faker = ExpenseFaker::new(seed);
                let categories = faker.categories();
                faker.expense(today, today, &categories).name
            })
            .collect();
        assert!(names.len() > 3);
    }
}
