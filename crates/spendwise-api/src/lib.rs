// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use spendwise_app::{
    Category, CategoryId, Expense, ExpenseGateway, ExpenseId, ExpenseQuery, GatewayError,
    GatewayResult, Page, SortDirection, format_date,
};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::Network(format!("{} is not a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: Response, what: &str) -> GatewayResult<T> {
        let status = response.status();
        response.json().map_err(|error| GatewayError::Server {
            status: status.as_u16(),
            message: format!("decode {what}: {error}"),
        })
    }
}

impl ExpenseGateway for Client {
    fn list_expenses(&self, query: &ExpenseQuery) -> GatewayResult<Page<Expense>> {
        let url = self.endpoint(&["expenses"])?;
        let params = query.to_params();
        debug!(%url, ?params, "GET expenses");
        let response = self.send(self.http.get(url).query(&params))?;
        Self::decode(response, "expense page")
    }

    fn upsert_expense(&self, expense: &Expense) -> GatewayResult<()> {
        let url = self.endpoint(&["expenses"])?;
        debug!(%url, id = ?expense.id, "PUT expense");
        self.send(self.http.put(url).json(&ExpensePayload::from(expense)))?;
        Ok(())
    }

    fn delete_expense(&self, id: &ExpenseId) -> GatewayResult<()> {
        let url = self.endpoint(&["expenses", id.as_str()])?;
        debug!(%url, "DELETE expense");
        self.send(self.http.delete(url))?;
        Ok(())
    }

    fn list_categories(&self, direction: SortDirection) -> GatewayResult<Vec<Category>> {
        let url = self.endpoint(&["categories"])?;
        let sort = format!("name,{}", direction.as_str());
        debug!(%url, %sort, "GET categories");
        let response = self.send(self.http.get(url).query(&[("sort", sort)]))?;
        let listing: CategoryListing = Self::decode(response, "category list")?;
        Ok(listing.into_categories())
    }
}

/// Write shape of an expense: the category travels as an id only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpensePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a ExpenseId>,
    name: &'a str,
    amount: Decimal,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<&'a CategoryId>,
}

impl<'a> From<&'a Expense> for ExpensePayload<'a> {
    fn from(expense: &'a Expense) -> Self {
        Self {
            id: expense.id.as_ref(),
            name: &expense.name,
            amount: expense.amount,
            date: format_date(expense.date),
            category_id: expense.category.as_ref().map(|category| &category.id),
        }
    }
}

/// Some deployments page the category list, others return a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryListing {
    Plain(Vec<Category>),
    Paged(Page<Category>),
}

impl CategoryListing {
    fn into_categories(self) -> Vec<Category> {
        match self {
            Self::Plain(categories) => categories,
            Self::Paged(page) => page.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

fn connection_error(base_url: &str, error: reqwest::Error) -> GatewayError {
    let cause = if error.is_timeout() {
        "request timed out".to_owned()
    } else {
        error.to_string()
    };
    GatewayError::Network(format!(
        "{base_url} -- check [api].base_url and that the service is running ({cause})"
    ))
}

fn clean_error_response(status: StatusCode, body: &str) -> GatewayError {
    let message = error_message(status, body);
    match status {
        StatusCode::NOT_FOUND => GatewayError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation(message)
        }
        _ => GatewayError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<MessageEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return message;
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return error;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return trimmed.to_owned();
    }

    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("server returned {}", status.as_u16()))
}

/// Checks a configured base URL without building a client.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let url = parse_base_url(raw)?;
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("api.base_url must not be empty");
    }
    let url = Url::parse(trimmed)
        .with_context(|| format!("api.base_url {trimmed:?} is not a valid URL"))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        bail!("api.base_url {trimmed:?} must be an http(s) URL");
    }
    Ok(url)
}
