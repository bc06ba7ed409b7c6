//! Query builders for the table client

use log::debug;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};
use crate::postgrest::filter::FilterOperator;

/// Everything a request against one table needs
#[derive(Debug, Clone)]
pub(crate) struct TableRequest {
    pub(crate) url: String,
    pub(crate) key: String,
    pub(crate) token: String,
    pub(crate) schema: String,
    pub(crate) client: Client,
    pub(crate) timeout: Option<Duration>,
}

impl TableRequest {
    fn prepare<'a>(&'a self, fetch: FetchBuilder<'a>, write: bool) -> FetchBuilder<'a> {
        let mut fetch = fetch
            .header("apikey", &self.key)
            .bearer_auth(&self.token)
            .timeout(self.timeout);

        if self.schema != "public" {
            let profile = if write { "Content-Profile" } else { "Accept-Profile" };
            fetch = fetch.header(profile, &self.schema);
        }

        fetch
    }
}

/// Accumulated query parameters
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the query
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Replace a parameter, used for keys that may appear only once
    pub fn set_param(&mut self, key: &str, value: &str) {
        self.params.retain(|(k, _)| k != key);
        self.add_param(key, value);
    }

    /// Add a filter on a column
    pub fn add_filter(&mut self, column: &str, operator: FilterOperator, value: &str) {
        self.add_param(column, &operator.render(value));
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    request: TableRequest,
    query: QueryBuilder,
}

impl SelectBuilder {
    pub(crate) fn new(request: TableRequest, columns: &str) -> Self {
        let mut query = QueryBuilder::new();
        query.set_param("select", columns);

        Self { request, query }
    }

    /// Filter rows with an explicit operator
    pub fn filter<T: ToString>(mut self, column: &str, operator: FilterOperator, value: T) -> Self {
        self.query.add_filter(column, operator, &value.to_string());
        self
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Eq, value)
    }

    /// Filter rows where column does not equal a value
    pub fn neq<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Neq, value)
    }

    /// Filter rows where column is greater than or equal to a value
    pub fn gte<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Gte, value)
    }

    /// Filter rows where column is less than or equal to a value
    pub fn lte<T: ToString>(self, column: &str, value: T) -> Self {
        self.filter(column, FilterOperator::Lte, value)
    }

    /// Filter rows where column is in a list of values
    pub fn in_list<T: ToString>(self, column: &str, values: &[T]) -> Self {
        let values_str: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.filter(column, FilterOperator::In, values_str.join(","))
    }

    /// Order the results by a column; repeated calls add secondary keys
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        let term = format!("{}.{}", column, direction);
        let existing = self
            .query
            .get_params()
            .iter()
            .find(|(k, _)| k == "order")
            .map(|(_, v)| v.clone());
        let value = match existing {
            Some(existing) => format!("{},{}", existing, term),
            None => term,
        };
        self.query.set_param("order", &value);
        self
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, count: usize) -> Self {
        self.query.set_param("limit", &count.to_string());
        self
    }

    /// Query parameters accumulated so far
    pub fn params(&self) -> &[(String, String)] {
        self.query.get_params()
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let fetch = Fetch::get(&self.request.client, &self.request.url);
        let result = self
            .request
            .prepare(fetch, false)
            .query(self.query.get_params().iter().cloned())
            .execute::<Vec<T>>()
            .await?;
        Ok(result)
    }

    /// Execute the query and return the first row
    pub async fn execute_one<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        let results = self.limit(1).execute::<T>().await?;
        Ok(results.into_iter().next())
    }

    /// Count the matching rows without transferring them
    pub async fn count(mut self) -> Result<u64, Error> {
        self.query.set_param("limit", "0");
        let fetch = Fetch::get(&self.request.client, &self.request.url);
        let response = self
            .request
            .prepare(fetch, false)
            .header("Prefer", "count=exact")
            .query(self.query.get_params().iter().cloned())
            .execute_checked()
            .await?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::general("Missing Content-Range header in count response"))?;

        parse_content_range_total(range)
            .ok_or_else(|| Error::general(format!("Unexpected Content-Range header: {}", range)))
    }
}

/// Extract the total from a `Content-Range` header such as `0-9/42` or `*/0`
pub fn parse_content_range_total(range: &str) -> Option<u64> {
    let (_, total) = range.split_once('/')?;
    total.trim().parse().ok()
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    request: TableRequest,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(request: TableRequest, values: T) -> Self {
        Self { request, values }
    }

    /// Execute the insert and return the inserted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = Fetch::post(&self.request.client, &self.request.url);
        let result = self
            .request
            .prepare(fetch, true)
            .header("Prefer", "return=representation")
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await?;
        debug!("inserted {} row(s) into {}", result.len(), self.request.url);
        Ok(result)
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    request: TableRequest,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(request: TableRequest, values: T) -> Self {
        Self {
            request,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        self.query
            .add_filter(column, FilterOperator::Eq, &value.to_string());
        self
    }

    /// Execute the update and return the updated rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        if self.query.get_params().is_empty() {
            return Err(Error::general("Refusing to update without a filter"));
        }

        let fetch = Fetch::patch(&self.request.client, &self.request.url);
        let result = self
            .request
            .prepare(fetch, true)
            .header("Prefer", "return=representation")
            .query(self.query.get_params().iter().cloned())
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await?;
        Ok(result)
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    request: TableRequest,
    query: QueryBuilder,
}

impl DeleteBuilder {
    pub(crate) fn new(request: TableRequest) -> Self {
        Self {
            request,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        self.query
            .add_filter(column, FilterOperator::Eq, &value.to_string());
        self
    }

    /// Execute the delete and return the deleted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        if self.query.get_params().is_empty() {
            return Err(Error::general("Refusing to delete without a filter"));
        }

        let fetch = Fetch::delete(&self.request.client, &self.request.url);
        let result = self
            .request
            .prepare(fetch, true)
            .header("Prefer", "return=representation")
            .query(self.query.get_params().iter().cloned())
            .execute::<Vec<R>>()
            .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_order_accumulates_keys() {
        let request = TableRequest {
            url: "http://localhost/rest/v1/appointments".to_string(),
            key: "anon".to_string(),
            token: "anon".to_string(),
            schema: "public".to_string(),
            client: Client::new(),
            timeout: None,
        };
        let builder = SelectBuilder::new(request, "*")
            .order("appointment_date", true)
            .order("appointment_time", true)
            .eq("status", "confirmed");

        let params = builder.params();
        assert!(params.contains(&(
            "order".to_string(),
            "appointment_date.asc,appointment_time.asc".to_string()
        )));
        assert!(params.contains(&("status".to_string(), "eq.confirmed".to_string())));
        assert!(params.contains(&("select".to_string(), "*".to_string())));
    }
}
