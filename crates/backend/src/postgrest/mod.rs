//! Database operations through the PostgREST API

mod filter;
mod query;

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub use filter::*;
pub use query::{
    parse_content_range_total, DeleteBuilder, InsertBuilder, QueryBuilder, SelectBuilder,
    UpdateBuilder,
};

use query::TableRequest;

/// Client for database operations on one table
pub struct TableClient {
    request: TableRequest,
}

impl TableClient {
    /// Create a new TableClient
    ///
    /// `token` is sent as the bearer token: the session's access token when
    /// signed in, the anonymous key otherwise.
    pub fn new(
        url: &str,
        key: &str,
        token: &str,
        table: &str,
        client: Client,
        timeout: Option<Duration>,
        schema: &str,
    ) -> Self {
        Self {
            request: TableRequest {
                url: format!("{}/rest/v1/{}", url.trim_end_matches('/'), table),
                key: key.to_string(),
                token: token.to_string(),
                schema: schema.to_string(),
                client,
                timeout,
            },
        }
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.request.clone(), columns)
    }

    /// Insert data into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.request.clone(), values)
    }

    /// Update data in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.request.clone(), values)
    }

    /// Delete data from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.request.clone())
    }
}
