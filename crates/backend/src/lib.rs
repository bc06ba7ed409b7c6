//! REST client for the hosted backend behind the atelier site
//!
//! Covers the three services the site uses: the PostgREST database API,
//! password authentication for the CMS, and object storage for gallery
//! images.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod postgrest;
pub mod storage;

use reqwest::Client;

use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::postgrest::TableClient;
use crate::storage::StorageClient;

pub use crate::error::Error;

/// The main entry point for the backend client
#[derive(Clone)]
pub struct Backend {
    /// The base URL for the project
    pub url: String,
    /// The anonymous API key for the project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client, holding the CMS session when signed in
    pub auth: Auth,
    /// Client options
    pub options: ClientOptions,
}

impl Backend {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use atelier_backend::Backend;
    ///
    /// let backend = Backend::new("https://your-project.supabase.co", "your-anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new client with custom options
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let http_client = Client::new();
        let auth = Auth::new(url, key, http_client.clone(), options.clone());

        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            auth,
            options,
        }
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Create a client for database operations on a table, authenticated
    /// with the current session if there is one
    pub fn from(&self, table: &str) -> TableClient {
        TableClient::new(
            &self.url,
            &self.key,
            &self.auth.bearer_token(),
            table,
            self.http_client.clone(),
            self.options.request_timeout,
            &self.options.db_schema,
        )
    }

    /// Create a client for a table that always uses the anonymous role,
    /// even while the CMS session is active
    pub fn from_anon(&self, table: &str) -> TableClient {
        TableClient::new(
            &self.url,
            &self.key,
            &self.key,
            table,
            self.http_client.clone(),
            self.options.request_timeout,
            &self.options.db_schema,
        )
    }

    /// Get a storage client, authenticated with the current session if any
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(
            &self.url,
            &self.key,
            &self.auth.bearer_token(),
            self.http_client.clone(),
            self.options.request_timeout,
        )
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::Backend;
}
