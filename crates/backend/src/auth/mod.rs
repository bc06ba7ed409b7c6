//! Authentication against the backend's auth service
//!
//! The site only needs password sign-in for the CMS administrator, the
//! resulting session, and sign-out. Account management stays in the backend.

mod session;
mod types;

use log::{info, warn};
use reqwest::Client;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use session::*;
pub use types::*;

/// Client for the backend's auth service
#[derive(Clone)]
pub struct Auth {
    url: String,
    key: String,
    client: Client,
    session: Arc<Mutex<Option<Session>>>,
    options: ClientOptions,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
            options,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn access_token(&self) -> Result<String, Error> {
        match *self.lock() {
            Some(ref session) => Ok(session.access_token.clone()),
            None => Err(Error::auth("Not signed in")),
        }
    }

    fn store(&self, session: Session) -> Result<Session, Error> {
        if let Some(path) = self.options.session_file() {
            session.save(path)?;
        }
        *self.lock() = Some(session.clone());
        Ok(session)
    }

    /// Sign in with email and password
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        let url = self.get_auth_url("/token");

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .query([("grant_type", "password")])
            .timeout(self.options.request_timeout)
            .json(&json!({ "email": email, "password": password }))?
            .execute::<AuthResponse>()
            .await?;

        info!("signed in as {}", response.user.id);
        self.store(Session::from_response(response))
    }

    /// Exchange the refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session, Error> {
        let refresh_token = match *self.lock() {
            Some(ref session) => session.refresh_token.clone(),
            None => return Err(Error::auth("Not signed in")),
        };
        let url = self.get_auth_url("/token");

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .query([("grant_type", "refresh_token")])
            .timeout(self.options.request_timeout)
            .json(&json!({ "refresh_token": refresh_token }))?
            .execute::<AuthResponse>()
            .await?;

        self.store(Session::from_response(response))
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");
        let token = self.access_token()?;

        Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .execute_empty()
            .await?;

        self.clear()?;
        Ok(())
    }

    /// Drop the local session without contacting the backend
    pub fn clear(&self) -> Result<(), Error> {
        *self.lock() = None;
        if let Some(path) = self.options.session_file() {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// Load a persisted session.
    ///
    /// An expired session is exchanged for a fresh one through its refresh
    /// token. When the backend rejects the refresh token the session is
    /// discarded and `None` is returned.
    pub async fn restore_session(&self) -> Result<Option<Session>, Error> {
        let Some(path) = self.options.session_file() else {
            return Ok(None);
        };
        let Some(session) = Session::load(path)? else {
            return Ok(None);
        };

        let expired = session.is_expired();
        *self.lock() = Some(session.clone());
        if !expired {
            return Ok(Some(session));
        }

        match self.refresh_session().await {
            Ok(session) => {
                info!("refreshed expired session for {}", session.user.id);
                Ok(Some(session))
            }
            Err(err @ (Error::Api { .. } | Error::UnparsedApi { .. })) => {
                warn!("persisted session could not be refreshed, discarding it: {}", err);
                self.clear()?;
                Ok(None)
            }
            Err(err) => {
                *self.lock() = None;
                Err(err)
            }
        }
    }

    /// Token for data requests: the access token when signed in, else the anon key
    pub fn bearer_token(&self) -> String {
        match *self.lock() {
            Some(ref session) => session.access_token.clone(),
            None => self.key.clone(),
        }
    }
}
