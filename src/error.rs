//! Error handling for the atelier domain
//!
//! Every error carries two texts: the `Display` output is the internal log
//! message, `user_message()` is the French text shown to the visitor.

use chrono::NaiveDate;
use log::error;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::models::{AppointmentStatus, TimeSlot};

/// A backend failure split into what the visitor sees and what gets logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureError {
    pub user_message: String,
    pub log_message: String,
    pub status_code: u16,
}

impl SecureError {
    pub fn new(user_message: &str, log_message: impl Into<String>, status_code: u16) -> Self {
        Self {
            user_message: user_message.to_string(),
            log_message: log_message.into(),
            status_code,
        }
    }

    /// Classify a backend error by the code it reports.
    ///
    /// `fallback` is the visitor message for failures without a specific
    /// mapping, e.g. "Erreur lors de l'ajout du témoignage".
    pub fn from_backend(err: &atelier_backend::Error, fallback: &str) -> Self {
        let backend_message = err.backend_message().unwrap_or_default();
        let secure = match err.code() {
            Some("42501") => SecureError::new(
                "Erreur de sécurité lors de la soumission. Veuillez vérifier que tous les champs sont remplis correctement.",
                format!("RLS policy violation: {}", backend_message),
                403,
            ),
            _ if backend_message.contains("row-level security policy") => SecureError::new(
                "Erreur de sécurité lors de la soumission. Veuillez vérifier que tous les champs sont remplis correctement.",
                format!("RLS policy violation: {}", backend_message),
                403,
            ),
            Some("23502") => SecureError::new(
                "Données manquantes. Veuillez remplir tous les champs requis.",
                format!("Missing required field: {}", backend_message),
                400,
            ),
            Some("23514") => SecureError::new(
                "Les données ne respectent pas les critères requis. Vérifiez la longueur de vos textes.",
                format!("Check constraint violation: {}", backend_message),
                400,
            ),
            Some("23505") => SecureError::new(
                "Cet élément existe déjà.",
                format!("Unique violation: {}", backend_message),
                409,
            ),
            Some("PGRST116") => SecureError::new(
                "Élément introuvable.",
                format!("No rows returned: {}", backend_message),
                404,
            ),
            _ if err.status().map(|s| s.as_u16()) == Some(401) => SecureError::new(
                "Votre session a expiré. Veuillez vous reconnecter.",
                format!("Unauthorized: {}", err),
                401,
            ),
            _ => SecureError::new(fallback, format!("Backend error: {}", err), 500),
        };

        error!("{}", secure.log_message);
        secure
    }
}

impl fmt::Display for SecureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.log_message)
    }
}

impl std::error::Error for SecureError {}

/// Per-field validation messages, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field; the first message per field wins
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.errors.push((field, message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(value)` when nothing was recorded
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Unified error type for the atelier domain
#[derive(Error, Debug)]
pub enum AtelierError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Rate limit exceeded, retry in {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Slot {slot} on {date} is not available")]
    SlotUnavailable { date: NaiveDate, slot: TimeSlot },

    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Booking flow is not at the {expected} step")]
    InvalidStep { expected: &'static str },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Administrator session required")]
    Unauthorized,

    #[error("Upload rejected: {0}")]
    Upload(String),

    #[error("Malformed {table} row: {reason}")]
    Mapping { table: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Backend(#[from] SecureError),
}

impl AtelierError {
    /// Text to show the visitor
    pub fn user_message(&self) -> String {
        match self {
            AtelierError::Validation(_) => {
                "Veuillez corriger les champs indiqués.".to_string()
            }
            AtelierError::RateLimited { retry_after } => {
                let minutes = retry_after.as_secs().div_ceil(60).max(1);
                format!(
                    "Trop de tentatives. Veuillez réessayer dans {} minute{}.",
                    minutes,
                    if minutes > 1 { "s" } else { "" }
                )
            }
            AtelierError::SlotUnavailable { .. } => {
                "Ce créneau n'est plus disponible. Veuillez en choisir un autre.".to_string()
            }
            AtelierError::InvalidTransition { .. } => {
                "Ce changement de statut n'est pas autorisé.".to_string()
            }
            AtelierError::InvalidStep { .. } => {
                "Veuillez reprendre la réservation depuis le début.".to_string()
            }
            AtelierError::NotFound { .. } => "Élément introuvable.".to_string(),
            AtelierError::Unauthorized => {
                "Veuillez vous connecter pour accéder à l'espace d'administration.".to_string()
            }
            AtelierError::Upload(message) => message.clone(),
            AtelierError::Mapping { .. } | AtelierError::Config(_) => {
                "Une erreur inattendue s'est produite. Veuillez réessayer.".to_string()
            }
            AtelierError::Backend(secure) => secure.user_message.clone(),
        }
    }

    /// HTTP-style status code
    pub fn status_code(&self) -> u16 {
        match self {
            AtelierError::Validation(_) | AtelierError::Upload(_) => 400,
            AtelierError::Unauthorized => 401,
            AtelierError::NotFound { .. } => 404,
            AtelierError::SlotUnavailable { .. }
            | AtelierError::InvalidTransition { .. }
            | AtelierError::InvalidStep { .. } => 409,
            AtelierError::RateLimited { .. } => 429,
            AtelierError::Mapping { .. } | AtelierError::Config(_) => 500,
            AtelierError::Backend(secure) => secure.status_code,
        }
    }

    /// Per-field messages, when this is a validation failure
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AtelierError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for AtelierError {
    fn from(errors: ValidationErrors) -> Self {
        AtelierError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, AtelierError>;
