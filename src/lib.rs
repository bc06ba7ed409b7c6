//! Business logic of a bridal couture atelier's website
//!
//! Appointment booking with slot availability, testimonial submission and
//! moderation, the image gallery and collections, guarded by input
//! sanitizing, validation and rate limiting. Persistence, authentication and
//! file storage are delegated to a hosted backend through
//! [`atelier_backend`].
//!
//! # Example
//!
//! ```no_run
//! use atelier_couture::{Atelier, AtelierConfig};
//! use atelier_couture::booking::{BookingFlow, SystemClock, Clock};
//! use atelier_couture::security::AppointmentForm;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> atelier_couture::Result<()> {
//! let atelier = Atelier::new(AtelierConfig::from_env()?);
//! let date = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
//!
//! let mut flow = BookingFlow::new();
//! let existing = atelier.appointments().list_for_date(date).await?;
//! let slots = flow.choose_date(date, &existing, SystemClock.now())?.to_vec();
//! flow.choose_slot(slots[0])?;
//!
//! let form = AppointmentForm {
//!     client_name: "Léa Dubois".into(),
//!     client_email: "lea@example.com".into(),
//!     client_phone: "06 12 34 56 78".into(),
//!     service: "consultation".into(),
//!     notes: String::new(),
//! };
//! let appointment = atelier.book(&mut flow, &form, "203.0.113.7", &SystemClock).await?;
//! println!("booked {}", appointment.id);
//! # Ok(())
//! # }
//! ```

pub mod booking;
pub mod cms;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod security;

use std::sync::Arc;

use atelier_backend::auth::Session;
use atelier_backend::Backend;
use log::info;

use crate::booking::{BookingFlow, Clock};
use crate::cms::Dashboard;
use crate::models::{Appointment, NewTestimonial, Testimonial};
use crate::repository::{
    AppointmentRepository, CollectionRepository, GalleryRepository, TestimonialRepository,
};
use crate::security::{
    validate_testimonial_form, AppointmentForm, RateLimiter, TestimonialForm,
};

pub use crate::config::AtelierConfig;
pub use crate::error::{AtelierError, Result, SecureError, ValidationErrors};

/// Rate-limit prefix of the booking form
pub const APPOINTMENT_FORM: &str = "appointment";
/// Rate-limit prefix of the testimonial form
pub const TESTIMONIAL_FORM: &str = "testimonial";

/// Limiter key of one visitor on one form, e.g. `appointment:203.0.113.7`
pub fn rate_limit_key(form: &str, visitor: &str) -> String {
    format!("{}:{}", form, visitor)
}

/// Application context: the backend client, the repositories and the
/// form rate limiter
#[derive(Clone)]
pub struct Atelier {
    backend: Backend,
    limiter: Arc<RateLimiter>,
    appointments: AppointmentRepository,
    testimonials: TestimonialRepository,
    gallery: GalleryRepository,
    collections: CollectionRepository,
}

impl Atelier {
    pub fn new(config: AtelierConfig) -> Self {
        let backend = Backend::new_with_options(
            &config.base_url(),
            &config.anon_key,
            config.client_options(),
        );
        Self::with_backend(backend, config)
    }

    /// Build the context over an existing backend client
    pub fn with_backend(backend: Backend, config: AtelierConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            appointments: AppointmentRepository::new(backend.clone()),
            testimonials: TestimonialRepository::new(backend.clone()),
            gallery: GalleryRepository::new(backend.clone(), config.gallery.clone()),
            collections: CollectionRepository::new(backend.clone()),
            backend,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn appointments(&self) -> &AppointmentRepository {
        &self.appointments
    }

    pub fn testimonials(&self) -> &TestimonialRepository {
        &self.testimonials
    }

    pub fn gallery(&self) -> &GalleryRepository {
        &self.gallery
    }

    pub fn collections(&self) -> &CollectionRepository {
        &self.collections
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(
            self.testimonials.clone(),
            self.appointments.clone(),
            self.gallery.clone(),
        )
    }

    /// Submit the booking form of `flow` for `visitor`.
    ///
    /// `visitor` identifies who is submitting (a client address or session
    /// id); each visitor has its own attempt budget.
    pub async fn book(
        &self,
        flow: &mut BookingFlow,
        form: &AppointmentForm,
        visitor: &str,
        clock: &dyn Clock,
    ) -> Result<Appointment> {
        let key = rate_limit_key(APPOINTMENT_FORM, visitor);
        flow.submit(form, &self.appointments, &self.limiter, &key, clock)
            .await
    }

    /// Rate-limit, validate and submit a testimonial for moderation
    pub async fn submit_testimonial(
        &self,
        form: &TestimonialForm,
        visitor: &str,
    ) -> Result<Testimonial> {
        let key = rate_limit_key(TESTIMONIAL_FORM, visitor);
        if !self.limiter.is_allowed(&key) {
            return Err(AtelierError::RateLimited {
                retry_after: self.limiter.remaining_time(&key),
            });
        }
        let testimonial: NewTestimonial = validate_testimonial_form(form)?;
        self.testimonials.submit(&testimonial).await
    }

    /// Sign the administrator in
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .backend
            .auth()
            .sign_in_with_password(email, password)
            .await
            .map_err(|err| match err.status().map(|s| s.as_u16()) {
                Some(400) | Some(401) => AtelierError::Backend(SecureError::new(
                    "Email ou mot de passe incorrect",
                    format!("Sign-in rejected: {}", err),
                    401,
                )),
                _ => repository::backend_error("Erreur lors de la connexion")(err),
            })?;
        info!("administrator signed in");
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.backend
            .auth()
            .sign_out()
            .await
            .map_err(repository::backend_error("Erreur lors de la déconnexion"))
    }

    /// Pick up a session persisted by an earlier run, refreshing it when
    /// it has expired
    pub async fn restore_session(&self) -> Result<Option<Session>> {
        self.backend
            .auth()
            .restore_session()
            .await
            .map_err(repository::backend_error("Erreur lors de la reprise de session"))
    }

    /// The current administrator session; administration operations call
    /// this first
    pub fn require_admin(&self) -> Result<Session> {
        match self.backend.auth().get_session() {
            Some(session) if !session.is_expired() => Ok(session),
            _ => Err(AtelierError::Unauthorized),
        }
    }
}
