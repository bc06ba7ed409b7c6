//! Form validation for the public booking and testimonial forms
//!
//! Every free-text field goes through [`sanitize_input`] first; the rules
//! then apply to the sanitized text, and that is what gets stored.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use super::sanitize::sanitize_input;
use crate::error::ValidationErrors;
use crate::models::{NewAppointment, NewTestimonial, ServiceKind, TimeSlot};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PHONE_MAX_CHARS: usize = 20;
pub const QUOTE_MIN_CHARS: usize = 10;
pub const QUOTE_MAX_CHARS: usize = 1000;
pub const NOTES_MAX_CHARS: usize = 500;

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-ZÀ-ÿ\s\-'.]+$").expect("invalid name pattern")
});

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern"));

/// Optional leading `+`, then 8 to 20 digits, spaces, dashes or parentheses
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]{8,20}$").expect("invalid phone pattern"));

/// Raw booking form input, as typed by the visitor
#[derive(Debug, Clone, Default)]
pub struct AppointmentForm {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service: String,
    pub notes: String,
}

/// Raw testimonial form input
#[derive(Debug, Clone, Default)]
pub struct TestimonialForm {
    pub name: String,
    pub quote: String,
}

/// Sanitized and validated booking details, without the chosen date and slot
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDetails {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service: ServiceKind,
    pub notes: Option<String>,
}

impl AppointmentDetails {
    pub fn into_new_appointment(self, date: NaiveDate, slot: TimeSlot) -> NewAppointment {
        NewAppointment {
            client_name: self.client_name,
            client_email: self.client_email,
            client_phone: self.client_phone,
            appointment_date: date,
            appointment_time: slot,
            service: self.service,
            notes: self.notes,
        }
    }
}

/// Check a personal name, recording at most one message under `field`
pub fn check_name(errors: &mut ValidationErrors, field: &'static str, name: &str) {
    let len = name.chars().count();
    if len < NAME_MIN_CHARS {
        errors.add(field, "Le nom doit contenir au moins 2 caractères");
    } else if len > NAME_MAX_CHARS {
        errors.add(field, "Le nom ne peut pas dépasser 100 caractères");
    } else if !NAME.is_match(name) {
        errors.add(field, "Le nom contient des caractères non autorisés");
    }
}

/// `local@domain.tld` shape, no whitespace, a single `@`, bounded length and
/// no angle brackets
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= EMAIL_MAX_CHARS
        && !email.contains(['<', '>'])
        && EMAIL.is_match(email)
}

pub fn check_email(errors: &mut ValidationErrors, field: &'static str, email: &str) {
    if email.chars().count() > EMAIL_MAX_CHARS {
        errors.add(field, "L'email ne peut pas dépasser 255 caractères");
    } else if !is_valid_email(email) {
        errors.add(field, "Format d'email invalide");
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

pub fn check_phone(errors: &mut ValidationErrors, field: &'static str, phone: &str) {
    if !is_valid_phone(phone) {
        errors.add(field, "Format de téléphone invalide");
    } else if phone.chars().count() > PHONE_MAX_CHARS {
        errors.add(
            field,
            "Le numéro de téléphone ne peut pas dépasser 20 caractères",
        );
    }
}

/// Validate the booking form, returning the sanitized details.
///
/// All fields are checked so the visitor sees every problem at once.
pub fn validate_appointment_form(
    form: &AppointmentForm,
) -> Result<AppointmentDetails, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let client_name = sanitize_input(&form.client_name);
    let client_email = sanitize_input(&form.client_email);
    let client_phone = sanitize_input(&form.client_phone);
    let notes = sanitize_input(&form.notes);

    check_name(&mut errors, "client_name", &client_name);
    check_email(&mut errors, "client_email", &client_email);
    check_phone(&mut errors, "client_phone", &client_phone);

    let service = match form.service.trim().parse::<ServiceKind>() {
        Ok(service) => Some(service),
        Err(_) => {
            errors.add("service", "Veuillez choisir un service");
            None
        }
    };

    if notes.chars().count() > NOTES_MAX_CHARS {
        errors.add("notes", "Les notes ne peuvent pas dépasser 500 caractères");
    }

    match service {
        Some(service) if errors.is_empty() => Ok(AppointmentDetails {
            client_name,
            client_email,
            client_phone,
            service,
            notes: if notes.is_empty() { None } else { Some(notes) },
        }),
        _ => Err(errors),
    }
}

/// Validate the testimonial form, returning the sanitized submission
pub fn validate_testimonial_form(form: &TestimonialForm) -> Result<NewTestimonial, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = sanitize_input(&form.name);
    let quote = sanitize_input(&form.quote);

    check_name(&mut errors, "name", &name);

    let quote_len = quote.chars().count();
    if quote_len < QUOTE_MIN_CHARS {
        errors.add("quote", "Le témoignage doit contenir au moins 10 caractères");
    } else if quote_len > QUOTE_MAX_CHARS {
        errors.add("quote", "Le témoignage ne peut pas dépasser 1000 caractères");
    }

    errors.into_result(NewTestimonial { name, quote })
}
