//! Input hygiene for the public forms: sanitizing, validation and rate limiting

pub mod rate_limit;
pub mod sanitize;
pub mod validate;

pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use sanitize::sanitize_input;
pub use validate::{
    validate_appointment_form, validate_testimonial_form, AppointmentDetails, AppointmentForm,
    TestimonialForm,
};
