//! Data access over the backend's tables and storage
//!
//! Repositories convert rows through [`crate::schema`] and turn backend
//! failures into [`SecureError`]s, so callers only ever see [`AtelierError`].

mod appointments;
mod collections;
mod gallery;
mod testimonials;

use crate::error::{AtelierError, SecureError};

pub use appointments::AppointmentRepository;
pub use collections::CollectionRepository;
pub use gallery::{GalleryOptions, GalleryRepository};
pub use testimonials::TestimonialRepository;

/// Map a backend error to a secure error with `fallback` as visitor text
pub(crate) fn backend_error(
    fallback: &'static str,
) -> impl Fn(atelier_backend::Error) -> AtelierError {
    move |err| AtelierError::Backend(SecureError::from_backend(&err, fallback))
}

/// First row of a write that returns its representation
pub(crate) fn single_row<R>(
    rows: Vec<R>,
    entity: &'static str,
    id: &str,
) -> Result<R, AtelierError> {
    rows.into_iter().next().ok_or_else(|| AtelierError::NotFound {
        entity,
        id: id.to_string(),
    })
}
