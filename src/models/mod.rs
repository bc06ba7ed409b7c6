//! Application objects
//!
//! These are transient copies of rows owned by the backend. Their wire shape
//! lives in [`crate::schema`].

mod appointment;
mod collection;
mod gallery;
mod testimonial;

use serde::Serialize;

pub use appointment::*;
pub use collection::*;
pub use gallery::*;
pub use testimonial::*;

/// Figures shown on the CMS dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CmsStats {
    pub total_testimonials: u64,
    pub pending_testimonials: u64,
    pub total_appointments: u64,
    pub upcoming_appointments: u64,
    pub total_images: u64,
    /// Bytes used by gallery images
    pub storage_used: u64,
}
