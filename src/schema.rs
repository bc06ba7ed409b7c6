//! Wire contract with the backend
//!
//! Rows arrive with snake_case columns, timestamps as ISO-8601 strings,
//! dates as `YYYY-MM-DD` and times as `HH:MM[:SS]`. This module is the only
//! place that knows column names; repositories convert through it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AtelierError;
use crate::models::{
    Appointment, AppointmentStatus, AppointmentUpdate, Collection, CollectionUpdate, Dimensions,
    GalleryImage, ImageMetadataUpdate, ModerationStatus, NewAppointment, NewCollection,
    Testimonial,
};

pub const APPOINTMENTS: &str = "appointments";
pub const TESTIMONIALS: &str = "testimonials";
pub const GALLERY_IMAGES: &str = "gallery_images";
pub const COLLECTIONS: &str = "collections";

fn mapping(table: &'static str, reason: impl Into<String>) -> AtelierError {
    AtelierError::Mapping {
        table,
        reason: reason.into(),
    }
}

/// Parse a timestamp column; values without an offset are taken as UTC
pub fn parse_timestamp(table: &'static str, value: &str) -> Result<DateTime<Utc>, AtelierError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|_| mapping(table, format!("invalid timestamp {:?}", value)))
}

/// Parse a date column; a full timestamp is cut to its date part
pub fn parse_date(table: &'static str, value: &str) -> Result<NaiveDate, AtelierError> {
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| mapping(table, format!("invalid date {:?}", value)))
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub fn format_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// appointments

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub service: String,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = AtelierError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            appointment_date: parse_date(APPOINTMENTS, &row.appointment_date)?,
            appointment_time: row
                .appointment_time
                .parse()
                .map_err(|e: String| mapping(APPOINTMENTS, e))?,
            service: row.service.parse().map_err(|e: String| mapping(APPOINTMENTS, e))?,
            status: row.status.parse().map_err(|e: String| mapping(APPOINTMENTS, e))?,
            created_at: parse_timestamp(APPOINTMENTS, &row.created_at)?,
            updated_at: parse_timestamp(APPOINTMENTS, &row.updated_at)?,
            notes: row.notes.filter(|n| !n.trim().is_empty()),
            id: row.id,
            client_name: row.client_name,
            client_email: row.client_email,
            client_phone: row.client_phone,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentInsert {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub service: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl AppointmentInsert {
    /// New bookings always start out scheduled
    pub fn new(appointment: &NewAppointment, now: DateTime<Utc>) -> Self {
        let now = format_timestamp(now);
        Self {
            client_name: appointment.client_name.clone(),
            client_email: appointment.client_email.clone(),
            client_phone: appointment.client_phone.clone(),
            appointment_date: format_date(appointment.appointment_date),
            appointment_time: appointment.appointment_time.to_string(),
            service: appointment.service.as_str(),
            status: AppointmentStatus::Scheduled.as_str(),
            notes: appointment.notes.clone(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    /// `Some(None)` clears the notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    pub updated_at: String,
}

impl AppointmentPatch {
    pub fn status(status: AppointmentStatus, now: DateTime<Utc>) -> Self {
        Self {
            status: Some(status.as_str()),
            updated_at: format_timestamp(now),
            ..Default::default()
        }
    }

    pub fn from_update(update: &AppointmentUpdate, now: DateTime<Utc>) -> Self {
        Self {
            appointment_date: update.appointment_date.map(format_date),
            appointment_time: update.appointment_time.map(|slot| slot.to_string()),
            service: update.service.map(|s| s.as_str()),
            status: None,
            notes: update.notes.clone(),
            updated_at: format_timestamp(now),
        }
    }
}

// ---------------------------------------------------------------------------
// testimonials

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestimonialRow {
    pub id: String,
    pub name: String,
    /// Quote text
    pub testimonial: String,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl TryFrom<TestimonialRow> for Testimonial {
    type Error = AtelierError;

    fn try_from(row: TestimonialRow) -> Result<Self, Self::Error> {
        let status: ModerationStatus = row
            .status
            .parse()
            .map_err(|e: String| mapping(TESTIMONIALS, e))?;
        let reviewed_at = match (&status, row.updated_at.as_deref()) {
            (ModerationStatus::Pending, _) | (_, None) => None,
            (_, Some(updated_at)) => Some(parse_timestamp(TESTIMONIALS, updated_at)?),
        };

        Ok(Testimonial {
            submitted_at: parse_timestamp(TESTIMONIALS, &row.created_at)?,
            reviewed_at,
            status,
            id: row.id,
            name: row.name,
            quote: row.testimonial,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestimonialInsert {
    pub name: String,
    pub testimonial: String,
    /// Row-level security only lets the anonymous role insert pending rows
    pub status: &'static str,
    pub created_at: String,
    pub updated_at: String,
}

impl TestimonialInsert {
    pub fn new(name: &str, quote: &str, now: DateTime<Utc>) -> Self {
        let now = format_timestamp(now);
        Self {
            name: name.trim().to_string(),
            testimonial: quote.trim().to_string(),
            status: ModerationStatus::Pending.as_str(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestimonialModeration {
    pub status: &'static str,
    pub updated_at: String,
}

// ---------------------------------------------------------------------------
// gallery_images

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImageRow {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub url: String,
    #[serde(default)]
    pub alt: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub uploaded_at: String,
    #[serde(default)]
    pub uploaded_by: String,
    pub size: i64,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
}

impl TryFrom<GalleryImageRow> for GalleryImage {
    type Error = AtelierError;

    fn try_from(row: GalleryImageRow) -> Result<Self, Self::Error> {
        let non_negative = |field: &str, value: i64| {
            u64::try_from(value).map_err(|_| mapping(GALLERY_IMAGES, format!("negative {}", field)))
        };
        let dimension = |field: &str, value: i64| {
            u32::try_from(value).map_err(|_| mapping(GALLERY_IMAGES, format!("invalid {}", field)))
        };

        Ok(GalleryImage {
            category: row
                .category
                .parse()
                .map_err(|e: String| mapping(GALLERY_IMAGES, e))?,
            uploaded_at: parse_timestamp(GALLERY_IMAGES, &row.uploaded_at)?,
            size: non_negative("size", row.size)?,
            dimensions: Dimensions {
                width: dimension("width", row.width)?,
                height: dimension("height", row.height)?,
            },
            id: row.id,
            filename: row.filename,
            original_name: row.original_name,
            url: row.url,
            alt: row.alt,
            tags: row.tags,
            uploaded_by: row.uploaded_by,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryImageInsert {
    pub filename: String,
    pub original_name: String,
    pub url: String,
    pub alt: String,
    pub category: &'static str,
    pub tags: Vec<String>,
    pub uploaded_at: String,
    pub uploaded_by: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GalleryImagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl From<&ImageMetadataUpdate> for GalleryImagePatch {
    fn from(update: &ImageMetadataUpdate) -> Self {
        Self {
            alt: update.alt.clone(),
            category: update.category.map(|c| c.as_str()),
            tags: update.tags.clone(),
        }
    }
}

/// Size-only projection used to total storage
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSizeRow {
    pub size: i64,
}

// ---------------------------------------------------------------------------
// collections

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

impl TryFrom<CollectionRow> for Collection {
    type Error = AtelierError;

    fn try_from(row: CollectionRow) -> Result<Self, Self::Error> {
        Ok(Collection {
            created_at: parse_timestamp(COLLECTIONS, &row.created_at)?,
            updated_at: parse_timestamp(COLLECTIONS, &row.updated_at)?,
            cover_image: row.cover_image.unwrap_or_default(),
            id: row.id,
            name: row.name,
            description: row.description,
            images: row.images,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionInsert {
    pub name: String,
    pub description: String,
    pub cover_image: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl CollectionInsert {
    pub fn new(collection: &NewCollection, now: DateTime<Utc>) -> Self {
        let now = format_timestamp(now);
        Self {
            name: collection.name.trim().to_string(),
            description: collection.description.trim().to_string(),
            cover_image: collection.cover_image.clone(),
            images: collection.images.clone(),
            is_active: collection.is_active,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub updated_at: String,
}

impl CollectionPatch {
    pub fn new(update: &CollectionUpdate, now: DateTime<Utc>) -> Self {
        Self {
            name: update.name.as_ref().map(|n| n.trim().to_string()),
            description: update.description.as_ref().map(|d| d.trim().to_string()),
            cover_image: update.cover_image.clone(),
            images: update.images.clone(),
            is_active: update.is_active,
            updated_at: format_timestamp(now),
        }
    }
}

/// Convert a batch of rows, failing on the first malformed one
pub fn convert_rows<R, M>(rows: Vec<R>) -> Result<Vec<M>, AtelierError>
where
    M: TryFrom<R, Error = AtelierError>,
{
    rows.into_iter().map(M::try_from).collect()
}
