//! Gallery images hosted in object storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
    Collection,
    Atelier,
    Hero,
    Testimonials,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 4] = [
        ImageCategory::Collection,
        ImageCategory::Atelier,
        ImageCategory::Hero,
        ImageCategory::Testimonials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCategory::Collection => "collection",
            ImageCategory::Atelier => "atelier",
            ImageCategory::Hero => "hero",
            ImageCategory::Testimonials => "testimonials",
        }
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("unknown image category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImage {
    pub id: String,
    /// Object path inside the gallery bucket
    pub filename: String,
    pub original_name: String,
    /// Public URL of the object
    pub url: String,
    pub alt: String,
    pub category: ImageCategory,
    pub tags: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
    /// Size in bytes
    pub size: u64,
    pub dimensions: Dimensions,
}

/// Metadata supplied with an upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub original_name: String,
    pub content_type: String,
    pub alt: Option<String>,
    pub category: ImageCategory,
    pub tags: Vec<String>,
    pub uploaded_by: String,
}

/// Editable metadata of a stored image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadataUpdate {
    pub alt: Option<String>,
    pub category: Option<ImageCategory>,
    pub tags: Option<Vec<String>>,
}
