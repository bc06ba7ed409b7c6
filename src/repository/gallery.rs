use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use super::{backend_error, single_row};
use crate::error::{AtelierError, Result};
use crate::models::{GalleryImage, ImageCategory, ImageMetadataUpdate, ImageUpload};
use crate::schema::{
    convert_rows, format_timestamp, GalleryImageInsert, GalleryImagePatch, GalleryImageRow,
    ImageSizeRow, GALLERY_IMAGES,
};
use atelier_backend::storage::FileOptions;
use atelier_backend::Backend;

const LOAD_FAILED: &str = "Erreur lors du chargement de la galerie";
const UPLOAD_FAILED: &str = "Erreur lors du téléchargement de l'image";

pub const DEFAULT_BUCKET: &str = "gallery";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GalleryOptions {
    pub bucket: String,
    pub max_upload_bytes: u64,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Clone)]
pub struct GalleryRepository {
    backend: Backend,
    options: GalleryOptions,
}

/// Storage object name: a fresh UUID keeping the original extension
fn object_name(original_name: &str, content_type: &str) -> String {
    let extension = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .or_else(|| content_type.strip_prefix("image/"))
        .unwrap_or("img")
        .to_ascii_lowercase();
    format!("{}.{}", Uuid::new_v4(), extension)
}

fn default_alt(original_name: &str) -> String {
    original_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(original_name)
        .to_string()
}

impl GalleryRepository {
    pub fn new(backend: Backend, options: GalleryOptions) -> Self {
        Self { backend, options }
    }

    /// Images, newest first, optionally limited to one category
    pub async fn list(&self, category: Option<ImageCategory>) -> Result<Vec<GalleryImage>> {
        let mut query = self
            .backend
            .from(GALLERY_IMAGES)
            .select("*")
            .order("uploaded_at", false);
        if let Some(category) = category {
            query = query.eq("category", category.as_str());
        }
        let rows = query
            .execute::<GalleryImageRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?;
        convert_rows(rows)
    }

    /// Reject anything that is not a readable image within the size limit,
    /// returning its pixel dimensions
    pub fn check_upload(&self, data: &[u8], upload: &ImageUpload) -> Result<(u32, u32)> {
        if !upload.content_type.starts_with("image/") {
            return Err(AtelierError::Upload(format!(
                "{} n'est pas une image valide",
                upload.original_name
            )));
        }
        if data.len() as u64 > self.options.max_upload_bytes {
            return Err(AtelierError::Upload(format!(
                "{} est trop volumineux (max {}MB)",
                upload.original_name,
                self.options.max_upload_bytes / (1024 * 1024)
            )));
        }

        let size = imagesize::blob_size(data).map_err(|err| {
            warn!("could not read dimensions of {}: {}", upload.original_name, err);
            AtelierError::Upload(format!(
                "{} n'a pas pu être lu comme une image",
                upload.original_name
            ))
        })?;
        let width = u32::try_from(size.width).unwrap_or(u32::MAX);
        let height = u32::try_from(size.height).unwrap_or(u32::MAX);
        Ok((width, height))
    }

    /// Upload an image to the bucket and record it.
    ///
    /// When the row cannot be inserted the stored object is removed again.
    pub async fn upload(&self, data: Vec<u8>, upload: &ImageUpload) -> Result<GalleryImage> {
        let (width, height) = self.check_upload(&data, upload)?;
        let size = data.len() as u64;
        let filename = object_name(&upload.original_name, &upload.content_type);

        let storage = self.backend.storage();
        let bucket = storage.from(&self.options.bucket);
        bucket
            .upload(
                &filename,
                data,
                FileOptions {
                    content_type: Some(upload.content_type.clone()),
                    ..Default::default()
                },
            )
            .await
            .map_err(backend_error(UPLOAD_FAILED))?;

        let insert = GalleryImageInsert {
            filename: filename.clone(),
            original_name: upload.original_name.clone(),
            url: bucket.get_public_url(&filename),
            alt: upload
                .alt
                .clone()
                .filter(|alt| !alt.trim().is_empty())
                .unwrap_or_else(|| default_alt(&upload.original_name)),
            category: upload.category.as_str(),
            tags: upload.tags.clone(),
            uploaded_at: format_timestamp(Utc::now()),
            uploaded_by: upload.uploaded_by.clone(),
            size,
            width,
            height,
        };

        let inserted = self
            .backend
            .from(GALLERY_IMAGES)
            .insert(insert)
            .execute::<GalleryImageRow>()
            .await;

        let rows = match inserted {
            Ok(rows) => rows,
            Err(err) => {
                warn!("recording {} failed, removing the stored object", filename);
                if let Err(remove_err) = bucket.remove(&[filename.as_str()]).await {
                    warn!("could not remove orphaned object {}: {}", filename, remove_err);
                }
                return Err(backend_error(UPLOAD_FAILED)(err));
            }
        };

        let row = rows.into_iter().next().ok_or_else(|| AtelierError::Mapping {
            table: GALLERY_IMAGES,
            reason: "insert returned no row".to_string(),
        })?;
        let image = GalleryImage::try_from(row)?;
        info!(
            "uploaded {} as {} ({}x{}, {} bytes)",
            image.original_name, image.filename, width, height, size
        );
        Ok(image)
    }

    pub async fn update_metadata(
        &self,
        id: &str,
        update: &ImageMetadataUpdate,
    ) -> Result<GalleryImage> {
        let rows = self
            .backend
            .from(GALLERY_IMAGES)
            .update(GalleryImagePatch::from(update))
            .eq("id", id)
            .execute::<GalleryImageRow>()
            .await
            .map_err(backend_error("Erreur lors de la mise à jour de l'image"))?;
        GalleryImage::try_from(single_row(rows, "image", id)?)
    }

    /// Delete the row, then its stored object
    pub async fn delete(&self, id: &str) -> Result<()> {
        let rows = self
            .backend
            .from(GALLERY_IMAGES)
            .delete()
            .eq("id", id)
            .execute::<GalleryImageRow>()
            .await
            .map_err(backend_error("Erreur lors de la suppression de l'image"))?;
        let row = single_row(rows, "image", id)?;

        let storage = self.backend.storage();
        if let Err(err) = storage
            .from(&self.options.bucket)
            .remove(&[row.filename.as_str()])
            .await
        {
            warn!("image {} deleted but object {} remains: {}", id, row.filename, err);
        }
        info!("deleted image {}", id);
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        self.backend
            .from(GALLERY_IMAGES)
            .select("id")
            .count()
            .await
            .map_err(backend_error(LOAD_FAILED))
    }

    /// Total bytes of all recorded images
    pub async fn storage_used(&self) -> Result<u64> {
        let rows = self
            .backend
            .from(GALLERY_IMAGES)
            .select("size")
            .execute::<ImageSizeRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?;
        Ok(rows
            .iter()
            .map(|row| u64::try_from(row.size).unwrap_or(0))
            .sum())
    }
}
