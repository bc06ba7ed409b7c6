use chrono::Utc;
use log::info;

use super::{backend_error, single_row};
use crate::error::{AtelierError, Result};
use crate::models::{ModerationStatus, NewTestimonial, Testimonial};
use crate::schema::{
    convert_rows, format_timestamp, TestimonialInsert, TestimonialModeration, TestimonialRow,
    TESTIMONIALS,
};
use atelier_backend::Backend;

const LOAD_FAILED: &str = "Erreur lors du chargement des témoignages";

#[derive(Clone)]
pub struct TestimonialRepository {
    backend: Backend,
}

impl TestimonialRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Submit a testimonial for moderation.
    ///
    /// The insert always uses the anonymous role and status `pending`, even
    /// while an administrator is signed in on the same client.
    pub async fn submit(&self, testimonial: &NewTestimonial) -> Result<Testimonial> {
        let rows = self
            .backend
            .from_anon(TESTIMONIALS)
            .insert(TestimonialInsert::new(
                &testimonial.name,
                &testimonial.quote,
                Utc::now(),
            ))
            .execute::<TestimonialRow>()
            .await
            .map_err(backend_error("Erreur lors de l'ajout du témoignage"))?;

        let row = rows.into_iter().next().ok_or_else(|| AtelierError::Mapping {
            table: TESTIMONIALS,
            reason: "insert returned no row".to_string(),
        })?;
        let testimonial = Testimonial::try_from(row)?;
        info!("testimonial {} submitted for moderation", testimonial.id);
        Ok(testimonial)
    }

    /// Approved testimonials, newest first
    pub async fn list_approved(&self) -> Result<Vec<Testimonial>> {
        let rows = self
            .backend
            .from(TESTIMONIALS)
            .select("*")
            .eq("status", ModerationStatus::Approved.as_str())
            .order("created_at", false)
            .execute::<TestimonialRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?;
        convert_rows(rows)
    }

    /// Every testimonial regardless of status, newest first
    pub async fn list_all(&self) -> Result<Vec<Testimonial>> {
        let rows = self
            .backend
            .from(TESTIMONIALS)
            .select("*")
            .order("created_at", false)
            .execute::<TestimonialRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?;
        convert_rows(rows)
    }

    pub async fn moderate(&self, id: &str, status: ModerationStatus) -> Result<Testimonial> {
        let rows = self
            .backend
            .from(TESTIMONIALS)
            .update(TestimonialModeration {
                status: status.as_str(),
                updated_at: format_timestamp(Utc::now()),
            })
            .eq("id", id)
            .execute::<TestimonialRow>()
            .await
            .map_err(backend_error("Erreur lors de la mise à jour du témoignage"))?;
        let testimonial = Testimonial::try_from(single_row(rows, "testimonial", id)?)?;
        info!("testimonial {} marked {}", id, status);
        Ok(testimonial)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let rows = self
            .backend
            .from(TESTIMONIALS)
            .delete()
            .eq("id", id)
            .execute::<TestimonialRow>()
            .await
            .map_err(backend_error("Erreur lors de la suppression du témoignage"))?;
        single_row(rows, "testimonial", id)?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        self.backend
            .from(TESTIMONIALS)
            .select("id")
            .count()
            .await
            .map_err(backend_error(LOAD_FAILED))
    }

    pub async fn count_pending(&self) -> Result<u64> {
        self.backend
            .from(TESTIMONIALS)
            .select("id")
            .eq("status", ModerationStatus::Pending.as_str())
            .count()
            .await
            .map_err(backend_error(LOAD_FAILED))
    }
}
