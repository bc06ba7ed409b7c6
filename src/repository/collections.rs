use chrono::Utc;
use log::info;

use super::{backend_error, single_row};
use crate::error::{AtelierError, Result, ValidationErrors};
use crate::models::{Collection, CollectionUpdate, NewCollection};
use crate::schema::{
    convert_rows, CollectionInsert, CollectionPatch, CollectionRow, COLLECTIONS,
};
use atelier_backend::Backend;

const LOAD_FAILED: &str = "Erreur lors du chargement des collections";
const SAVE_FAILED: &str = "Erreur lors de l'enregistrement de la collection";

fn check_required(errors: &mut ValidationErrors, name: Option<&str>, description: Option<&str>) {
    if name.is_some_and(|n| n.trim().is_empty()) {
        errors.add("name", "Le nom de la collection est requis");
    }
    if description.is_some_and(|d| d.trim().is_empty()) {
        errors.add("description", "La description est requise");
    }
}

#[derive(Clone)]
pub struct CollectionRepository {
    backend: Backend,
}

impl CollectionRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// All collections, newest first
    pub async fn list(&self) -> Result<Vec<Collection>> {
        let rows = self
            .backend
            .from(COLLECTIONS)
            .select("*")
            .order("created_at", false)
            .execute::<CollectionRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?;
        convert_rows(rows)
    }

    /// Collections shown on the public site
    pub async fn list_active(&self) -> Result<Vec<Collection>> {
        let rows = self
            .backend
            .from(COLLECTIONS)
            .select("*")
            .eq("is_active", true)
            .order("created_at", false)
            .execute::<CollectionRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?;
        convert_rows(rows)
    }

    pub async fn get(&self, id: &str) -> Result<Collection> {
        let row = self
            .backend
            .from(COLLECTIONS)
            .select("*")
            .eq("id", id)
            .execute_one::<CollectionRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?
            .ok_or_else(|| AtelierError::NotFound {
                entity: "collection",
                id: id.to_string(),
            })?;
        Collection::try_from(row)
    }

    pub async fn create(&self, collection: &NewCollection) -> Result<Collection> {
        let mut errors = ValidationErrors::new();
        check_required(
            &mut errors,
            Some(&collection.name),
            Some(&collection.description),
        );
        errors.into_result(())?;

        let rows = self
            .backend
            .from(COLLECTIONS)
            .insert(CollectionInsert::new(collection, Utc::now()))
            .execute::<CollectionRow>()
            .await
            .map_err(backend_error(SAVE_FAILED))?;
        let row = rows.into_iter().next().ok_or_else(|| AtelierError::Mapping {
            table: COLLECTIONS,
            reason: "insert returned no row".to_string(),
        })?;
        let created = Collection::try_from(row)?;
        info!("created collection {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: &str, update: &CollectionUpdate) -> Result<Collection> {
        let mut errors = ValidationErrors::new();
        check_required(
            &mut errors,
            update.name.as_deref(),
            update.description.as_deref(),
        );
        errors.into_result(())?;

        let rows = self
            .backend
            .from(COLLECTIONS)
            .update(CollectionPatch::new(update, Utc::now()))
            .eq("id", id)
            .execute::<CollectionRow>()
            .await
            .map_err(backend_error(SAVE_FAILED))?;
        Collection::try_from(single_row(rows, "collection", id)?)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let rows = self
            .backend
            .from(COLLECTIONS)
            .delete()
            .eq("id", id)
            .execute::<CollectionRow>()
            .await
            .map_err(backend_error("Erreur lors de la suppression de la collection"))?;
        single_row(rows, "collection", id)?;
        info!("deleted collection {}", id);
        Ok(())
    }
}
