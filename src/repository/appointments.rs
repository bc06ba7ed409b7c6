use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{info, warn};

use super::{backend_error, single_row};
use crate::booking::{all_slots, AppointmentStore};
use crate::error::{AtelierError, Result, SecureError, ValidationErrors};
use crate::models::{Appointment, AppointmentStatus, AppointmentUpdate, NewAppointment};
use crate::schema::{
    convert_rows, format_date, AppointmentInsert, AppointmentPatch, AppointmentRow, APPOINTMENTS,
};
use atelier_backend::Backend;

const LOAD_FAILED: &str = "Erreur lors du chargement des rendez-vous";
const SAVE_FAILED: &str = "Erreur lors de l'enregistrement du rendez-vous";

fn active_statuses() -> Vec<&'static str> {
    AppointmentStatus::ACTIVE.iter().map(|s| s.as_str()).collect()
}

#[derive(Clone)]
pub struct AppointmentRepository {
    backend: Backend,
}

impl AppointmentRepository {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Store a new booking as `scheduled`.
    ///
    /// A unique-constraint conflict on the slot is reported as
    /// [`AtelierError::SlotUnavailable`].
    pub async fn create(&self, appointment: &NewAppointment) -> Result<Appointment> {
        let rows = self
            .backend
            .from(APPOINTMENTS)
            .insert(AppointmentInsert::new(appointment, Utc::now()))
            .execute::<AppointmentRow>()
            .await
            .map_err(|err| {
                if err.code() == Some("23505") {
                    warn!(
                        "slot {} on {} already booked: {}",
                        appointment.appointment_time, appointment.appointment_date, err
                    );
                    AtelierError::SlotUnavailable {
                        date: appointment.appointment_date,
                        slot: appointment.appointment_time,
                    }
                } else {
                    AtelierError::Backend(SecureError::from_backend(&err, SAVE_FAILED))
                }
            })?;

        let row = rows.into_iter().next().ok_or_else(|| AtelierError::Mapping {
            table: APPOINTMENTS,
            reason: "insert returned no row".to_string(),
        })?;
        let appointment = Appointment::try_from(row)?;
        info!("created appointment {}", appointment.id);
        Ok(appointment)
    }

    /// Every appointment, by date then time
    pub async fn list(&self) -> Result<Vec<Appointment>> {
        let rows = self
            .backend
            .from(APPOINTMENTS)
            .select("*")
            .order("appointment_date", true)
            .order("appointment_time", true)
            .execute::<AppointmentRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?;
        convert_rows(rows)
    }

    /// Appointments on `date` that hold their slot
    pub async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        let rows = self
            .backend
            .from(APPOINTMENTS)
            .select("*")
            .eq("appointment_date", format_date(date))
            .in_list("status", &active_statuses())
            .order("appointment_time", true)
            .execute::<AppointmentRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?;
        convert_rows(rows)
    }

    pub async fn get(&self, id: &str) -> Result<Appointment> {
        let row = self
            .backend
            .from(APPOINTMENTS)
            .select("*")
            .eq("id", id)
            .execute_one::<AppointmentRow>()
            .await
            .map_err(backend_error(LOAD_FAILED))?
            .ok_or_else(|| AtelierError::NotFound {
                entity: "appointment",
                id: id.to_string(),
            })?;
        Appointment::try_from(row)
    }

    /// Move an appointment along its lifecycle
    pub async fn update_status(&self, id: &str, status: AppointmentStatus) -> Result<Appointment> {
        let current = self.get(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(AtelierError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let rows = self
            .backend
            .from(APPOINTMENTS)
            .update(AppointmentPatch::status(status, Utc::now()))
            .eq("id", id)
            .execute::<AppointmentRow>()
            .await
            .map_err(backend_error(SAVE_FAILED))?;
        let updated = Appointment::try_from(single_row(rows, "appointment", id)?)?;
        info!(
            "appointment {} moved from {} to {}",
            id, current.status, updated.status
        );
        Ok(updated)
    }

    /// Change date, time, service or notes.
    ///
    /// A new time must be one of the opening slots and a new date cannot be
    /// before `today`. Moving an active appointment checks that the target
    /// slot is free.
    pub async fn update(
        &self,
        id: &str,
        update: &AppointmentUpdate,
        today: NaiveDate,
    ) -> Result<Appointment> {
        let mut errors = ValidationErrors::new();
        if update.appointment_date.is_some_and(|date| date < today) {
            errors.add("appointment_date", "La date ne peut pas être dans le passé");
        }
        if update
            .appointment_time
            .is_some_and(|slot| !all_slots().contains(&slot))
        {
            errors.add(
                "appointment_time",
                "Ce créneau ne fait pas partie des horaires d'ouverture",
            );
        }
        errors.into_result(())?;

        if update.appointment_date.is_some() || update.appointment_time.is_some() {
            let current = self.get(id).await?;
            let date = update.appointment_date.unwrap_or(current.appointment_date);
            let slot = update.appointment_time.unwrap_or(current.appointment_time);
            if current.status.occupies_slot() {
                let taken = self
                    .list_for_date(date)
                    .await?
                    .iter()
                    .any(|other| other.id != id && other.occupies(date, slot));
                if taken {
                    return Err(AtelierError::SlotUnavailable { date, slot });
                }
            }
        }

        let rows = self
            .backend
            .from(APPOINTMENTS)
            .update(AppointmentPatch::from_update(update, Utc::now()))
            .eq("id", id)
            .execute::<AppointmentRow>()
            .await
            .map_err(backend_error(SAVE_FAILED))?;
        Appointment::try_from(single_row(rows, "appointment", id)?)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let rows = self
            .backend
            .from(APPOINTMENTS)
            .delete()
            .eq("id", id)
            .execute::<AppointmentRow>()
            .await
            .map_err(backend_error("Erreur lors de la suppression du rendez-vous"))?;
        single_row(rows, "appointment", id)?;
        info!("deleted appointment {}", id);
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        self.backend
            .from(APPOINTMENTS)
            .select("id")
            .count()
            .await
            .map_err(backend_error(LOAD_FAILED))
    }

    /// Active appointments from `today` on
    pub async fn count_upcoming(&self, today: NaiveDate) -> Result<u64> {
        self.backend
            .from(APPOINTMENTS)
            .select("id")
            .gte("appointment_date", format_date(today))
            .in_list("status", &active_statuses())
            .count()
            .await
            .map_err(backend_error(LOAD_FAILED))
    }
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    async fn active_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        self.list_for_date(date).await
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment> {
        self.create(&appointment).await
    }
}
