//! The multi-step booking form
//!
//! A visitor picks a date, then one of that date's open slots, then fills in
//! their details. Submitting goes through the rate limiter, then validation,
//! then a fresh availability check against the store before inserting.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};

use super::clock::Clock;
use super::slots::{available_slots, is_slot_available};
use crate::error::{AtelierError, Result};
use crate::models::{Appointment, NewAppointment, TimeSlot};
use crate::security::{validate_appointment_form, AppointmentForm, RateLimiter};

/// Where appointments are read from and written to
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Appointments on `date` whose status holds their slot
    async fn active_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>>;

    /// Store a new booking with status `scheduled`
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingStep {
    ChooseDate,
    ChooseSlot { date: NaiveDate, slots: Vec<TimeSlot> },
    Details { date: NaiveDate, slot: TimeSlot },
    Confirmed(Appointment),
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    step: BookingStep,
    /// Slots offered for the chosen date, kept for `back()`
    offered: Vec<TimeSlot>,
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingFlow {
    pub fn new() -> Self {
        Self {
            step: BookingStep::ChooseDate,
            offered: Vec::new(),
        }
    }

    pub fn step(&self) -> &BookingStep {
        &self.step
    }

    /// Pick a date and compute its open slots. Allowed from any step but
    /// `Confirmed`; an empty slot list is a valid outcome.
    pub fn choose_date(
        &mut self,
        date: NaiveDate,
        existing: &[Appointment],
        now: NaiveDateTime,
    ) -> Result<&[TimeSlot]> {
        if matches!(self.step, BookingStep::Confirmed(_)) {
            return Err(AtelierError::InvalidStep {
                expected: "date selection",
            });
        }
        self.offered = available_slots(date, existing, now);
        self.step = BookingStep::ChooseSlot {
            date,
            slots: self.offered.clone(),
        };
        Ok(self.offered.as_slice())
    }

    /// Pick one of the offered slots
    pub fn choose_slot(&mut self, slot: TimeSlot) -> Result<()> {
        let BookingStep::ChooseSlot { date, ref slots } = self.step else {
            return Err(AtelierError::InvalidStep {
                expected: "slot selection",
            });
        };
        if !slots.contains(&slot) {
            return Err(AtelierError::SlotUnavailable { date, slot });
        }
        self.step = BookingStep::Details { date, slot };
        Ok(())
    }

    /// Go back one step
    pub fn back(&mut self) {
        self.step = match std::mem::replace(&mut self.step, BookingStep::ChooseDate) {
            BookingStep::Details { date, .. } => BookingStep::ChooseSlot {
                date,
                slots: self.offered.clone(),
            },
            BookingStep::ChooseSlot { .. } | BookingStep::ChooseDate => BookingStep::ChooseDate,
            confirmed @ BookingStep::Confirmed(_) => confirmed,
        };
    }

    /// Start over for a new booking
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Submit the details form.
    ///
    /// When the slot was taken in the meantime the flow returns to slot
    /// selection with a refreshed list and the error is
    /// [`AtelierError::SlotUnavailable`]. Two concurrent submissions for the
    /// same slot can still both pass the re-check.
    pub async fn submit<S>(
        &mut self,
        form: &AppointmentForm,
        store: &S,
        limiter: &RateLimiter,
        identifier: &str,
        clock: &dyn Clock,
    ) -> Result<Appointment>
    where
        S: AppointmentStore + ?Sized,
    {
        let BookingStep::Details { date, slot } = self.step else {
            return Err(AtelierError::InvalidStep {
                expected: "details",
            });
        };

        if !limiter.is_allowed(identifier) {
            return Err(AtelierError::RateLimited {
                retry_after: limiter.remaining_time(identifier),
            });
        }

        let details = validate_appointment_form(form)?;

        let existing = store.active_for_date(date).await?;
        let now = clock.now();
        if !is_slot_available(date, slot, &existing, now) {
            warn!("slot {} on {} was taken before submission", slot, date);
            self.offered = available_slots(date, &existing, now);
            self.step = BookingStep::ChooseSlot {
                date,
                slots: self.offered.clone(),
            };
            return Err(AtelierError::SlotUnavailable { date, slot });
        }

        let appointment = store
            .insert(details.into_new_appointment(date, slot))
            .await?;
        info!(
            "appointment {} booked for {} at {}",
            appointment.id, date, slot
        );
        self.step = BookingStep::Confirmed(appointment.clone());
        Ok(appointment)
    }
}
