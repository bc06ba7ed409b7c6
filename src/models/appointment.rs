//! Appointments booked through the site

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A half-hour appointment start time, written `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    /// Build a slot from hour and minute; `None` when out of range
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TimeSlot)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    /// Accepts `HH:MM` and the `HH:MM:SS` form a `time` column returns
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map(TimeSlot)
            .map_err(|_| format!("invalid time slot: {}", s))
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What the client comes in for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    Consultation,
    Fitting,
    FinalFitting,
    Delivery,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Consultation,
        ServiceKind::Fitting,
        ServiceKind::FinalFitting,
        ServiceKind::Delivery,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Consultation => "consultation",
            ServiceKind::Fitting => "fitting",
            ServiceKind::FinalFitting => "final-fitting",
            ServiceKind::Delivery => "delivery",
        }
    }

    /// Label shown to visitors
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::Consultation => "Consultation",
            ServiceKind::Fitting => "Essayage",
            ServiceKind::FinalFitting => "Essayage final",
            ServiceKind::Delivery => "Livraison",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("unknown service: {}", s))
    }
}

/// Lifecycle of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    Rescheduled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Rescheduled,
    ];

    /// Statuses that hold their time slot
    pub const ACTIVE: [AppointmentStatus; 2] =
        [AppointmentStatus::Scheduled, AppointmentStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rescheduled => "rescheduled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Planifié",
            AppointmentStatus::Confirmed => "Confirmé",
            AppointmentStatus::Completed => "Terminé",
            AppointmentStatus::Cancelled => "Annulé",
            AppointmentStatus::Rescheduled => "Reprogrammé",
        }
    }

    /// Whether an appointment in this status blocks its slot for other bookings
    pub fn occupies_slot(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// scheduled → confirmed → completed; scheduled or confirmed → cancelled
    /// or rescheduled; a rescheduled appointment may be scheduled again.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Scheduled, Cancelled)
                | (Scheduled, Rescheduled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (Confirmed, Rescheduled)
                | (Rescheduled, Scheduled)
                | (Rescheduled, Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("unknown appointment status: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: TimeSlot,
    pub service: ServiceKind,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this appointment holds `slot` on `date`
    pub fn occupies(&self, date: NaiveDate, slot: TimeSlot) -> bool {
        self.status.occupies_slot() && self.appointment_date == date && self.appointment_time == slot
    }
}

/// A validated booking, ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: TimeSlot,
    pub service: ServiceKind,
    pub notes: Option<String>,
}

/// Fields an administrator may change on an existing appointment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentUpdate {
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<TimeSlot>,
    pub service: Option<ServiceKind>,
    pub notes: Option<Option<String>>,
}
