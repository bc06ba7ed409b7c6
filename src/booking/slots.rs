//! Which half-hour slots are still bookable on a given day

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{Appointment, TimeSlot};

/// Opening slots, morning then afternoon, in order
pub const SLOT_TIMES: [(u32, u32); 13] = [
    (9, 0),
    (9, 30),
    (10, 0),
    (10, 30),
    (11, 0),
    (11, 30),
    (14, 0),
    (14, 30),
    (15, 0),
    (15, 30),
    (16, 0),
    (16, 30),
    (17, 0),
];

/// Same-day bookings need at least this much notice
pub const MIN_NOTICE_MINUTES: i64 = 60;

/// The full fixed slot list
pub fn all_slots() -> Vec<TimeSlot> {
    SLOT_TIMES
        .iter()
        .filter_map(|&(hour, minute)| TimeSlot::from_hm(hour, minute))
        .collect()
}

/// Slots still open on `date`.
///
/// Removes slots held by an appointment on that date whose status occupies
/// a slot, and on the current day every slot starting less than an hour
/// from `now`. Past dates have no slots. An empty result means the day is
/// full, not that something failed.
pub fn available_slots(
    date: NaiveDate,
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Vec<TimeSlot> {
    let today = now.date();
    if date < today {
        return Vec::new();
    }
    let earliest = now + Duration::minutes(MIN_NOTICE_MINUTES);

    all_slots()
        .into_iter()
        .filter(|slot| date > today || date.and_time(slot.time()) >= earliest)
        .filter(|slot| !appointments.iter().any(|a| a.occupies(date, *slot)))
        .collect()
}

/// Whether `slot` is one of the open slots on `date`
pub fn is_slot_available(
    date: NaiveDate,
    slot: TimeSlot,
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> bool {
    available_slots(date, appointments, now).contains(&slot)
}
