//! Appointment booking: slot availability and the booking form flow

pub mod clock;
pub mod flow;
pub mod slots;

pub use clock::{Clock, FixedClock, SystemClock};
pub use flow::{AppointmentStore, BookingFlow, BookingStep};
pub use slots::{all_slots, available_slots, is_slot_available};
