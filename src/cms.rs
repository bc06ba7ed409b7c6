//! Figures for the administration dashboard

use chrono::NaiveDate;
use log::debug;

use crate::error::Result;
use crate::models::CmsStats;
use crate::repository::{AppointmentRepository, GalleryRepository, TestimonialRepository};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable byte count in base 1024, e.g. `1.5 KB` or `2 MB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

pub struct Dashboard {
    testimonials: TestimonialRepository,
    appointments: AppointmentRepository,
    gallery: GalleryRepository,
}

impl Dashboard {
    pub fn new(
        testimonials: TestimonialRepository,
        appointments: AppointmentRepository,
        gallery: GalleryRepository,
    ) -> Self {
        Self {
            testimonials,
            appointments,
            gallery,
        }
    }

    /// Collect the dashboard counters; upcoming appointments start at `today`
    pub async fn stats(&self, today: NaiveDate) -> Result<CmsStats> {
        let (
            total_testimonials,
            pending_testimonials,
            total_appointments,
            upcoming_appointments,
            total_images,
            storage_used,
        ) = tokio::try_join!(
            self.testimonials.count(),
            self.testimonials.count_pending(),
            self.appointments.count(),
            self.appointments.count_upcoming(today),
            self.gallery.count(),
            self.gallery.storage_used(),
        )?;

        let stats = CmsStats {
            total_testimonials,
            pending_testimonials,
            total_appointments,
            upcoming_appointments,
            total_images,
            storage_used,
        };
        debug!("dashboard stats: {:?}", stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }
}
