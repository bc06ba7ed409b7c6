use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, warn};
use std::path::Path;

use atelier_couture::booking::{available_slots, Clock, SystemClock};
use atelier_couture::cms::format_file_size;
use atelier_couture::models::{AppointmentStatus, ModerationStatus};
use atelier_couture::{Atelier, AtelierConfig, AtelierError};

#[derive(Parser)]
#[command(name = "atelier", version, about = "Atelier couture administration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the open slots for a date (YYYY-MM-DD)
    Slots { date: NaiveDate },
    /// Show the dashboard counters
    Stats,
    /// List appointments
    Appointments {
        #[arg(long)]
        status: Option<AppointmentStatus>,
    },
    /// Change the status of an appointment
    SetStatus {
        id: String,
        status: AppointmentStatus,
    },
    /// List testimonials
    Testimonials {
        #[arg(long)]
        pending: bool,
    },
    /// Approve or reject a testimonial
    Moderate { id: String, decision: Decision },
    /// Sign in as administrator; the password is read from ATELIER_ADMIN_PASSWORD
    Login {
        email: String,
        #[arg(long, env = "ATELIER_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
}

#[derive(Clone, Copy, ValueEnum)]
enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for ModerationStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => ModerationStatus::Approved,
            Decision::Reject => ModerationStatus::Rejected,
        }
    }
}

/// Print the visitor-facing message along with the internal one
fn report(err: AtelierError) -> anyhow::Error {
    anyhow!("{} ({})", err.user_message(), err)
}

async fn run(atelier: &Atelier, session_file: Option<&Path>, command: Command) -> Result<()> {
    match command {
        Command::Slots { date } => {
            let existing = atelier
                .appointments()
                .list_for_date(date)
                .await
                .map_err(report)?;
            let slots = available_slots(date, &existing, SystemClock.now());
            if slots.is_empty() {
                println!("Aucun créneau disponible le {}", date);
            }
            for slot in slots {
                println!("{}", slot);
            }
        }
        Command::Stats => {
            atelier.require_admin().map_err(report)?;
            let stats = atelier
                .dashboard()
                .stats(Local::now().date_naive())
                .await
                .map_err(report)?;
            println!(
                "Témoignages      {} ({} en attente)",
                stats.total_testimonials, stats.pending_testimonials
            );
            println!(
                "Rendez-vous      {} ({} à venir)",
                stats.total_appointments, stats.upcoming_appointments
            );
            println!("Images           {}", stats.total_images);
            println!("Stockage         {}", format_file_size(stats.storage_used));
        }
        Command::Appointments { status } => {
            atelier.require_admin().map_err(report)?;
            let appointments = atelier.appointments().list().await.map_err(report)?;
            for a in appointments
                .iter()
                .filter(|a| status.map_or(true, |s| a.status == s))
            {
                println!(
                    "{}  {} {}  {:<12} {:<15} {} <{}> {}",
                    a.id,
                    a.appointment_date,
                    a.appointment_time,
                    a.status.label(),
                    a.service.label(),
                    a.client_name,
                    a.client_email,
                    a.client_phone
                );
            }
        }
        Command::SetStatus { id, status } => {
            atelier.require_admin().map_err(report)?;
            let updated = atelier
                .appointments()
                .update_status(&id, status)
                .await
                .map_err(report)?;
            println!("{} → {}", updated.id, updated.status.label());
        }
        Command::Testimonials { pending } => {
            atelier.require_admin().map_err(report)?;
            let testimonials = atelier.testimonials().list_all().await.map_err(report)?;
            for t in testimonials
                .iter()
                .filter(|t| !pending || t.status == ModerationStatus::Pending)
            {
                println!("{}  [{}] {}: {}", t.id, t.status, t.name, t.quote);
            }
        }
        Command::Moderate { id, decision } => {
            atelier.require_admin().map_err(report)?;
            let updated = atelier
                .testimonials()
                .moderate(&id, decision.into())
                .await
                .map_err(report)?;
            println!("{} → {}", updated.id, updated.status);
        }
        Command::Login { email, password } => {
            if password.is_empty() {
                bail!("ATELIER_ADMIN_PASSWORD is empty");
            }
            let session = atelier.sign_in(&email, &password).await.map_err(report)?;
            println!(
                "Connecté en tant que {}",
                session.user.email.as_deref().unwrap_or(&email)
            );
            match session_file {
                Some(path) => debug!("session saved to {}", path.display()),
                None => warn!(
                    "no session file configured (set ATELIER_SESSION_FILE or HOME); \
                     the session ends with this process"
                ),
            }
        }
        Command::Logout => {
            atelier.require_admin().map_err(report)?;
            atelier.sign_out().await.map_err(report)?;
            println!("Déconnecté");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();
    let config = AtelierConfig::from_env().context("loading configuration")?;
    let session_file = config.session_file.clone();
    let atelier = Atelier::new(config);

    if let Some(session) = atelier.restore_session().await.map_err(report)? {
        debug!("restored session for {}", session.user.id);
    }

    run(&atelier, session_file.as_deref(), cli.command).await
}
