//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `medtrack_core` linkage and store bootstrap outside the mobile
//!   runtime.
//! - Exit non-zero when the store cannot be recovered.

use medtrack_core::{
    init_logging, open_store, resolve_log_level, resolve_store_path, AppointmentService,
    SqliteAppointmentRepository, SqliteDoctorRepository,
};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("medtrack_core ping={}", medtrack_core::ping());
    println!("medtrack_core version={}", medtrack_core::core_version());

    let path = resolve_store_path();
    if let Some(log_dir) = log_dir_for(&path) {
        if let Err(err) = init_logging(&resolve_log_level(), &log_dir) {
            eprintln!("medtrack_core logging disabled: {err}");
        }
    }
    let conn = match open_store(&path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("medtrack_core store={} error={err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let summary = SqliteAppointmentRepository::try_new(&conn)
        .and_then(|appointments| {
            let doctors = SqliteDoctorRepository::try_new(&conn)?;
            let service = AppointmentService::new(appointments, doctors);
            Ok((
                service.list_appointments()?.len(),
                service.list_doctors()?.len(),
            ))
        });

    match summary {
        Ok((appointments, doctors)) => {
            println!("medtrack_core store={}", path.display());
            println!("medtrack_core appointments={appointments} doctors={doctors}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("medtrack_core store={} error={err}", path.display());
            ExitCode::FAILURE
        }
    }
}

fn log_dir_for(store_path: &Path) -> Option<String> {
    let parent = store_path.parent().filter(|dir| dir.is_absolute())?;
    Some(parent.join("logs").to_string_lossy().into_owned())
}
