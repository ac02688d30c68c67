//! Core domain logic for MedTrack.
//! This crate is the single source of truth for appointment invariants.

pub mod config;
pub mod db;
pub mod events;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{resolve_log_level, resolve_store_path, DB_PATH_ENV, STORE_FILE_NAME};
pub use db::{open_store, DbError, DbResult};
pub use events::{EventHub, StoreEvent};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::appointment::{
    Appointment, AppointmentField, AppointmentFields, AppointmentId, AppointmentValidationError,
};
pub use model::doctor::{Doctor, DoctorId};
pub use repo::appointment_repo::{
    AppointmentListQuery, AppointmentRepository, AppointmentSortKey, SqliteAppointmentRepository,
};
pub use repo::doctor_repo::{
    DoctorListQuery, DoctorRepository, DoctorSortKey, SqliteDoctorRepository,
};
pub use repo::memory::{InMemoryAppointmentRepository, InMemoryDoctorRepository};
pub use repo::{RepoError, RepoResult, SortOrder};
pub use service::appointment_service::{AppointmentListing, AppointmentService, ServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
