//! Domain model for appointments and doctors.
//!
//! # Responsibility
//! - Define the record shapes owned by the store.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil UUID.
//! - Appointments carry doctor/practice labels as plain strings; there is no
//!   foreign key to `Doctor`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod appointment;
pub mod doctor;
