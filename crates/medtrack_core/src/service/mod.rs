//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the appointment lifecycle use-cases.
//! - Publish change events so UI layers re-query instead of polling.

pub mod appointment_service;
